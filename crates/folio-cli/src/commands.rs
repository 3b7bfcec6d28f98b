use anyhow::Context;
use colored::Colorize;

use folio_db::Database;
use folio_server::{FolioServer, ServerConfig};
use folio_store::FsContentStore;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Migrate(args) => cmd_migrate(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<ServerConfig> {
    ServerConfig::load(args.config.as_deref()).context("failed to load configuration")
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn cmd_serve(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    println!(
        "{} Folio server on {} (storage: {})",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage_root.display()
    );
    runtime()?.block_on(FolioServer::new(config).serve())?;
    Ok(())
}

fn cmd_migrate(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    runtime()?.block_on(async {
        let db = Database::connect(&config.database_url)
            .await
            .with_context(|| format!("failed to open {}", config.database_url))?;
        db.migrate().await.context("migration failed")?;

        let store = FsContentStore::new(&config.storage_root);
        store.ensure_ready().await.context("storage directory is not writable")?;
        anyhow::Ok(store.image_dir().to_path_buf())
    })
    .map(|image_dir| {
        println!("{} Schema up to date", "✓".green().bold());
        println!("  Database: {}", config.database_url.cyan());
        println!("  Images:   {}", image_dir.display());
    })
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    print!("{}", config.to_redacted_toml()?);
    if config.admin_token.is_none() {
        eprintln!("{} no admin token set; the admin API will reject every request", "warning:".yellow().bold());
    }
    Ok(())
}
