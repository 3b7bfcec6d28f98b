use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: portfolio project and image management server",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ConfigArgs),
    /// Create the database schema and exit
    Migrate(ConfigArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file; environment variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
