use axum::extract::Multipart;

use folio_diff::FormFields;

use crate::error::{ServerError, ServerResult};

/// Collect a multipart body into [`FormFields`], keeping submission order.
///
/// Parts with a filename are uploads; all others are text values.
pub async fn read_form(mut multipart: Multipart) -> ServerResult<FormFields> {
    let mut form = FormFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("failed to read {name}: {e}")))?;
                form.push_file(name, filename, data);
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("failed to read {name}: {e}")))?;
                form.push_value(name, value);
            }
        }
    }
    Ok(form)
}
