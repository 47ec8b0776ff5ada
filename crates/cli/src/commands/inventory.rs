//! Inventory listing and export.
//!
//! # Usage
//!
//! ```bash
//! storeroom inventory list --category Tops --status "sold out"
//! storeroom inventory export --min-sales 100 -o best-sellers.json
//! storeroom inventory upload pos-march.xlsx
//! ```

use std::path::Path;

use storeroom_core::{FilterForm, Sort};
use tracing::info;

use super::{CommandError, Context, emit};
use crate::render;

/// Print one page of inventory.
///
/// # Errors
///
/// Returns `CommandError` if the filters are invalid or the API call fails.
pub async fn list(
    ctx: &Context,
    filters: FilterForm,
    sort: Option<Sort>,
    page: u32,
    json: bool,
    refresh: bool,
) -> Result<(), CommandError> {
    let criteria = filters.into_criteria()?;

    let view = if refresh {
        ctx.query.refetch(&criteria, page, sort).await?
    } else {
        ctx.query.run(&criteria, page, sort).await?
    };

    if json {
        emit(&serde_json::to_string_pretty(&view)?)
    } else {
        emit(&render::inventory_table(&view, page))
    }
}

/// Write every matching record as a JSON array.
///
/// # Errors
///
/// Returns `CommandError` if the filters are invalid, the API call fails, or
/// the output file cannot be written.
pub async fn export(
    ctx: &Context,
    filters: FilterForm,
    sort: Option<Sort>,
    output: Option<&Path>,
) -> Result<(), CommandError> {
    let criteria = filters.into_criteria()?;
    let records = ctx.query.export(&criteria, sort).await?;
    let json = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            info!(path = %path.display(), records = records.len(), "Inventory exported");
            Ok(())
        }
        None => emit(&json),
    }
}

/// Upload a POS sales export for the server to import.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read or the upload fails.
pub async fn upload(ctx: &Context, file: &Path) -> Result<(), CommandError> {
    let contents = tokio::fs::read(file).await?;
    let file_name = file
        .file_name()
        .map_or_else(|| "upload.xlsx".into(), |name| name.to_string_lossy());

    ctx.query.upload_inventory(&file_name, contents).await?;
    info!(path = %file.display(), "POS data uploaded");
    emit(&format!("Uploaded {file_name}"))
}
