//! Single-variant commands.
//!
//! # Usage
//!
//! ```bash
//! storeroom variant show TS-01-RED
//! storeroom variant create TS-01 --name "Linen shirt" --option "Red / M" --price 29.90
//! storeroom variant update TS-01-RED --min-stock 10 --memo "reorder weekly"
//! storeroom variant adjust TS-01-RED --actual-stock 14 --reason recount --updated-by kim
//! storeroom variant history TS-01-RED
//! storeroom variant merge TS-01-RED TS-01-RD --force
//! storeroom variant delete TS-01-RD --yes
//! ```

use storeroom_core::{
    MergeRequest, NewVariant, StockAdjustmentRequest, VariantCode, VariantUpdate,
};
use tracing::{info, warn};

use super::{CommandError, Context, emit};
use crate::render;

/// Print a variant and its suppliers.
///
/// # Errors
///
/// Returns `CommandError` if the API call fails.
pub async fn show(ctx: &Context, code: &str) -> Result<(), CommandError> {
    let detail = ctx.client.variant_detail(&VariantCode::new(code)).await?;
    emit(&render::variant_detail(&detail))
}

/// Create a variant, or a product with its first variant when
/// `new_product` is set, and print the result.
///
/// # Errors
///
/// Returns `CommandError` if the server rejects the variant.
pub async fn create(ctx: &Context, variant: NewVariant, new_product: bool) -> Result<(), CommandError> {
    let detail = if new_product {
        ctx.query.create_product(&variant).await?
    } else {
        ctx.query.create_variant(&variant).await?
    };
    emit(&render::variant_detail(&detail))
}

/// Apply a partial update and print the result.
///
/// # Errors
///
/// Returns `CommandError::EmptyUpdate` if no field was given, or
/// `CommandError::Api` if the update fails.
pub async fn update(ctx: &Context, code: &str, update: VariantUpdate) -> Result<(), CommandError> {
    if update.is_empty() {
        return Err(CommandError::EmptyUpdate);
    }

    let detail = ctx
        .query
        .update_variant(&VariantCode::new(code), &update)
        .await?;
    emit(&render::variant_detail(&detail))
}

/// Delete a variant. Requires `confirmed`.
///
/// # Errors
///
/// Returns `CommandError::DeleteNotConfirmed` without confirmation, or
/// `CommandError::Api` if the delete fails.
pub async fn delete(ctx: &Context, code: &str, confirmed: bool) -> Result<(), CommandError> {
    if !confirmed {
        return Err(CommandError::DeleteNotConfirmed(code.to_string()));
    }

    ctx.query.delete_variant(&VariantCode::new(code)).await?;
    emit(&format!("Deleted {code}"))
}

/// Merge `sources` into `target` after checking for shared suppliers.
///
/// # Errors
///
/// Returns `CommandError::MergeConflict` if suppliers are shared and `force`
/// is not set, or `CommandError::Api` if a look-up or the merge fails.
pub async fn merge(
    ctx: &Context,
    target: &str,
    sources: &[String],
    force: bool,
) -> Result<(), CommandError> {
    let request = MergeRequest {
        target_variant_code: VariantCode::new(target),
        source_variant_codes: sources.iter().map(VariantCode::new).collect(),
    };

    let conflicts = ctx
        .client
        .merge_precheck(&request.target_variant_code, &request.source_variant_codes)
        .await?;

    if !conflicts.is_empty() {
        emit(&render::conflicts(&conflicts))?;
        if !force {
            return Err(CommandError::MergeConflict(conflicts));
        }
        warn!(conflicts = conflicts.len(), "Merging despite shared suppliers");
    }

    ctx.query.merge_variants(&request).await?;
    info!(merged_into = %target, sources = sources.len(), "Merge complete");
    emit(&format!("Merged {} variant(s) into {target}", sources.len()))
}

/// Record a stock count.
///
/// # Errors
///
/// Returns `CommandError` if the API call fails.
pub async fn adjust(
    ctx: &Context,
    code: &str,
    request: StockAdjustmentRequest,
) -> Result<(), CommandError> {
    ctx.query
        .adjust_stock(&VariantCode::new(code), &request)
        .await?;
    emit(&format!(
        "Stock for {code} set to {} ({})",
        request.actual_stock, request.reason
    ))
}

/// Print a page of stock adjustment history.
///
/// # Errors
///
/// Returns `CommandError` if the API call fails.
pub async fn history(ctx: &Context, code: Option<&str>, page: u32) -> Result<(), CommandError> {
    let code = code.map(VariantCode::new);
    let history = ctx.client.stock_history(code.as_ref(), page).await?;
    emit(&render::history_table(&history, page))
}
