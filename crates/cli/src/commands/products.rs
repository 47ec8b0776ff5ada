//! Product search.

use super::{CommandError, Context, emit};
use crate::render;

/// Print products whose name matches `name`.
///
/// # Errors
///
/// Returns `CommandError` if the API call fails.
pub async fn search(ctx: &Context, name: &str) -> Result<(), CommandError> {
    let options = ctx.query.search_products(name).await?;
    emit(&render::product_options(&options))
}
