//! CLI command implementations.

pub mod inventory;
pub mod products;
pub mod variant;

use std::io::Write;

use storeroom_client::{ApiError, ClientConfig, ConfigError, InventoryApiClient, InventoryQuery};
use storeroom_core::{StockStatusError, SupplierConflict};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    InvalidFilter(#[from] StockStatusError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Target and sources share suppliers and `--force` was not given.
    #[error("merge blocked by shared suppliers: {}", format_conflicts(.0))]
    MergeConflict(Vec<SupplierConflict>),

    #[error("nothing to update: pass at least one field flag")]
    EmptyUpdate,

    #[error("refusing to delete {0} without --yes")]
    DeleteNotConfirmed(String),
}

fn format_conflicts(conflicts: &[SupplierConflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

/// API client and query coordinator shared by every command.
pub struct Context {
    pub client: InventoryApiClient,
    pub query: InventoryQuery<InventoryApiClient>,
}

impl Context {
    /// Build from `STOREROOM_*` environment variables, with an optional base
    /// URL override.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if configuration is invalid.
    pub fn from_env(api_url: Option<&str>) -> Result<Self, CommandError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(api_url) = api_url {
            let overridden = ClientConfig::new(api_url)?;
            config.base_url = overridden.base_url;
        }
        tracing::debug!(
            ?config,
            cache = config.cache_enabled(),
            "Loaded client configuration"
        );

        let client = InventoryApiClient::new(&config)?;
        let query = InventoryQuery::for_client(client.clone(), config.cache_ttl);
        Ok(Self { client, query })
    }
}

/// Write rendered output to stdout.
fn emit(text: &str) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use storeroom_core::SupplierId;

    use super::*;

    #[test]
    fn test_merge_conflict_display() {
        let err = CommandError::MergeConflict(vec![
            SupplierConflict {
                id: SupplierId::new(1),
                name: "Hanil Textiles".to_string(),
            },
            SupplierConflict {
                id: SupplierId::new(3),
                name: "Mirae Goods".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "merge blocked by shared suppliers: Hanil Textiles, Mirae Goods"
        );
    }

    #[test]
    fn test_delete_not_confirmed_display() {
        let err = CommandError::DeleteNotConfirmed("TS-01".to_string());
        assert_eq!(err.to_string(), "refusing to delete TS-01 without --yes");
    }
}
