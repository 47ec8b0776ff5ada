//! Supplier conflict detection for variant merges.
//!
//! Merging folds the source variants' stock and history into the target.
//! When a supplier is linked to both the target and one of the sources the
//! server refuses the merge, so the conflict is reported up front.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{Supplier, SupplierId, VariantDetail};

/// A supplier linked to both the merge target and at least one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierConflict {
    pub id: SupplierId,
    pub name: String,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Suppliers shared by `target` and any of `sources`.
///
/// Variant details only carry supplier names, so they are resolved to IDs
/// through the supplier list, matching names trimmed and case-insensitively.
/// When two suppliers share a normalized name the first one listed wins.
/// Names that do not resolve are ignored. Conflicts are reported in the
/// order they first appear among the sources.
#[must_use]
pub fn supplier_conflicts(
    target: &VariantDetail,
    sources: &[VariantDetail],
    suppliers: &[Supplier],
) -> Vec<SupplierConflict> {
    let mut name_to_id: HashMap<String, SupplierId> = HashMap::new();
    let mut id_to_name: HashMap<SupplierId, &str> = HashMap::new();
    for supplier in suppliers {
        name_to_id.entry(normalize(&supplier.name)).or_insert(supplier.id);
        id_to_name.entry(supplier.id).or_insert(&supplier.name);
    }

    let resolve = |name: &str| name_to_id.get(&normalize(name)).copied();

    let target_ids: HashSet<SupplierId> = target
        .suppliers
        .iter()
        .filter_map(|link| resolve(&link.name))
        .collect();

    let mut reported = HashSet::new();
    sources
        .iter()
        .flat_map(|source| source.suppliers.iter())
        .filter_map(|link| resolve(&link.name))
        .filter(|id| target_ids.contains(id) && reported.insert(*id))
        .map(|id| SupplierConflict {
            id,
            name: id_to_name
                .get(&id)
                .map_or_else(|| id.to_string(), |name| (*name).to_owned()),
        })
        .collect()
}
