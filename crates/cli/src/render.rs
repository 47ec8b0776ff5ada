//! Plain-text rendering for command output.

use std::fmt::Write;

use storeroom_client::InventoryView;
use storeroom_core::{
    PaginatedResponse, ProductOption, StockAdjustment, SupplierConflict, VariantDetail,
};

fn page_label(page: Option<u32>) -> String {
    page.map_or_else(|| "-".to_string(), |page| page.to_string())
}

/// Inventory page as a fixed-width table with a pagination footer.
pub fn inventory_table(view: &InventoryView, page: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<10} {:<24} {:<12} {:<12} {:>7} {:>5} {:>9} {:>10}  STATUS",
        "VARIANT", "PRODUCT", "NAME", "OPTION", "CATEGORY", "STOCK", "MIN", "SALES", "PRICE"
    );

    for record in &view.data {
        let _ = writeln!(
            out,
            "{:<16.16} {:<10.10} {:<24.24} {:<12.12} {:<12.12} {:>7} {:>5} {:>9} {:>10}  {}",
            record.variant_code,
            record.product_id,
            record.name,
            record.option,
            record.category,
            record.stock,
            record.min_stock,
            record.sales,
            record.price,
            record.status(),
        );
    }

    if view.data.is_empty() {
        let _ = writeln!(out, "(no matching variants)");
    }

    let _ = writeln!(
        out,
        "\nPage {page} | {} items | previous: {} | next: {}",
        view.pagination.count,
        page_label(view.pagination.previous),
        page_label(view.pagination.next),
    );
    out
}

/// A single variant and its supplier links.
pub fn variant_detail(detail: &VariantDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Variant:     {}", detail.variant_code);
    let _ = writeln!(out, "Product:     {}", detail.product_id);
    let _ = writeln!(out, "Name:        {}", detail.name);
    let _ = writeln!(out, "Option:      {}", detail.option);
    let _ = writeln!(out, "Price:       {}", detail.price);
    let _ = writeln!(out, "Stock:       {} (minimum {})", detail.stock, detail.min_stock);
    if !detail.description.is_empty() {
        let _ = writeln!(out, "Description: {}", detail.description);
    }
    if !detail.memo.is_empty() {
        let _ = writeln!(out, "Memo:        {}", detail.memo);
    }

    if detail.suppliers.is_empty() {
        let _ = writeln!(out, "Suppliers:   none");
    } else {
        let _ = writeln!(out, "Suppliers:");
        for link in &detail.suppliers {
            let primary = if link.is_primary { " (primary)" } else { "" };
            let _ = writeln!(out, "  - {} @ {}{primary}", link.name, link.cost_price);
        }
    }
    out
}

/// Stock adjustment history page.
pub fn history_table(history: &PaginatedResponse<StockAdjustment>, page: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<17} {:<16} {:>7} {:<14} REASON",
        "WHEN", "VARIANT", "DELTA", "BY"
    );
    for adjustment in &history.results {
        let _ = writeln!(
            out,
            "{:<17} {:<16.16} {:>+7} {:<14.14} {}",
            adjustment.created_at.format("%Y-%m-%d %H:%M").to_string(),
            adjustment.variant_code,
            adjustment.delta,
            adjustment.created_by,
            adjustment.reason,
        );
    }
    if history.results.is_empty() {
        let _ = writeln!(out, "(no adjustments)");
    }

    let _ = writeln!(
        out,
        "\nPage {page} | {} adjustments | previous: {} | next: {}",
        history.count,
        page_label(history.previous_page()),
        page_label(history.next_page(page)),
    );
    out
}

/// Product search results, one product per line.
pub fn product_options(options: &[ProductOption]) -> String {
    if options.is_empty() {
        return "(no matching products)\n".to_string();
    }
    options.iter().fold(String::new(), |mut out, option| {
        let _ = writeln!(out, "{:<12} {}", option.product_id, option.name);
        out
    })
}

/// Shared suppliers found before a merge.
pub fn conflicts(conflicts: &[SupplierConflict]) -> String {
    let mut out = String::from("Target and sources share these suppliers:\n");
    for conflict in conflicts {
        let _ = writeln!(out, "  - {} (id {})", conflict.name, conflict.id);
    }
    out
}
