//! Client-side pagination.
//!
//! Once results have been filtered locally the server's pagination metadata
//! no longer describes them, so pages are cut from the in-memory list and
//! the metadata is recomputed here.

use serde::Serialize;

/// Rows per page in inventory tables.
pub const ITEMS_PER_PAGE: usize = 10;

/// Pagination metadata for one page of results.
///
/// `next` and `previous` are page numbers rather than URLs; they are `None`
/// at either end of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Total number of items across all pages.
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
}

/// One page of items with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Slice `items` into the 1-based page `current_page`.
///
/// Returns `[(current_page - 1) * per_page, current_page * per_page)`.
/// Pages past the end (and page 0) yield an empty slice; the page number is
/// never clamped.
///
/// ```
/// use storeroom_core::paginate;
///
/// let items: Vec<u32> = (1..=25).collect();
/// let page = paginate(&items, 3, 10);
///
/// assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
/// assert_eq!(page.meta.next, None);
/// assert_eq!(page.meta.previous, Some(2));
/// ```
#[must_use]
pub fn paginate<T: Clone>(items: &[T], current_page: u32, per_page: usize) -> Page<T> {
    let count = items.len();
    let page_index = usize::try_from(current_page.saturating_sub(1)).unwrap_or(usize::MAX);

    let (start, end) = if current_page == 0 || per_page == 0 {
        (count, count)
    } else {
        let start = page_index.saturating_mul(per_page).min(count);
        let end = start.saturating_add(per_page).min(count);
        (start, end)
    };

    let has_more = current_page > 0 && per_page > 0 && end < count;

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        meta: PageMeta {
            count: count as u64,
            next: has_more.then(|| current_page.saturating_add(1)),
            previous: (current_page > 1).then(|| current_page - 1),
        },
    }
}
