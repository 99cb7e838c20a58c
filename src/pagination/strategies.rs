//! Next-key strategies
//!
//! Ready-made `compute_next_key_from` functions for the common API
//! pagination patterns. Each one derives the next key from the key that was
//! just fetched, so resetting the paginator is enough to restart it.

// ============================================================================
// Offset Keys
// ============================================================================

/// Offset-based keys (e.g., `?offset=100&limit=50`)
///
/// The next offset is the current one plus the number of items received,
/// saturating at `u64::MAX`.
pub fn offset_key<I: 'static>() -> impl Fn(&u64, &[I]) -> u64 + Send + Sync + Clone + 'static {
    |offset: &u64, items: &[I]| offset.saturating_add(items.len() as u64)
}

// ============================================================================
// Page Number Keys
// ============================================================================

/// Page number keys (e.g., `?page=2`)
///
/// Every successful page moves to the following page number, saturating at
/// `u32::MAX`.
pub fn page_number_key<I: 'static>() -> impl Fn(&u32, &[I]) -> u32 + Send + Sync + Clone + 'static {
    |page: &u32, _items: &[I]| page.saturating_add(1)
}

// ============================================================================
// Cursor Keys
// ============================================================================

/// Cursor keys taken from the last item of a page (e.g., `?starting_after=obj_123`)
///
/// An empty page keeps the previous cursor.
pub fn last_item_key<K, I, F>(extract: F) -> impl Fn(&K, &[I]) -> K + Send + Sync + 'static
where
    K: Clone + 'static,
    I: 'static,
    F: Fn(&I) -> K + Send + Sync + 'static,
{
    move |cursor: &K, items: &[I]| items.last().map_or_else(|| cursor.clone(), &extract)
}
