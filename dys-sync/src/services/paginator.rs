//! Pagination of track ids into submission batches

/// Maximum tracks accepted by one playlist add request
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Split `items` into contiguous pages of at most `page_size`
///
/// Only the last page may be short. Empty input yields no pages.
///
/// # Panics
/// If `page_size` is zero.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Vec<T>> {
    assert!(page_size > 0, "page size must be non-zero");
    items.chunks(page_size).map(|page| page.to_vec()).collect()
}
