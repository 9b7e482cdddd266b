//! Page math shared by the post listing and tag listings.

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Slice of a listing plus navigation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub current_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub total_items: usize,
}

/// Number of pages needed for `count` items; at least one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Cut page `page` (1-based) out of `items`.
///
/// Out of range pages (`0`, or past the last page) yield no items but still
/// report the correct `total_pages`. A `page_size` of zero is treated as one.
///
/// ```
/// use quire_core::pagination::paginate;
///
/// let items: Vec<u32> = (1..=25).collect();
/// let page = paginate(&items, 2, 10);
/// assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
/// assert_eq!(page.total_pages, 3);
/// assert!(page.has_next_page && page.has_prev_page);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let in_range = (1..=total_pages).contains(&page);

    let slice = if in_range {
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        items.get(start..end).unwrap_or(&[]).to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: slice,
        total_pages,
        current_page: page,
        has_next_page: in_range && page < total_pages,
        has_prev_page: in_range && page > 1,
        total_items,
    }
}
