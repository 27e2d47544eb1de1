use serde::Serialize;
use thiserror::Error;

pub const PAGE_SIZE: usize = 20;

/// Above this many pages, numbered controls collapse around the current page.
pub const MAX_PAGES_WITHOUT_ELLIPSIS: usize = 10;
const CONTROL_NEIGHBOURS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("page {page} is out of range (1-{total_pages})")]
    OutOfRange { page: usize, total_pages: usize },
}

/// Where one page sits inside a result set. `range_start`/`range_end` are
/// 1-based and inclusive; both are 0 for an empty set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub range_start: usize,
    pub range_end: usize,
}

impl PageWindow {
    pub fn new(total_items: usize, page: usize, page_size: usize) -> Result<Self, PageError> {
        let total_pages = total_pages(total_items, page_size);
        if page < 1 || page > total_pages {
            return Err(PageError::OutOfRange { page, total_pages });
        }
        Ok(Self::build(total_items, page, page_size, total_pages))
    }

    /// Like [`PageWindow::new`] with `page` pulled into range first.
    pub fn clamped(total_items: usize, page: usize, page_size: usize) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self::build(total_items, clamp_page(page, total_pages), page_size, total_pages)
    }

    fn build(total_items: usize, page: usize, page_size: usize, total_pages: usize) -> Self {
        let page_size = page_size.max(1);
        let start = ((page - 1) * page_size).min(total_items);
        let end = (start + page_size).min(total_items);
        let (range_start, range_end) = if start == end { (0, 0) } else { (start + 1, end) };
        Self {
            page,
            total_pages,
            total_items,
            range_start,
            range_end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Zero-based slice bounds into the paginated set.
    pub fn bounds(&self) -> std::ops::Range<usize> {
        if self.range_start == 0 {
            0..0
        } else {
            self.range_start - 1..self.range_end
        }
    }
}

/// Number of pages for `count` items; an empty set still has one page.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub window: PageWindow,
}

pub fn paginate<T>(
    items: &[T],
    page: usize,
    page_size: usize,
) -> Result<Page<'_, T>, PageError> {
    let window = PageWindow::new(items.len(), page, page_size)?;
    Ok(Page {
        items: &items[window.bounds()],
        window,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageControl {
    Previous { target: usize, enabled: bool },
    Number { page: usize, current: bool },
    Ellipsis,
    Next { target: usize, enabled: bool },
}

/// Controls for navigating `total_pages`; none when there is a single page.
pub fn page_controls(current: usize, total_pages: usize) -> Vec<PageControl> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let mut out = vec![PageControl::Previous {
        target: current.saturating_sub(1).max(1),
        enabled: current > 1,
    }];

    let low = current.saturating_sub(CONTROL_NEIGHBOURS);
    let high = current + CONTROL_NEIGHBOURS;
    let mut last_printed = 0usize;
    for page in 1..=total_pages {
        let visible = total_pages <= MAX_PAGES_WITHOUT_ELLIPSIS
            || page == 1
            || page == total_pages
            || (page >= low && page <= high);
        if !visible {
            continue;
        }
        if last_printed != 0 && page - last_printed > 1 {
            out.push(PageControl::Ellipsis);
        }
        out.push(PageControl::Number {
            page,
            current: page == current,
        });
        last_printed = page;
    }

    out.push(PageControl::Next {
        target: (current + 1).min(total_pages),
        enabled: current < total_pages,
    });
    out
}
