//! Generic machinery behind the record search commands: keyword matching,
//! fixed-size pagination and the degraded-world error the dispatcher maps to
//! an empty page.

pub const ACCOUNT_PAGE_SIZE: usize = 10;
pub const ITEM_PAGE_SIZE: usize = 50;
pub const MONSTER_PAGE_SIZE: usize = 50;
pub const SPELL_PAGE_SIZE: usize = 50;

/// A search could not run because the world handle is unavailable, which in
/// practice means the lock was poisoned by a panic on another thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    WorldUnavailable,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::WorldUnavailable => write!(f, "world state unavailable"),
        }
    }
}

/// One page of a filtered result set. `total` counts the whole filtered set,
/// not just this page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn empty(page_size: usize) -> Page<T> {
        Page {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }
}

/// Cuts one page out of an already filtered and sorted set. Page numbers
/// below 1 read as page 1; pages past the end come back empty with `total`
/// intact.
pub fn paginate<T>(mut items: Vec<T>, page: i64, page_size: usize) -> Page<T> {
    let total = items.len();
    let page = page.max(1) as usize;
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = (start + page_size).min(total);
    let items: Vec<T> = items.drain(start..end).collect();
    Page {
        items,
        total,
        page,
        page_size,
    }
}

/// Case-insensitive keyword predicate. An empty keyword matches everything;
/// otherwise the keyword must appear in one of the text fields or in the
/// record index written out in decimal.
pub fn keyword_matches(keyword: &str, index: u32, fields: &[&str]) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return true;
    }
    if index.to_string().contains(&keyword) {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&keyword))
}
