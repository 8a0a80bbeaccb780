//! Domain models and API payloads

use serde::Deserialize;

pub mod booking;
pub mod comment;
pub mod item;
pub mod request;
pub mod user;

/// Default page size when the client sends none
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Query parameters for plain paged listings
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// A page window resolved from `from`/`size`.
///
/// `from` is an element offset; the page containing it is `from / size`,
/// so the window starts at `(from / size) * size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    /// Resolve a page; the caller validates `size >= 1` and `from >= 0`.
    pub fn new(from: i64, size: i64) -> Self {
        let page = from / size;
        Page {
            offset: page * size,
            limit: size,
        }
    }

    /// Apply the window to an already ordered sequence
    #[cfg(test)]
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}
