use serde::{Deserialize, Serialize};

/// One page of a list query.
///
/// `total` is the filtered row count before pagination, so it is usually
/// larger than `data.len()`. It comes from a separate count query and is not
/// guaranteed to agree with `data` when rows change in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub total: i64,
    pub page: u64,
    pub data: Vec<T>,
}

impl<T> ListResult<T> {
    pub fn new(total: i64, page: u64, data: Vec<T>) -> Self {
        Self { total, page, data }
    }

    /// Number of pages needed to hold `total` rows at the given page size.
    pub fn total_pages(&self, page_size: u64) -> u64 {
        if page_size == 0 || self.total <= 0 {
            0
        } else {
            (self.total as u64).div_ceil(page_size)
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}
