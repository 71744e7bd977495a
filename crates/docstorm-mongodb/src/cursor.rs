//! Pagination state for a single query

/// Offset/limit window of a query plus the number of records it returned.
///
/// `limit == 0` and `batch_size == 0` both mean "let the driver decide".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Number of documents to skip
    pub offset: u64,
    /// Maximum number of documents to return (0 = unlimited)
    pub limit: i64,
    /// Documents per server round trip (0 = driver default)
    pub batch_size: u32,
    /// Number of records returned by the last query
    pub total_records: usize,
}

impl Cursor {
    /// Create a cursor with the given window
    pub fn new(limit: i64, offset: u64) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }

    /// Set the number of documents to skip
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the batch size
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Skip value to hand to the driver
    pub fn skip_option(&self) -> Option<u64> {
        (self.offset > 0).then_some(self.offset)
    }

    /// Limit value to hand to the driver
    pub fn limit_option(&self) -> Option<i64> {
        (self.limit != 0).then_some(self.limit)
    }

    /// Batch size to hand to the driver
    pub fn batch_size_option(&self) -> Option<u32> {
        (self.batch_size > 0).then_some(self.batch_size)
    }
}
