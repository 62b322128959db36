//! Construction parameters for `HashTable`.

pub const DEFAULT_BUCKET_COUNT: usize = 1000;
pub const DEFAULT_BUCKET_CAPACITY: usize = 256;

/// Bucket layout chosen at construction. The bucket count is fixed for the
/// table's lifetime; each bucket grows on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub bucket_count: usize,
    /// Initial slots per bucket, sentinel included.
    pub bucket_capacity: usize,
}

impl TableConfig {
    pub const fn new(bucket_count: usize, bucket_capacity: usize) -> Self {
        Self {
            bucket_count,
            bucket_capacity,
        }
    }

    pub const fn with_bucket_count(self, bucket_count: usize) -> Self {
        Self {
            bucket_count,
            ..self
        }
    }

    pub const fn with_bucket_capacity(self, bucket_capacity: usize) -> Self {
        Self {
            bucket_capacity,
            ..self
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_COUNT, DEFAULT_BUCKET_CAPACITY)
    }
}
