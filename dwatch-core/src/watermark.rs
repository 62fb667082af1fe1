//! The "last seen" cursor driving incremental fetches.
//!
//! The cursor only moves forward. The next fetch starts `boundary_offset_ms`
//! past it so the record that set it is not returned again. This assumes
//! distinct records are at least that far apart: two records sharing a
//! timestamp across a poll boundary can still be skipped.

/// Millisecond timestamp of the newest processed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    millis: i64,
    boundary_offset_ms: i64,
}

impl Watermark {
    pub fn new(millis: i64, boundary_offset_ms: i64) -> Self {
        Self {
            millis,
            boundary_offset_ms,
        }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Lower bound for the next fetch.
    pub fn search_from(&self) -> i64 {
        self.millis.saturating_add(self.boundary_offset_ms)
    }

    /// Move forward to `millis` if it is newer. Returns whether it moved.
    pub fn advance(&mut self, millis: i64) -> bool {
        if millis > self.millis {
            self.millis = millis;
            true
        } else {
            false
        }
    }
}
