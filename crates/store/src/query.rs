//! Typed query descriptors, validated at construction rather than at the
//! store boundary.

use audience_core::error::{AudienceError, AudienceResult};
use audience_core::types::Segment;

/// A pagination window. `limit` must be positive; `skip` may point past the
/// end of the matches, which yields an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: u64,
    limit: u64,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> AudienceResult<Self> {
        if limit == 0 {
            return Err(AudienceError::Query("limit must be positive".to_string()));
        }
        Ok(Self { skip, limit })
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// A segment listing query: an optional case-insensitive name filter plus a
/// pagination window. The search text is always matched as a literal
/// substring — backends must escape it before handing it to any pattern
/// engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentQuery {
    name_search: Option<String>,
    page: Page,
}

impl SegmentQuery {
    pub fn new(page: Page) -> Self {
        Self {
            name_search: None,
            page,
        }
    }

    /// Empty or whitespace-only search text is treated as "no filter".
    pub fn with_name_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let trimmed = search.trim();
        self.name_search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn name_search(&self) -> Option<&str> {
        self.name_search.as_deref()
    }

    pub fn page(&self) -> Page {
        self.page
    }
}

/// One page of matching segments plus the count of all matches before the
/// page window was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPage {
    pub segments: Vec<Segment>,
    pub total_count: u64,
}
