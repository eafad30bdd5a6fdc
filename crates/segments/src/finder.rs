//! Segment search and pagination.

use std::sync::Arc;

use audience_core::error::AudienceResult;
use audience_store::{Page, SegmentPage, SegmentQuery, SegmentStore};
use tracing::debug;

/// Resolves a page of segments matching an optional name filter, newest
/// first, together with the total number of matches.
pub struct SegmentFinder {
    store: Arc<dyn SegmentStore>,
}

impl SegmentFinder {
    pub fn new(store: Arc<dyn SegmentStore>) -> Self {
        Self { store }
    }

    /// `name_search` filters case-insensitively on the literal search text.
    /// A `skip` past the last match yields an empty page with the true
    /// `total_count`.
    pub async fn find(
        &self,
        skip: u64,
        limit: u64,
        name_search: Option<&str>,
    ) -> AudienceResult<SegmentPage> {
        let mut query = SegmentQuery::new(Page::new(skip, limit)?);
        if let Some(search) = name_search {
            query = query.with_name_search(search);
        }

        let page = self.store.find_segments(&query).await?;
        debug!(
            skip,
            limit,
            total = page.total_count,
            returned = page.segments.len(),
            "Resolved segment page"
        );
        Ok(page)
    }
}
