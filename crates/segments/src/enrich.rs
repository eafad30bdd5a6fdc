//! Enrichment — fans per-segment stats out concurrently and reassembles the
//! results in the original segment order.

use std::sync::Arc;

use audience_core::error::AudienceResult;
use audience_core::types::{Segment, SegmentMetaData};
use futures::future::try_join_all;

use crate::stats::SegmentStatsAggregator;

pub struct SegmentEnrichment {
    aggregator: Arc<SegmentStatsAggregator>,
}

impl SegmentEnrichment {
    pub fn new(aggregator: Arc<SegmentStatsAggregator>) -> Self {
        Self { aggregator }
    }

    /// One `compute_stats` per segment, issued concurrently; the fan-out is
    /// bounded by the page size. Output order matches input order no matter
    /// which computation finishes first. A failing segment fails the whole
    /// batch — entries are never silently dropped.
    pub async fn enrich(&self, segments: Vec<Segment>) -> AudienceResult<Vec<SegmentMetaData>> {
        let stats = try_join_all(
            segments
                .iter()
                .map(|segment| self.aggregator.compute_stats(segment.id)),
        )
        .await?;

        Ok(segments
            .into_iter()
            .zip(stats)
            .map(|(segment, meta)| SegmentMetaData { segment, meta })
            .collect())
    }
}
