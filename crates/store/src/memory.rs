//! In-memory store backend for tests and local development.

use async_trait::async_trait;
use audience_core::error::AudienceResult;
use audience_core::types::{Segment, User};
use dashmap::DashMap;
use uuid::Uuid;

use crate::query::{SegmentPage, SegmentQuery};
use crate::SegmentStore;

pub struct MemoryStore {
    segments: DashMap<Uuid, Segment>,
    users: DashMap<Uuid, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            segments: DashMap::new(),
            users: DashMap::new(),
        }
    }

    pub fn insert_segment(&self, segment: Segment) {
        self.segments.insert(segment.id, segment);
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn find_segments(&self, query: &SegmentQuery) -> AudienceResult<SegmentPage> {
        // Literal substring match — no pattern engine involved, so no
        // escaping is needed here.
        let needle = query.name_search().map(str::to_lowercase);

        let mut matching: Vec<Segment> = self
            .segments
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.value().name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total_count = matching.len() as u64;
        let page = query.page();
        let segments = matching
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(SegmentPage {
            segments,
            total_count,
        })
    }

    async fn segment_by_id(&self, id: Uuid) -> AudienceResult<Option<Segment>> {
        Ok(self.segments.get(&id).map(|s| s.clone()))
    }

    async fn users_in_segment(&self, segment_id: Uuid) -> AudienceResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.value().is_member_of(segment_id))
            .map(|entry| entry.value().clone())
            .collect())
    }
}
