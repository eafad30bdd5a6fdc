//! Document-store boundary — typed query descriptors and the store backends
//! that execute them.

pub mod memory;
#[cfg(feature = "mongodb-store")]
pub mod mongo;
pub mod query;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb-store")]
pub use mongo::MongoStore;
pub use query::{Page, SegmentPage, SegmentQuery};

use async_trait::async_trait;
use audience_core::error::AudienceResult;
use audience_core::types::{Segment, User};
use uuid::Uuid;

/// Read-only handle to the document store. Constructed once at process
/// start and injected into the components as a shared handle; backends
/// carry no request state.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Filter by the query's name search, sort id-descending, apply the
    /// page window, and count all matches — in a single call, so the page
    /// and `total_count` come from the same pass over the collection.
    async fn find_segments(&self, query: &SegmentQuery) -> AudienceResult<SegmentPage>;

    async fn segment_by_id(&self, id: Uuid) -> AudienceResult<Option<Segment>>;

    /// All users whose `segment_ids` set contains `segment_id`.
    async fn users_in_segment(&self, segment_id: Uuid) -> AudienceResult<Vec<User>>;
}
