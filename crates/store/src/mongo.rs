//! MongoDB store backend, enabled with the `mongodb-store` feature.
//!
//! Segments and users are stored in the `segments` and `users` collections
//! with their UUIDv7 ids serialized into an `id` field; hyphenated UUID
//! strings sort the same way the ids do, so `$sort {id: -1}` is
//! newest-first.

use async_trait::async_trait;
use audience_core::error::{AudienceError, AudienceResult};
use audience_core::types::{Segment, User};
use futures::TryStreamExt;
use mongodb::bson::{doc, from_bson, Bson, Document};
use mongodb::{Client, Collection, Database};
use tracing::debug;
use uuid::Uuid;

use crate::query::{SegmentPage, SegmentQuery};
use crate::SegmentStore;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(url: &str, database: &str) -> AudienceResult<Self> {
        let client = Client::with_uri_str(url).await.map_err(store_err)?;
        debug!(database, "MongoDB client initialized");
        Ok(Self {
            db: client.database(database),
        })
    }

    fn segments(&self) -> Collection<Segment> {
        self.db.collection("segments")
    }

    fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }
}

#[async_trait]
impl SegmentStore for MongoStore {
    async fn find_segments(&self, query: &SegmentQuery) -> AudienceResult<SegmentPage> {
        let mut pipeline: Vec<Document> = Vec::new();

        if let Some(search) = query.name_search() {
            // Escaped, so the search text is a literal substring and never
            // pattern syntax.
            pipeline.push(doc! {
                "$match": {
                    "name": { "$regex": regex::escape(search), "$options": "i" }
                }
            });
        }

        // Page and total come from the same pass over the collection.
        pipeline.push(doc! {
            "$facet": {
                "segments": [
                    { "$sort": { "id": -1 } },
                    { "$skip": query.page().skip() as i64 },
                    { "$limit": query.page().limit() as i64 },
                ],
                "total": [
                    { "$count": "count" }
                ],
            }
        });

        let mut cursor = self
            .segments()
            .aggregate(pipeline, None)
            .await
            .map_err(store_err)?;
        let facet = cursor
            .try_next()
            .await
            .map_err(store_err)?
            .ok_or_else(|| AudienceError::Store("aggregation returned no facet".to_string()))?;

        let segments = facet
            .get_array("segments")
            .map_err(store_err)?
            .iter()
            .map(|value| from_bson::<Segment>(value.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_err)?;

        // `$count` emits no document at all when nothing matched.
        let total_count = facet
            .get_array("total")
            .map_err(store_err)?
            .first()
            .and_then(Bson::as_document)
            .and_then(|d| d.get("count"))
            .map(count_as_u64)
            .unwrap_or(0);

        Ok(SegmentPage {
            segments,
            total_count,
        })
    }

    async fn segment_by_id(&self, id: Uuid) -> AudienceResult<Option<Segment>> {
        self.segments()
            .find_one(doc! { "id": id.to_string() }, None)
            .await
            .map_err(store_err)
    }

    async fn users_in_segment(&self, segment_id: Uuid) -> AudienceResult<Vec<User>> {
        // Matching a scalar against an array field selects documents whose
        // array contains the value.
        self.users()
            .find(doc! { "segment_ids": segment_id.to_string() }, None)
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)
    }
}

fn count_as_u64(value: &Bson) -> u64 {
    match value {
        Bson::Int32(n) => *n as u64,
        Bson::Int64(n) => *n as u64,
        _ => 0,
    }
}

fn store_err<E: std::fmt::Display>(err: E) -> AudienceError {
    AudienceError::Store(err.to_string())
}
