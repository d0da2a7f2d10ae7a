use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::{MemorySegmentStore, MongoSegmentStore};
use crate::error::Error;
use crate::utils::next_modified_at;

use super::{Segment, SegmentId};

#[async_trait]
pub trait SegmentStore: Send + Sync {
    async fn insert_segment(&self, segment: &Segment) -> Result<(), Error>;

    /// Newest first.
    async fn fetch_segments(&self) -> Result<Vec<Segment>, Error>;

    async fn fetch_segment_by_id(&self, segment_id: SegmentId) -> Result<Option<Segment>, Error>;

    /// Writes the segment back only if nobody else modified it since it was
    /// read, stamping a new `modified_at`.
    async fn update_segment(&self, segment: Segment) -> Result<Segment, Error>;

    async fn delete_segment(&self, segment_id: SegmentId) -> Result<(), Error>;
}

#[async_trait]
impl SegmentStore for MongoSegmentStore {
    #[tracing::instrument(skip(self))]
    async fn insert_segment(&self, segment: &Segment) -> Result<(), Error> {
        self.insert_one(segment, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_segments(&self) -> Result<Vec<Segment>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1, "_id": -1 })
            .build();

        let segments: Vec<Segment> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(segments)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_segment_by_id(&self, segment_id: SegmentId) -> Result<Option<Segment>, Error> {
        let segment: Option<Segment> = self
            .find_one(bson::doc! { "_id": segment_id }, None)
            .await?;

        Ok(segment)
    }

    #[tracing::instrument(skip(self))]
    async fn update_segment(&self, mut segment: Segment) -> Result<Segment, Error> {
        let old_modified_at = bson::DateTime::from_chrono(segment.modified_at);
        segment.modified_at = next_modified_at(segment.modified_at);

        let result = self
            .replace_one(
                bson::doc! { "_id": segment.id, "modified_at": old_modified_at },
                &segment,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(segment)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_segment(&self, segment_id: SegmentId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": segment_id }, None)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SegmentStore for MemorySegmentStore {
    #[tracing::instrument(skip(self))]
    async fn insert_segment(&self, segment: &Segment) -> Result<(), Error> {
        self.write().push(segment.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_segments(&self) -> Result<Vec<Segment>, Error> {
        let mut segments = self.read().clone();
        segments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(segments)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_segment_by_id(&self, segment_id: SegmentId) -> Result<Option<Segment>, Error> {
        let segment = self.read().iter().find(|s| s.id == segment_id).cloned();

        Ok(segment)
    }

    #[tracing::instrument(skip(self))]
    async fn update_segment(&self, mut segment: Segment) -> Result<Segment, Error> {
        let mut segments = self.write();
        let stored = segments
            .iter_mut()
            .find(|s| s.id == segment.id && s.modified_at == segment.modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        segment.modified_at = next_modified_at(segment.modified_at);
        *stored = segment.clone();

        Ok(segment)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_segment(&self, segment_id: SegmentId) -> Result<(), Error> {
        self.write().retain(|s| s.id != segment_id);

        Ok(())
    }
}
