use chrono::Utc;

use crate::audience::AudienceEstimator;
use crate::database::Database;
use crate::error::Error;

use super::form::SegmentForm;
use super::{Segment, SegmentId};

#[tracing::instrument(skip(db, estimator))]
pub async fn create_segment(
    db: &dyn Database,
    estimator: &dyn AudienceEstimator,
    form: SegmentForm,
) -> Result<Segment, Error> {
    let customer_count = estimator.estimate_audience(Some(&form.name)).await?;

    let now = Utc::now();
    let segment = Segment {
        id: SegmentId::new(),
        name: form.name,
        description: form.description,
        criteria: form.criteria,
        customer_count,
        created_at: now,
        modified_at: now,
    };

    db.segments().insert_segment(&segment).await?;

    Ok(segment)
}

#[tracing::instrument(skip(db))]
pub async fn get_segments(db: &dyn Database) -> Result<Vec<Segment>, Error> {
    let segments = db.segments().fetch_segments().await?;

    Ok(segments)
}

#[tracing::instrument(skip(db))]
pub async fn get_segment_by_id(
    db: &dyn Database,
    segment_id: SegmentId,
) -> Result<Option<Segment>, Error> {
    let segment = db.segments().fetch_segment_by_id(segment_id).await?;

    Ok(segment)
}

/// Replaces the editable fields. The customer count stays what it was when
/// the segment was created.
#[tracing::instrument(skip(db))]
pub async fn edit_segment(
    db: &dyn Database,
    segment_id: SegmentId,
    form: SegmentForm,
) -> Result<Segment, Error> {
    let mut segment = db
        .segments()
        .fetch_segment_by_id(segment_id)
        .await?
        .ok_or(Error::SegmentNotFound { segment_id })?;

    segment.name = form.name;
    segment.description = form.description;
    segment.criteria = form.criteria;

    db.segments().update_segment(segment).await
}

/// Deleting a segment that doesn't exist is not an error. Campaigns that
/// target it keep their snapshot of its name.
#[tracing::instrument(skip(db))]
pub async fn delete_segment(db: &dyn Database, segment_id: SegmentId) -> Result<(), Error> {
    db.segments().delete_segment(segment_id).await
}
