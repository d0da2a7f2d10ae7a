use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audience::AudienceEstimator;
use crate::database::Database;
use crate::error::Error;
use crate::utils::SuccessBody;
use crate::validation;

use super::{manager, Segment, SegmentCriteria, SegmentId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentBody {
    pub id: SegmentId,
    pub name: String,
    pub description: Option<String>,
    pub criteria: SegmentCriteria,
    pub customer_count: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl SegmentBody {
    pub fn render(segment: Segment) -> SegmentBody {
        SegmentBody {
            id: segment.id,
            name: segment.name,
            description: segment.description,
            criteria: segment.criteria,
            customer_count: segment.customer_count,
            created_at: segment.created_at,
            modified_at: segment.modified_at,
        }
    }
}

#[post("/segments")]
#[tracing::instrument(skip(db, estimator))]
pub async fn create_segment(
    db: Data<Box<dyn Database>>,
    estimator: Data<Box<dyn AudienceEstimator>>,
    body: Json<Value>,
) -> Result<Json<SegmentBody>, Error> {
    let form = validation::validate(&body)?;

    let segment = manager::create_segment(&***db, &***estimator, form).await?;

    Ok(Json(SegmentBody::render(segment)))
}

#[get("/segments")]
#[tracing::instrument(skip(db))]
pub async fn get_segments(db: Data<Box<dyn Database>>) -> Result<Json<Vec<SegmentBody>>, Error> {
    let segments = manager::get_segments(&***db).await?;

    let body = segments.into_iter().map(SegmentBody::render).collect();

    Ok(Json(body))
}

#[get("/segments/{segment_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_segment_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<SegmentId>,
) -> Result<Json<SegmentBody>, Error> {
    let segment_id = params.into_inner();
    let segment = manager::get_segment_by_id(&***db, segment_id)
        .await?
        .ok_or(Error::SegmentNotFound { segment_id })?;

    Ok(Json(SegmentBody::render(segment)))
}

#[put("/segments/{segment_id}")]
#[tracing::instrument(skip(db))]
pub async fn edit_segment(
    db: Data<Box<dyn Database>>,
    params: Path<SegmentId>,
    body: Json<Value>,
) -> Result<Json<SegmentBody>, Error> {
    let segment_id = params.into_inner();
    let form = validation::validate(&body)?;

    let segment = manager::edit_segment(&***db, segment_id, form).await?;

    Ok(Json(SegmentBody::render(segment)))
}

#[delete("/segments/{segment_id}")]
#[tracing::instrument(skip(db))]
pub async fn delete_segment(
    db: Data<Box<dyn Database>>,
    params: Path<SegmentId>,
) -> Result<Json<SuccessBody>, Error> {
    let segment_id = params.into_inner();

    manager::delete_segment(&***db, segment_id).await?;

    Ok(Json(SuccessBody {}))
}
