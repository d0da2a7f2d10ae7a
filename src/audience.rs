use async_trait::async_trait;
use rand::Rng;

use crate::error::Error;

/// Estimates how many customers a segment reaches.
///
/// Segment customer counts and campaign audience sizes both come from here so
/// a real counting query can replace the placeholder without touching the
/// lifecycle code.
#[async_trait]
pub trait AudienceEstimator: Send + Sync {
    async fn estimate_audience(&self, segment_name: Option<&str>) -> Result<i64, Error>;
}

pub const RECENT_SIGNUPS: &str = "Recent Signups";
pub const RECENT_SIGNUPS_AUDIENCE: i64 = 300;

/// Stand-in estimator: a fixed size for "Recent Signups", otherwise a random
/// size in `200..1200`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEstimator;

#[async_trait]
impl AudienceEstimator for PlaceholderEstimator {
    #[tracing::instrument(skip(self))]
    async fn estimate_audience(&self, segment_name: Option<&str>) -> Result<i64, Error> {
        if segment_name == Some(RECENT_SIGNUPS) {
            return Ok(RECENT_SIGNUPS_AUDIENCE);
        }

        let estimate = rand::thread_rng().gen_range(200..1200);

        Ok(estimate)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    /// Always answers with the same size.
    pub struct FixedEstimator(pub i64);

    #[async_trait]
    impl AudienceEstimator for FixedEstimator {
        async fn estimate_audience(&self, _segment_name: Option<&str>) -> Result<i64, Error> {
            Ok(self.0)
        }
    }
}
