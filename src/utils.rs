use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuccessBody {}

/// The `modified_at` stamped on a write that replaces a record last modified
/// at `previous`.
///
/// Mongo keeps dates to the millisecond, so the stamp is truncated to that
/// and always lands at least one millisecond after `previous`. Otherwise a
/// write in the same millisecond would leave the stored value unchanged and
/// a second writer holding the old value would still match the guard.
pub fn next_modified_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(3);
    let floor = previous.trunc_subsecs(3) + Duration::milliseconds(1);

    now.max(floor)
}
