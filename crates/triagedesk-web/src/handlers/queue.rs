//! Ordered queue view.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use triagedesk_common::Profile;
use triagedesk_engine::QueueEntry;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct QueueFilter {
    /// Profile name, `all`, or absent.
    pub profile: Option<String>,
}

impl QueueFilter {
    pub fn profile(&self) -> Result<Option<Profile>, ApiError> {
        match self.profile.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(name) => name.parse().map(Some).map_err(ApiError::BadRequest),
        }
    }
}

/// GET /api/queue?profile=
pub async fn api_queue(
    State(state): State<SharedState>,
    filter: Result<Query<QueueFilter>, QueryRejection>,
) -> Result<Json<Vec<QueueEntry>>, ApiError> {
    let Query(filter) = filter?;
    let profile = filter.profile()?;
    Ok(Json(state.desk.queue(profile, Utc::now()).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(p: Option<&str>) -> QueueFilter {
        QueueFilter { profile: p.map(str::to_string) }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!(filter(None).profile().unwrap(), None);
        assert_eq!(filter(Some("all")).profile().unwrap(), None);
        assert_eq!(filter(Some("neuro")).profile().unwrap(), Some(Profile::Neuro));
        assert!(filter(Some("cardiology")).profile().is_err());
    }
}
