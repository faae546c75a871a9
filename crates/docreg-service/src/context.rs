//! Request context carrying the acting user and the active group.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use docreg_core::types::{GroupId, UserId};

/// Context for the current request.
///
/// The active group is explicit request state: every service call that
/// creates or lists documents works inside `active_group`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
    /// The group the user is working in.
    pub active_group: GroupId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(user_id: UserId, active_group: GroupId) -> Self {
        Self {
            user_id,
            active_group,
            request_time: Utc::now(),
        }
    }

    /// Replace the request time.
    pub fn at(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = request_time;
        self
    }

    /// Calendar year of the request, used for managed sequencing.
    pub fn current_year(&self) -> i32 {
        self.request_time.year()
    }
}
