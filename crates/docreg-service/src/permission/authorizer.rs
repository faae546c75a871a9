//! The "may manage this group" predicate and its implementations.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::warn;

use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::types::{GroupId, UserId};

use crate::context::RequestContext;

/// Decides whether the acting user may manage a group's documents.
#[async_trait]
pub trait GroupAuthorizer: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `ctx.user_id` may manage `group_id`.
    async fn may_manage(&self, ctx: &RequestContext, group_id: GroupId) -> AppResult<bool>;
}

/// Fail with [`ErrorKind::Authorization`](docreg_core::error::ErrorKind::Authorization)
/// unless the acting user may manage `group_id`.
pub async fn require_manage(
    authorizer: &dyn GroupAuthorizer,
    ctx: &RequestContext,
    group_id: GroupId,
) -> AppResult<()> {
    if authorizer.may_manage(ctx, group_id).await? {
        return Ok(());
    }
    warn!(user_id = %ctx.user_id, group_id = %group_id, "Group management denied");
    Err(AppError::authorization(format!(
        "User {} may not manage group {group_id}",
        ctx.user_id
    )))
}

/// Grants every request. Used by the single-operator CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl GroupAuthorizer for AllowAll {
    async fn may_manage(&self, _ctx: &RequestContext, _group_id: GroupId) -> AppResult<bool> {
        Ok(true)
    }
}

/// Grants users the groups they are members of; global managers get all groups.
#[derive(Debug, Default)]
pub struct MembershipAuthorizer {
    members: DashMap<UserId, HashSet<GroupId>>,
    global_managers: DashSet<UserId>,
}

impl MembershipAuthorizer {
    /// Create an authorizer with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `user_id` manage `group_id`.
    pub fn grant(&self, user_id: UserId, group_id: GroupId) {
        self.members.entry(user_id).or_default().insert(group_id);
    }

    /// Withdraw a grant.
    pub fn revoke(&self, user_id: UserId, group_id: GroupId) {
        if let Some(mut groups) = self.members.get_mut(&user_id) {
            groups.remove(&group_id);
        }
    }

    /// Let `user_id` manage every group.
    pub fn grant_global(&self, user_id: UserId) {
        self.global_managers.insert(user_id);
    }
}

#[async_trait]
impl GroupAuthorizer for MembershipAuthorizer {
    async fn may_manage(&self, ctx: &RequestContext, group_id: GroupId) -> AppResult<bool> {
        if self.global_managers.contains(&ctx.user_id) {
            return Ok(true);
        }
        Ok(self
            .members
            .get(&ctx.user_id)
            .is_some_and(|groups| groups.contains(&group_id)))
    }
}
