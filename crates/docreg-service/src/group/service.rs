//! Group and category management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use docreg_core::result::AppResult;
use docreg_core::types::GroupId;
use docreg_database::{CategoryStore, GroupStore};
use docreg_entity::category::{Category, CreateCategory, DEFAULT_CATEGORIES};
use docreg_entity::group::{CreateGroup, Group};

use crate::context::RequestContext;
use crate::permission::{GroupAuthorizer, require_manage};

/// Request to create a group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Request to rename a group or change its description.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Request to add a category to a group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Code prefix.
    #[validate(length(min = 1, max = 32))]
    pub prefix: String,
    /// Whether codes are server-assigned.
    pub sequence_managed: bool,
}

/// Manages groups and categories.
#[derive(Debug, Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupStore>,
    categories: Arc<dyn CategoryStore>,
    authorizer: Arc<dyn GroupAuthorizer>,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(
        groups: Arc<dyn GroupStore>,
        categories: Arc<dyn CategoryStore>,
        authorizer: Arc<dyn GroupAuthorizer>,
    ) -> Self {
        Self {
            groups,
            categories,
            authorizer,
        }
    }

    /// Create a group with its default managed categories.
    pub async fn create_group(&self, req: CreateGroupRequest) -> AppResult<(Group, Vec<Category>)> {
        req.validate()?;
        let group = self
            .groups
            .create_group(&CreateGroup {
                name: req.name.trim().to_string(),
                description: req.description,
            })
            .await?;

        let mut categories = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for (name, prefix) in DEFAULT_CATEGORIES {
            let category = self
                .categories
                .create_category(&CreateCategory {
                    group_id: group.id,
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                    sequence_managed: true,
                })
                .await?;
            categories.push(category);
        }

        info!(group_id = %group.id, name = %group.name, "Created group");
        Ok((group, categories))
    }

    /// The groups the acting user may manage, by name.
    pub async fn list_groups(&self, ctx: &RequestContext) -> AppResult<Vec<Group>> {
        let mut visible = Vec::new();
        for group in self.groups.list_groups().await? {
            if self.authorizer.may_manage(ctx, group.id).await? {
                visible.push(group);
            }
        }
        Ok(visible)
    }

    /// Rename a group or change its description.
    pub async fn update_group(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        req: UpdateGroupRequest,
    ) -> AppResult<Group> {
        req.validate()?;
        require_manage(self.authorizer.as_ref(), ctx, group_id).await?;
        let group = self
            .groups
            .update_group(
                group_id,
                &CreateGroup {
                    name: req.name.trim().to_string(),
                    description: req.description,
                },
            )
            .await?;
        info!(group_id = %group.id, name = %group.name, "Updated group");
        Ok(group)
    }

    /// Delete a group and its categories.
    ///
    /// Refused with `Conflict` while the group still owns documents.
    pub async fn delete_group(&self, ctx: &RequestContext, group_id: GroupId) -> AppResult<()> {
        require_manage(self.authorizer.as_ref(), ctx, group_id).await?;
        self.groups.delete_group(group_id).await?;
        info!(group_id = %group_id, "Deleted group");
        Ok(())
    }

    /// Add a category to a group.
    pub async fn create_category(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        req: CreateCategoryRequest,
    ) -> AppResult<Category> {
        req.validate()?;
        require_manage(self.authorizer.as_ref(), ctx, group_id).await?;
        let category = self
            .categories
            .create_category(&CreateCategory {
                group_id,
                name: req.name.trim().to_string(),
                prefix: req.prefix.trim().to_string(),
                sequence_managed: req.sequence_managed,
            })
            .await?;
        info!(
            group_id = %group_id,
            category_id = %category.id,
            managed = category.sequence_managed,
            "Created category"
        );
        Ok(category)
    }

    /// A group's categories, by name.
    pub async fn list_categories(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> AppResult<Vec<Category>> {
        require_manage(self.authorizer.as_ref(), ctx, group_id).await?;
        self.categories.list_categories(group_id).await
    }
}
