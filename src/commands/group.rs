//! Group and category commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docreg_core::config::AppConfig;
use docreg_core::result::AppResult;
use docreg_core::types::{GroupId, UserId};
use docreg_entity::category::Category;
use docreg_entity::group::Group;
use docreg_service::{CreateCategoryRequest, CreateGroupRequest, UpdateGroupRequest};

use super::Runtime;
use crate::output::{self, OutputFormat};

/// Arguments for group commands
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Group subcommand
    #[command(subcommand)]
    pub command: GroupCommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Create a group with its default categories
    Create {
        /// Group name
        #[arg(short, long)]
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List the groups the user may manage
    List,
    /// Rename a group or change its description
    Update {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,
        /// New group name
        #[arg(short, long)]
        name: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a group that has no documents left
    Delete {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,
    },
    /// List a group's categories
    Categories {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,
    },
    /// Add a category to a group
    AddCategory {
        /// Group ID
        #[arg(short, long)]
        group: GroupId,
        /// Category name
        #[arg(short, long)]
        name: String,
        /// Code prefix
        #[arg(short, long)]
        prefix: String,
        /// Let callers supply year, sequential, and code
        #[arg(long)]
        manual: bool,
    },
}

/// Group display row
#[derive(Debug, Serialize, Tabled)]
struct GroupRow {
    /// Group ID
    id: String,
    /// Name
    name: String,
    /// Description
    description: String,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            description: group.description.clone().unwrap_or_default(),
        }
    }
}

/// Category display row
#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    /// Category ID
    id: String,
    /// Name
    name: String,
    /// Code prefix
    prefix: String,
    /// Sequencing policy
    policy: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            prefix: category.prefix.clone(),
            policy: if category.sequence_managed {
                "managed".to_string()
            } else {
                "manual".to_string()
            },
        }
    }
}

/// Execute group commands
pub async fn execute(
    args: &GroupArgs,
    config: &AppConfig,
    user: UserId,
    format: OutputFormat,
) -> AppResult<()> {
    let runtime = Runtime::connect(config).await?;
    let groups = &runtime.services.groups;

    match &args.command {
        GroupCommand::Create { name, description } => {
            let (group, categories) = groups
                .create_group(CreateGroupRequest {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            output::print_success(&format!("Group '{}' created", group.name));
            output::print_kv("ID", &group.id.to_string());
            let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();
            output::print_list(&rows, format);
        }
        GroupCommand::List => {
            // Listing does not depend on the active group.
            let ctx = super::context(user, GroupId::new());
            let listed = groups.list_groups(&ctx).await?;
            let rows: Vec<GroupRow> = listed.iter().map(GroupRow::from).collect();
            output::print_list(&rows, format);
        }
        GroupCommand::Update {
            group,
            name,
            description,
        } => {
            let ctx = super::context(user, *group);
            let updated = groups
                .update_group(
                    &ctx,
                    *group,
                    UpdateGroupRequest {
                        name: name.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            output::print_item(&GroupRow::from(&updated), format);
        }
        GroupCommand::Delete { group } => {
            let ctx = super::context(user, *group);
            groups.delete_group(&ctx, *group).await?;
            output::print_success(&format!("Group {group} deleted"));
        }
        GroupCommand::Categories { group } => {
            let ctx = super::context(user, *group);
            let categories = groups.list_categories(&ctx, *group).await?;
            let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();
            output::print_list(&rows, format);
        }
        GroupCommand::AddCategory {
            group,
            name,
            prefix,
            manual,
        } => {
            let ctx = super::context(user, *group);
            let category = groups
                .create_category(
                    &ctx,
                    *group,
                    CreateCategoryRequest {
                        name: name.clone(),
                        prefix: prefix.clone(),
                        sequence_managed: !manual,
                    },
                )
                .await?;
            output::print_item(&CategoryRow::from(&category), format);
        }
    }

    runtime.close().await;
    Ok(())
}
