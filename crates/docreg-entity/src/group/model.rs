//! Group entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docreg_core::types::GroupId;

/// An organizational unit that owns categories and documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Display name, also used in generated file names.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}
