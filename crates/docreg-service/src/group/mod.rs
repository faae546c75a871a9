//! Groups and their document categories.

pub mod service;

pub use service::{CreateCategoryRequest, CreateGroupRequest, GroupService, UpdateGroupRequest};
