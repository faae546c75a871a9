//! # docreg-service
//!
//! Business logic for DocReg. Services take their stores, blob storage,
//! PDF backend, and group authorizer at construction time as `Arc` trait
//! objects, and every call receives a [`RequestContext`] naming the acting
//! user and the active group.

pub mod artifact;
pub mod context;
pub mod document;
pub mod group;
pub mod permission;
pub mod registry;
pub mod sequence;
pub mod template;

pub use artifact::{ArtifactCache, AttachmentService, AttachmentUpload, GeneratedPdf};
pub use context::RequestContext;
pub use document::{CreateDocumentRequest, DocumentDetail, DocumentService, UpdateDocumentRequest};
pub use group::{CreateCategoryRequest, CreateGroupRequest, GroupService, UpdateGroupRequest};
pub use permission::{AllowAll, GroupAuthorizer, MembershipAuthorizer};
pub use registry::ServiceRegistry;
pub use sequence::{CodeSequencer, DocumentCode};
pub use template::{CreateLayoutTemplateRequest, CreatePlainTemplateRequest, TemplateService};
