//! Group management authorization.

pub mod authorizer;

pub use authorizer::{AllowAll, GroupAuthorizer, MembershipAuthorizer, require_manage};
