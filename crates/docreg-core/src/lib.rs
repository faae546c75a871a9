//! # docreg-core
//!
//! Core crate for DocReg. Contains the collaborator traits (blob storage,
//! PDF rendering), configuration schemas, typed identifiers, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other DocReg crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
