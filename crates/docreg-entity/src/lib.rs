//! # docreg-entity
//!
//! Domain entity models for DocReg. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod artifact;
pub mod category;
pub mod document;
pub mod group;
pub mod template;
