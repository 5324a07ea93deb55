//! Shared helpers: token signing, password hashing and validated extractors.

pub mod jwt;
pub mod password;
pub mod validate;

pub use validate::{PathParam, ValidatedJson, ValidatedQuery};
