//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod actor;
pub mod auth;
pub mod visits;
pub mod accounts;
pub mod memory;
#[cfg(test)]
pub mod test_support;

pub use actor::Actor;
