//! Visit request lifecycle: who sees what, who may move it where.

pub mod access;
pub mod domain;
pub mod input;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::VisitService;
