//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, token verification and actor resolution live here;
//! storage goes through [`repository::AccountRepository`].

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
