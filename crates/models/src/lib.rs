//! SeaORM entities for accounts, role profiles and visit requests, plus
//! connection helpers and the small validation rules that live with the rows.

pub mod errors;
pub mod db;
pub mod account;
pub mod account_credentials;
pub mod gardener_profile;
pub mod client_profile;
pub mod visit_request;

#[cfg(test)]
mod tests;
