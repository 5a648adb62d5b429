pub mod error;
pub mod ports;
pub mod query;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod validation;
