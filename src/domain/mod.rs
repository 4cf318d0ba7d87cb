pub mod account;
pub mod error;
pub mod repository;
pub mod validation;
