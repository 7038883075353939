pub mod config;
pub mod database_validator;
