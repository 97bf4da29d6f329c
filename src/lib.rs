pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
