//! HTTP clients for the upstream tool service.

pub mod catalog;
pub mod invoker;
