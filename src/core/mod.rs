//! Core types & traits: schema translation, content mapping and the backend seam.

pub mod content;
pub mod error;
pub mod schema;
pub mod tool;
