//! Cache generations for the offline support toolkit.
//!
//! This crate provides:
//! - `CacheStore` - The cache store collaborator trait
//! - `MemoryCacheStore` - Functional in-memory backend for development/testing
//! - `GenerationManager` - Versioned generation lifecycle (install, activate,
//!   get, put)

mod generation;
mod store;

pub use generation::*;
pub use store::*;
