//! Core abstractions for the offline support toolkit.
//!
//! This crate provides the fundamental types and traits:
//! - `WorkerConfig` - Immutable worker configuration (cache names, asset manifest)
//! - `FetchRequest` / `FetchResponse` - Intercepted request/response model
//! - `Fetcher` trait - Network collaborator interface
//! - Error taxonomy shared by the cache and worker crates

mod config;
mod error;
mod fetcher;
mod request;
mod response;

pub use config::*;
pub use error::*;
pub use fetcher::*;
pub use request::*;
pub use response::*;
