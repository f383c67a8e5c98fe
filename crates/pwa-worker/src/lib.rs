//! Background worker core: request routing, cache strategies, and the
//! install/activate/fetch lifecycle.
//!
//! Every intercepted fetch flows `classify` -> strategy -> cache generation.
//! No strategy ever fails past its boundary: the worst case for the page is a
//! synthetic 503 placeholder, never an unhandled error.

mod router;
mod strategy;
mod worker;

pub use router::*;
pub use strategy::*;
pub use worker::*;
