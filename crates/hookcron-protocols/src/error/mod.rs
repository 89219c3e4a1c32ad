//! Error types for the hookcron protocol layer.

mod store;

pub use store::*;
