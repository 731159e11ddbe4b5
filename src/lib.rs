//! Hamachi: dual-tree Borůvka minimum spanning trees under
//! mutual-reachability distance.
//!
//! This facade re-exports the [`hamachi_core`] public API; see that crate
//! for the engine, the spatial trees, and the configuration surface.

pub use hamachi_core::*;
