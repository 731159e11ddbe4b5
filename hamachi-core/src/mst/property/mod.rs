//! Property-based tests for the dual-tree Borůvka engine.
//!
//! Verifies both tree paths against a brute-force Prim oracle over the
//! mutual-reachability graph, and checks the structural properties that do
//! not need an oracle: spanning-tree shape, the cycle property, and
//! invariance of the weight multiset under input permutation.

mod oracle;
mod strategies;
