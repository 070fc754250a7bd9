//! Festival stage scheduling: random initial line-ups repaired by local
//! search until no placement rule is broken.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod conflicts;
pub mod data;
pub mod error;
pub mod generator;
pub mod repair;
pub mod server;
pub mod solver;

#[cfg(test)]
mod testing;
