// AstroVision Discovery - API Core
//
// Takes a night-sky photograph, plate-solves it, pulls the matching historical
// survey image and decides whether the field shows something new.
//
// Domain logic lives in domains/discovery; external services sit behind the
// kernel traits so runs can be driven by deterministic doubles in tests.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
