//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod skyview_client;
pub mod test_dependencies;
pub mod traits;

pub use deps::{AstrometryAdapter, ServerDeps};
pub use skyview_client::SkyViewClient;
pub use test_dependencies::{MockPlateSolver, MockReferenceImageSource, TestDependencies};
pub use traits::*;
