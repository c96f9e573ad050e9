pub mod deletion_plan;
pub mod resolver;

pub use deletion_plan::{DeletionReport, FileFailure, SafeDeletionExecutor};
pub use resolver::{DuplicateGroupResolver, Resolution, ResolutionStats};
