pub mod critical_path;
pub mod lanes;
pub mod validate;

pub use critical_path::{CriticalPath, CriticalPathError, critical_path};
pub use lanes::{LaneAssignment, pack_attachments};
pub use validate::{Rejection, validate_dependency, validate_dependency_against};
