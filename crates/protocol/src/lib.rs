pub mod shared_str;
pub mod timeline;
pub mod types;

pub use shared_str::SharedStr;
pub use timeline::{Attachment, Dependency, DependencyType};
pub use types::{Point, Rect};
