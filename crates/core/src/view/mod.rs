pub mod frame;
pub mod zoom;

pub use frame::FrameSlot;
pub use zoom::{MS_PER_DAY, TimeWindow, TimeZoom, WheelInput, ZoomConfig};
