pub mod candidate_blob;
pub mod color_range;
pub mod contour;
pub mod marker;
pub mod mask;
pub mod pixel;
pub mod pixel_buffer;
pub mod pointer_actuator;
pub mod region_capturer;
pub mod target;
pub mod target_locator;
pub mod utils;

#[cfg(feature = "input")]
pub mod input;
#[cfg(feature = "screen")]
pub mod screen;
