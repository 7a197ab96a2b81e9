pub mod chunk;
pub mod color_usage;
pub mod grid_manager;
pub mod histogram;
pub mod interpolator;
pub mod pixel;
pub mod pixel_buffer;
