//! Fitblit - put raw pixel frames on a drawing surface, fast.
//!
//! Architecture overview:
//! - `frame`: borrowed and owned pixel buffers (1, 3 or 4 bytes per pixel)
//! - `format`: pixel format headers describing a buffer to the raster layer
//! - `geometry`: rectangles and the autofit/stretch layout math
//! - `raster`: the raster target seam plus a software implementation
//! - `present`: the presenter that ties it together for video-rate drawing
//! - `config`: tunable parameters for the presenter and the demo player

pub mod config;
pub mod format;
pub mod frame;
pub mod geometry;
pub mod present;
pub mod raster;

pub use format::{BitDepth, FormatHeader, FormatHeaders};
pub use frame::{FrameError, ImageBuf, ImageView};
pub use geometry::{fit_rect, FitMode, Rect, SurfaceDescriptor};
pub use present::{draw_stretched, BlitPath, DrawReport, PresentError, Presenter};
pub use raster::{Canvas, DrawStyle, MemorySurface, RasterTarget, StretchMode};
