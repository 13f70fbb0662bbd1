#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! An escape-time fractal takes a point on the complex plane, feeds it
//! through a recurrence over and over, and measures how quickly the
//! result runs off toward infinity.  That "velocity" picks the color of
//! the pixel the point came from.  Points that never leave are painted
//! with a fixed sentinel color.
//!
//! The pieces, leaf first:
//!
//! * [`escape`] holds the recurrences (a Mandelbrot, and a Julia set
//!   with a sine folded into its real part),
//! * [`planes`] maps pixels onto a window of the complex plane,
//! * [`renderer`] runs the two over every pixel into an owned canvas,
//!   and [`sink`] persists the result,
//! * [`animation`] renders numbered frame sequences over a moving window.

pub mod animation;
pub mod color;
pub mod error;
pub mod escape;
pub mod planes;
pub mod progress;
pub mod renderer;
pub mod sink;

pub use animation::{FrameDriver, Schedule, ZoomSchedule};
pub use error::RenderError;
pub use escape::{Escape, EscapeFunction, Julia, Mandelbrot};
pub use planes::{Extent, ImageSize, Pixel, PlaneMapper, PlaneWindow};
pub use progress::{CancelFlag, LogProgress, Progress, RenderControls};
pub use renderer::{Canvas, FractalRenderer, RenderSettings};
pub use sink::{FileSink, ImageSink, MemorySink};
