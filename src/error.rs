// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The errors a render can fail with.  All of them are local to a
//! single render; nothing here survives past the call that produced it.

use failure::Fail;

/// Everything that can go wrong between configuring a renderer and
/// handing its buffer to a sink.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RenderError {
    /// The integral plane has no area.
    #[fail(display = "image size {}x{} has no pixels", width, height)]
    EmptyImage {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// The two corners of the plane window share a coordinate.
    #[fail(display = "plane window has zero span on the {} axis", axis)]
    DegenerateWindow {
        /// "real" or "imaginary"
        axis: &'static str,
    },

    /// A corner, or a step derived from the corners, is NaN or infinite.
    #[fail(display = "plane window is not finite")]
    NonFiniteWindow,

    /// `save` was asked for a buffer that was never computed.
    #[fail(display = "the fractal has not been computed yet")]
    NotComputed,

    /// Zero threads were requested.
    #[fail(display = "thread count must be at least 1, got {}", _0)]
    InvalidThreadCount(usize),

    /// Zero pixel scale was requested.
    #[fail(display = "pixel scale must be at least 1, got {}", _0)]
    InvalidScale(u32),

    /// The cancellation flag was raised mid-render.
    #[fail(display = "render cancelled")]
    Cancelled,

    /// A worker thread died before finishing its band.
    #[fail(display = "render worker panicked")]
    Worker,

    /// The image sink could not persist the buffer.
    #[fail(display = "could not save {}: {}", name, reason)]
    Save {
        /// The name the buffer was saved under
        name: String,
        /// What the encoder or filesystem said
        reason: String,
    },
}
