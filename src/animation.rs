// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame sequences.  A schedule picks the plane window for each frame
//! number; the driver renders the frames one after another and saves
//! them under sequential names.

use std::ops::Range;

use crate::error::RenderError;
use crate::escape::EscapeFunction;
use crate::planes::{ImageSize, PlaneWindow};
use crate::progress::RenderControls;
use crate::renderer::{FractalRenderer, RenderSettings};
use crate::sink::ImageSink;

/// Chooses the plane window of a frame.
pub trait Schedule {
    /// The window for frame number `frame`.
    fn window(&self, frame: usize) -> PlaneWindow;
}

impl<F> Schedule for F
where
    F: Fn(usize) -> PlaneWindow,
{
    fn window(&self, frame: usize) -> PlaneWindow {
        self(frame)
    }
}

/// Zooms toward a point: frame `i` shows the base window scaled by
/// `factor^i` about the origin and shifted by `-delta` on both axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoomSchedule {
    base: PlaneWindow,
    factor: f64,
    delta: f64,
}

impl ZoomSchedule {
    /// A zoom over `base`.
    pub fn new(base: PlaneWindow, factor: f64, delta: f64) -> Self {
        ZoomSchedule {
            base,
            factor,
            delta,
        }
    }
}

impl Default for ZoomSchedule {
    /// (-2,-2)..(2,2), shrinking by 1% a frame, drifting by 0.09075.
    fn default() -> Self {
        ZoomSchedule::new(PlaneWindow::new((-2.0, -2.0), (2.0, 2.0)), 0.99, 0.09075)
    }
}

impl Schedule for ZoomSchedule {
    fn window(&self, frame: usize) -> PlaneWindow {
        self.base.zoomed(self.factor.powi(frame as i32), self.delta)
    }
}

/// Renders a numbered run of frames.
pub struct FrameDriver<F, S> {
    size: ImageSize,
    function: F,
    schedule: S,
    settings: RenderSettings,
    prefix: String,
}

impl<F, S> FrameDriver<F, S>
where
    F: EscapeFunction + Clone,
    S: Schedule,
{
    /// Frames are named `{prefix}{number}.png`.
    pub fn new(size: ImageSize, function: F, schedule: S, prefix: &str) -> Self {
        FrameDriver {
            size,
            function,
            schedule,
            settings: RenderSettings::default(),
            prefix: prefix.to_string(),
        }
    }

    /// Use `settings` for every frame.
    pub fn settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The name frame `frame` is saved under.
    pub fn frame_name(&self, frame: usize) -> String {
        format!("{}{}.png", self.prefix, frame)
    }

    /// Render and save every frame in `frames`, in order.  Stops at
    /// the first failure.  Returns the number of frames saved.
    pub fn run(
        &self,
        frames: Range<usize>,
        sink: &mut dyn ImageSink,
        controls: &RenderControls,
    ) -> Result<usize, RenderError> {
        let mut saved = 0;
        for frame in frames {
            let window = self.schedule.window(frame);
            let mut renderer = FractalRenderer::with_settings(
                self.size,
                window,
                self.function.clone(),
                self.settings,
            )?;
            renderer.compute_with(controls)?;
            let name = self.frame_name(frame);
            renderer.save(sink, &name)?;
            tracing::info!(frame, name = %name, "frame saved");
            saved += 1;
        }
        Ok(saved)
    }
}
