// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The renderer walks every pixel of the integral plane, maps it onto
//! the complex plane, runs an escape function there and paints the
//! result into a canvas it owns.  A render is computed once and can
//! then be handed to any number of sinks.

use std::time::Instant;

use image::{Rgb, RgbImage};

use crate::color::legacy_color;
use crate::error::RenderError;
use crate::escape::EscapeFunction;
use crate::planes::{Extent, ImageSize, Pixel, PlaneMapper, PlaneWindow};
use crate::progress::{RenderControls, RowTracker};
use crate::sink::ImageSink;

/// The knobs of a render that are not the fractal itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Which pixel coordinates get evaluated.
    pub extent: Extent,
    /// Every evaluated pixel becomes a `scale` x `scale` block in the
    /// saved image.
    pub scale: u32,
    /// Worker threads.  One means the plain single-threaded pass.
    pub threads: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            extent: Extent::Inclusive,
            scale: 1,
            threads: 1,
        }
    }
}

impl RenderSettings {
    fn validate(&self) -> Result<(), RenderError> {
        if self.threads < 1 {
            return Err(RenderError::InvalidThreadCount(self.threads));
        }
        if self.scale < 1 {
            return Err(RenderError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// The computed grid of colors.  With an inclusive extent it holds one
/// more row and column than the image size; those are dropped when the
/// canvas is turned into an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    columns: usize,
    rows: usize,
    image_size: ImageSize,
    scale: u32,
    cells: Vec<Rgb<u8>>,
}

impl Canvas {
    /// Number of evaluated columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of evaluated rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The color computed for a pixel, if the pixel was evaluated.
    pub fn get(&self, pixel: &Pixel) -> Option<Rgb<u8>> {
        if pixel.0 >= self.columns || pixel.1 >= self.rows {
            return None;
        }
        Some(self.cells[pixel.1 * self.columns + pixel.0])
    }

    /// All evaluated colors, row by row.
    pub fn cells(&self) -> &[Rgb<u8>] {
        &self.cells
    }

    /// The image a sink receives: exactly the image size times the
    /// pixel scale, whatever the extent.
    pub fn to_image(&self) -> RgbImage {
        let scale = self.scale as usize;
        let width = (self.image_size.width() * scale) as u32;
        let height = (self.image_size.height() * scale) as u32;
        RgbImage::from_fn(width, height, |x, y| {
            self.cells[(y as usize / scale) * self.columns + (x as usize / scale)]
        })
    }
}

/// Renders one view of one fractal.
pub struct FractalRenderer<F: EscapeFunction> {
    plane: PlaneMapper,
    function: F,
    settings: RenderSettings,
    canvas: Option<Canvas>,
}

impl<F: EscapeFunction> FractalRenderer<F> {
    /// A single-threaded renderer over the inclusive extent at scale 1.
    pub fn new(size: ImageSize, window: PlaneWindow, function: F) -> Result<Self, RenderError> {
        FractalRenderer::with_settings(size, window, function, RenderSettings::default())
    }

    /// A renderer with explicit settings.  Fails if the plane is empty
    /// or degenerate, or if the settings are out of range.
    pub fn with_settings(
        size: ImageSize,
        window: PlaneWindow,
        function: F,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        settings.validate()?;
        let plane = PlaneMapper::new(size, window)?;
        Ok(FractalRenderer {
            plane,
            function,
            settings,
            canvas: None,
        })
    }

    /// The mapping this renderer evaluates over.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// The settings in force.
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// The canvas of the last successful compute.
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Give up the renderer and keep the canvas.
    pub fn into_canvas(self) -> Option<Canvas> {
        self.canvas
    }

    /// Compute every pixel with no observer and no cancellation.
    pub fn compute(&mut self) -> Result<&Canvas, RenderError> {
        self.compute_with(&RenderControls::default())
    }

    /// Compute every pixel.  A failed or cancelled pass leaves any
    /// earlier canvas in place.
    pub fn compute_with(&mut self, controls: &RenderControls) -> Result<&Canvas, RenderError> {
        let (columns, rows) = self.plane.grid(self.settings.extent);
        let span = tracing::info_span!(
            "compute",
            fractal = self.function.name(),
            columns,
            rows,
            threads = self.settings.threads
        );
        let _guard = span.enter();
        let started = Instant::now();

        let canvas = if self.settings.threads > 1 {
            self.render_threaded(controls)?
        } else {
            self.render_single(controls)?
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fractal computed"
        );
        Ok(self.canvas.insert(canvas))
    }

    /// Hand the computed canvas to `sink` under `name`.
    pub fn save(&self, sink: &mut dyn ImageSink, name: &str) -> Result<(), RenderError> {
        match self.canvas {
            None => Err(RenderError::NotComputed),
            Some(ref canvas) => sink.save(&canvas.to_image(), name),
        }
    }

    #[inline]
    fn color_at(&self, pixel: &Pixel) -> Rgb<u8> {
        let point = self.plane.pixel_to_point(pixel);
        legacy_color(self.function.legacy_count(self.function.escape(point)))
    }

    fn blank(&self) -> Canvas {
        let (columns, rows) = self.plane.grid(self.settings.extent);
        Canvas {
            columns,
            rows,
            image_size: self.plane.image_size,
            scale: self.settings.scale,
            cells: vec![Rgb([0, 0, 0]); columns * rows],
        }
    }

    /// The main function for single-threaded renders: one raster scan,
    /// row by row.
    fn render_single(&self, controls: &RenderControls) -> Result<Canvas, RenderError> {
        let mut canvas = self.blank();
        let columns = canvas.columns;
        let tracker = RowTracker::new(controls.progress, canvas.rows);
        for (pixel, cell) in self
            .plane
            .pixels(self.settings.extent)
            .zip(canvas.cells.iter_mut())
        {
            if pixel.0 == 0 && controls.cancelled() {
                return Err(RenderError::Cancelled);
            }
            *cell = self.color_at(&pixel);
            if pixel.0 + 1 == columns {
                tracker.row_done();
            }
        }
        Ok(canvas)
    }

    /// Paint a contiguous band of whole rows, the first of which is
    /// `first_row`.
    fn render_band(
        &self,
        first_row: usize,
        band: &mut [Rgb<u8>],
        columns: usize,
        controls: &RenderControls,
        tracker: &RowTracker,
    ) -> Result<(), RenderError> {
        for (offset, row) in band.chunks_mut(columns).enumerate() {
            if controls.cancelled() {
                return Err(RenderError::Cancelled);
            }
            let y = first_row + offset;
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.color_at(&Pixel(x, y));
            }
            tracker.row_done();
        }
        Ok(())
    }

    /// A multi-threaded version of the render function.  The canvas is
    /// cut into one band of rows per thread; each worker owns its band
    /// outright, so nothing is locked.
    fn render_threaded(&self, controls: &RenderControls) -> Result<Canvas, RenderError> {
        let mut canvas = self.blank();
        let columns = canvas.columns;
        let threads = self.settings.threads;
        let band_rows = (canvas.rows + threads - 1) / threads;
        let tracker = RowTracker::new(controls.progress, canvas.rows);

        let results = {
            let bands: Vec<&mut [Rgb<u8>]> = canvas.cells.chunks_mut(band_rows * columns).collect();
            let tracker = &tracker;
            crossbeam::scope(|spawner| {
                let handles: Vec<_> = bands
                    .into_iter()
                    .enumerate()
                    .map(|(i, band)| {
                        spawner.spawn(move |_| {
                            self.render_band(i * band_rows, band, columns, controls, tracker)
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or(Err(RenderError::Worker)))
                    .collect::<Vec<_>>()
            })
            .map_err(|_| RenderError::Worker)?
        };

        for result in results {
            result?;
        }
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::{Julia, Mandelbrot};
    use crate::progress::CancelFlag;
    use crate::sink::MemorySink;
    use std::sync::Mutex;

    fn mandelbrot(size: usize, settings: RenderSettings) -> FractalRenderer<Mandelbrot> {
        FractalRenderer::with_settings(
            ImageSize(size, size),
            PlaneWindow::new((-2.0, -2.0), (2.0, 2.0)),
            Mandelbrot::new(),
            settings,
        )
        .unwrap()
    }

    #[test]
    fn inclusive_canvas_covers_every_coordinate() {
        let mut r = mandelbrot(8, RenderSettings::default());
        let canvas = r.compute().unwrap();
        assert_eq!((canvas.columns(), canvas.rows()), (9, 9));
        assert_eq!(canvas.cells().len(), 81);
        assert!(canvas.get(&Pixel(8, 8)).is_some());
        assert!(canvas.get(&Pixel(9, 8)).is_none());
        let image = canvas.to_image();
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn half_open_canvas_matches_the_image() {
        let settings = RenderSettings {
            extent: Extent::HalfOpen,
            ..RenderSettings::default()
        };
        let mut r = mandelbrot(8, settings);
        let canvas = r.compute().unwrap();
        assert_eq!((canvas.columns(), canvas.rows()), (8, 8));
        assert_eq!(canvas.to_image().dimensions(), (8, 8));
    }

    #[test]
    fn pixels_get_the_colors_of_their_points() {
        // On a 4x4 view of (-2,-2)..(2,2), pixel (2, 2) is the origin and
        // pixel (0, 0) is (-2, 2), outside the circle.
        let mut r = mandelbrot(4, RenderSettings::default());
        let canvas = r.compute().unwrap();
        assert_eq!(canvas.get(&Pixel(2, 2)), Some(legacy_color(255)));
        assert_eq!(canvas.get(&Pixel(0, 0)), Some(legacy_color(1)));
    }

    #[test]
    fn capped_julia_pixels_are_white() {
        let mut r = FractalRenderer::new(
            ImageSize(2, 2),
            PlaneWindow::new((-1.0, -1.0), (1.0, 1.0)),
            Julia::with_constant(num::Complex::new(0.0, 0.0)),
        )
        .unwrap();
        let canvas = r.compute().unwrap();
        assert_eq!(canvas.get(&Pixel(1, 1)), Some(Rgb([255, 255, 255])));
    }

    #[test]
    fn compute_is_deterministic() {
        let mut r = mandelbrot(24, RenderSettings::default());
        let first = r.compute().unwrap().clone();
        let second = r.compute().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn threads_do_not_change_the_picture() {
        let single = mandelbrot(31, RenderSettings::default())
            .compute()
            .unwrap()
            .clone();
        for threads in 2..6 {
            let settings = RenderSettings {
                threads,
                ..RenderSettings::default()
            };
            let mut r = mandelbrot(31, settings);
            assert_eq!(r.compute().unwrap(), &single, "{} threads", threads);
        }
    }

    #[test]
    fn more_threads_than_rows() {
        let settings = RenderSettings {
            threads: 8,
            extent: Extent::HalfOpen,
            ..RenderSettings::default()
        };
        let mut r = mandelbrot(2, settings);
        assert_eq!(r.compute().unwrap().cells().len(), 4);
    }

    #[test]
    fn scale_blows_up_each_pixel() {
        let settings = RenderSettings {
            scale: 3,
            ..RenderSettings::default()
        };
        let mut r = mandelbrot(4, settings);
        let canvas = r.compute().unwrap();
        let image = canvas.to_image();
        assert_eq!(image.dimensions(), (12, 12));
        let origin = canvas.get(&Pixel(2, 2)).unwrap();
        for y in 6..9 {
            for x in 6..9 {
                assert_eq!(*image.get_pixel(x, y), origin);
            }
        }
    }

    #[test]
    fn bad_settings_are_rejected() {
        let size = ImageSize(4, 4);
        let window = PlaneWindow::new((-2.0, -2.0), (2.0, 2.0));
        let zero_threads = RenderSettings {
            threads: 0,
            ..RenderSettings::default()
        };
        let zero_scale = RenderSettings {
            scale: 0,
            ..RenderSettings::default()
        };
        assert_eq!(
            FractalRenderer::with_settings(size, window, Mandelbrot::new(), zero_threads).err(),
            Some(RenderError::InvalidThreadCount(0))
        );
        assert_eq!(
            FractalRenderer::with_settings(size, window, Mandelbrot::new(), zero_scale).err(),
            Some(RenderError::InvalidScale(0))
        );
        let flat = PlaneWindow::new((-2.0, 1.0), (2.0, 1.0));
        assert_eq!(
            FractalRenderer::new(size, flat, Mandelbrot::new()).err(),
            Some(RenderError::DegenerateWindow { axis: "imaginary" })
        );
    }

    #[test]
    fn save_before_compute_fails() {
        let r = mandelbrot(4, RenderSettings::default());
        let mut sink = MemorySink::default();
        assert_eq!(r.save(&mut sink, "early.png"), Err(RenderError::NotComputed));
        assert!(sink.images.is_empty());
    }

    #[test]
    fn save_can_be_repeated() {
        let mut r = mandelbrot(4, RenderSettings::default());
        r.compute().unwrap();
        let mut sink = MemorySink::default();
        r.save(&mut sink, "a.png").unwrap();
        r.save(&mut sink, "b.png").unwrap();
        assert_eq!(sink.images.len(), 2);
        assert_eq!(sink.images[0].1, sink.images[1].1);
    }

    #[test]
    fn cancelled_render_stores_nothing() {
        for threads in 1..3 {
            let settings = RenderSettings {
                threads,
                ..RenderSettings::default()
            };
            let mut r = mandelbrot(16, settings);
            let flag = CancelFlag::new();
            flag.cancel();
            let controls = RenderControls::default().with_cancel(flag);
            assert_eq!(r.compute_with(&controls).err(), Some(RenderError::Cancelled));
            assert!(r.canvas().is_none());
        }
    }

    #[test]
    fn progress_climbs_to_one_hundred() {
        for threads in 1..4 {
            let seen = Mutex::new(Vec::new());
            {
                let observer = |percent: u32| seen.lock().unwrap().push(percent);
                let controls = RenderControls::default().with_progress(&observer);
                let settings = RenderSettings {
                    threads,
                    ..RenderSettings::default()
                };
                mandelbrot(19, settings).compute_with(&controls).unwrap();
            }
            let seen = seen.into_inner().unwrap();
            assert_eq!(seen.last(), Some(&100));
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
