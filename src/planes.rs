//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window on the complex plane given by a minimum and a maximum
//! corner.
//!
//! The y-axis is flipped: pixel row 0 maps to the *maximum* imaginary
//! value and rows walk downward from there, so images come out the way
//! up a mathematician expects.
use itertools::iproduct;
use num::Complex;

use crate::error::RenderError;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0.  Both must be positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageSize(pub usize, pub usize);

impl ImageSize {
    /// Width in pixels
    pub fn width(&self) -> usize {
        self.0
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.1
    }
}

/// Describes the minimum corner and the maximum corner of the complex
/// plane, treating the real part of each value as the x-component and
/// the imaginary part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneWindow(pub Complex<f64>, pub Complex<f64>);

impl PlaneWindow {
    /// Build a window from its two corners given as (x, y) pairs.
    pub fn new(min: (f64, f64), max: (f64, f64)) -> PlaneWindow {
        PlaneWindow(Complex::new(min.0, min.1), Complex::new(max.0, max.1))
    }

    /// Scale both corners about the origin and then shift them by
    /// `-delta` on both axes.
    pub fn zoomed(&self, factor: f64, delta: f64) -> PlaneWindow {
        let shift = Complex::new(delta, delta);
        PlaneWindow(self.0 * factor - shift, self.1 * factor - shift)
    }
}

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel(pub usize, pub usize);

/// Which pixel coordinates a render visits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Extent {
    /// `0..=width` by `0..=height`: one extra row and column beyond the
    /// image size.  The extra cells are computed and later clipped.
    Inclusive,
    /// `0..width` by `0..height`.
    HalfOpen,
}

impl Default for Extent {
    fn default() -> Self {
        Extent::Inclusive
    }
}

/// Contains the definitions of two planes: an integral cartesian
/// plane, and a window on the complex plane.  Maps pixels from the
/// first onto points of the second.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub image_size: ImageSize,
    /// The two corners of the complex window.
    pub window: PlaneWindow,
    // Distance on the complex plane covered by one pixel step, per axis.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Rejects an empty image, a window that is not
    /// finite, and a window with zero span on either axis.
    pub fn new(image_size: ImageSize, window: PlaneWindow) -> Result<PlaneMapper, RenderError> {
        if image_size.0 == 0 || image_size.1 == 0 {
            return Err(RenderError::EmptyImage {
                width: image_size.0,
                height: image_size.1,
            });
        }

        let PlaneWindow(min, max) = window;
        if !(min.re.is_finite() && min.im.is_finite() && max.re.is_finite() && max.im.is_finite())
        {
            return Err(RenderError::NonFiniteWindow);
        }
        if min.re == max.re {
            return Err(RenderError::DegenerateWindow { axis: "real" });
        }
        if min.im == max.im {
            return Err(RenderError::DegenerateWindow { axis: "imaginary" });
        }

        let steps = (
            (max.re - min.re) / (image_size.0 as f64),
            (min.im - max.im) / (image_size.1 as f64),
        );
        if !(steps.0.is_finite() && steps.1.is_finite()) {
            return Err(RenderError::NonFiniteWindow);
        }

        Ok(PlaneMapper {
            image_size,
            window,
            steps,
        })
    }

    /// Given a pixel on the integral cartesian plane, return the point
    /// on the complex plane it stands for.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.window.0.re + (pixel.0 as f64) * self.steps.0,
            self.window.1.im + (pixel.1 as f64) * self.steps.1,
        )
    }

    /// The number of columns and rows a render over `extent` visits.
    pub fn grid(&self, extent: Extent) -> (usize, usize) {
        match extent {
            Extent::Inclusive => (self.image_size.0 + 1, self.image_size.1 + 1),
            Extent::HalfOpen => (self.image_size.0, self.image_size.1),
        }
    }

    /// Every pixel visited over `extent`, row by row.
    pub fn pixels(&self, extent: Extent) -> impl Iterator<Item = Pixel> {
        let (columns, rows) = self.grid(extent);
        iproduct!(0..rows, 0..columns).map(|(row, column)| Pixel(column, row))
    }
}
