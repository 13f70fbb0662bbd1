// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape functions.  Each one takes a point on the complex plane,
//! iterates a quadratic-style recurrence starting *at* that point, and
//! reports how quickly the orbit leaves the circle of radius two
//! around the origin.
//!
//! Counting starts at 1, before the first step, and goes up by one per
//! step.  A point already outside the circle therefore escapes with a
//! count of 1.  Once the count passes the iteration cap the point is
//! considered bounded, and the result is `Escape::Capped`.

use num::Complex;

/// The default iteration cap.
pub const ITERATION_CAP: u32 = 1000;

/// The default Julia constant.
pub const JULIA_CONSTANT: Complex<f64> = Complex { re: 0.28, im: 0.008 };

/// How an orbit ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Escape {
    /// The orbit left the circle; the count it reached.
    Escaped(u32),
    /// The orbit was still inside the circle when the cap ran out.
    Capped,
}

/// The capability shared by every fractal this crate renders.
pub trait EscapeFunction: Sync {
    /// A short name, used in logs and frame names.
    fn name(&self) -> &str;

    /// Iterate the recurrence from `point` and report the outcome.
    fn escape(&self, point: Complex<f64>) -> Escape;

    /// The count written in place of `Escape::Capped` when the result
    /// is handed to the palette.
    fn sentinel(&self) -> u32;

    /// Flatten an escape result into the single number the palette
    /// understands.
    fn legacy_count(&self, escape: Escape) -> u32 {
        match escape {
            Escape::Escaped(count) => count,
            Escape::Capped => self.sentinel(),
        }
    }
}

#[inline]
fn iterate<F>(start: Complex<f64>, limit: u32, step: F) -> Escape
where
    F: Fn(Complex<f64>) -> Complex<f64>,
{
    let mut z = start;
    let mut count = 1;
    // A NaN magnitude compares false and ends the loop.
    while z.norm_sqr() <= 4.0 {
        z = step(z);
        count += 1;
        if count > limit {
            return Escape::Capped;
        }
    }
    Escape::Escaped(count)
}

/// z -> z² + c, where both z₀ and c are the point being tested.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mandelbrot {
    limit: u32,
}

impl Mandelbrot {
    /// A Mandelbrot with the default iteration cap.
    pub fn new() -> Self {
        Mandelbrot {
            limit: ITERATION_CAP,
        }
    }

    /// A Mandelbrot with a different iteration cap.
    pub fn with_limit(limit: u32) -> Self {
        Mandelbrot { limit }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Mandelbrot::new()
    }
}

impl EscapeFunction for Mandelbrot {
    fn name(&self) -> &str {
        "mandelbrot"
    }

    fn escape(&self, point: Complex<f64>) -> Escape {
        iterate(point, self.limit, |z| z * z + point)
    }

    fn sentinel(&self) -> u32 {
        255
    }
}

/// A Julia variant with a sine folded into the real part:
/// (re, im) -> (sin(re² - im² + cx), 2·re·im + cy).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Julia {
    constant: Complex<f64>,
    limit: u32,
}

impl Julia {
    /// The Julia set for the default constant and iteration cap.
    pub fn new() -> Self {
        Julia {
            constant: JULIA_CONSTANT,
            limit: ITERATION_CAP,
        }
    }

    /// A Julia set for another constant.
    pub fn with_constant(constant: Complex<f64>) -> Self {
        Julia {
            constant,
            limit: ITERATION_CAP,
        }
    }

    /// Change the iteration cap.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// The constant added at every step.
    pub fn constant(&self) -> Complex<f64> {
        self.constant
    }
}

impl Default for Julia {
    fn default() -> Self {
        Julia::new()
    }
}

impl EscapeFunction for Julia {
    fn name(&self) -> &str {
        "julia"
    }

    fn escape(&self, point: Complex<f64>) -> Escape {
        let c = self.constant;
        iterate(point, self.limit, |z| {
            Complex::new(
                (z.re * z.re - z.im * z.im + c.re).sin(),
                2.0 * z.re * z.im + c.im,
            )
        })
    }

    fn sentinel(&self) -> u32 {
        200
    }
}
