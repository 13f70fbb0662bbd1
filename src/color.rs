//! Turns an iteration count into a pixel.

use image::Rgb;

/// The count that is always painted white.  It is the Julia sentinel,
/// so capped Julia pixels stand out from everything else.
pub const WHITE_COUNT: u32 = 200;

/// Banded palette: red cycles every 32 counts, green every 16, and
/// blue every 8.
#[inline]
pub fn legacy_color(count: u32) -> Rgb<u8> {
    if count == WHITE_COUNT {
        return Rgb([255, 255, 255]);
    }
    Rgb([
        ((count % 32) * 8) as u8,
        ((count % 16) * 16) as u8,
        ((count % 8) * 32) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_the_count() {
        assert_eq!(legacy_color(17), Rgb([136, 16, 32]));
        // (255 % 32) * 8 = 248
        assert_eq!(legacy_color(255), Rgb([248, 240, 224]));
        assert_eq!(legacy_color(1), Rgb([8, 16, 32]));
        assert_eq!(legacy_color(0), Rgb([0, 0, 0]));
        assert_eq!(legacy_color(32), Rgb([0, 0, 0]));
    }

    #[test]
    fn two_hundred_is_white() {
        assert_eq!(legacy_color(200), Rgb([255, 255, 255]));
        // (199 % 32) * 8 = 56, (199 % 16) * 16 = 112, (199 % 8) * 32 = 224
        assert_eq!(legacy_color(199), Rgb([56, 112, 224]));
    }

    #[test]
    fn channels_never_overflow() {
        for count in 0..2048 {
            let Rgb([r, g, b]) = legacy_color(count);
            if count != WHITE_COUNT {
                assert_eq!(u32::from(r), (count % 32) * 8);
                assert_eq!(u32::from(g), (count % 16) * 16);
                assert_eq!(u32::from(b), (count % 8) * 32);
            }
        }
    }
}
