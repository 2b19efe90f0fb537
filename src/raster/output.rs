//! The output-raster interface (spec.md §6) and a reference `image`-backed
//! implementation, plus the color-space mediation between the program's
//! accumulation space and a raster's declared output space.

use image::{Rgba, RgbaImage};

use crate::math::vec4::Vec4;
use crate::render::color::{linear_p3_to_linear_srgb, linear_srgb_to_linear_p3, linear_to_srgb, srgb_to_linear};

/// A per-raster color-space tag (spec.md §6): 0 = sRGB, 1 = Display-P3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterColorSpace {
    Srgb,
    DisplayP3,
}

impl RasterColorSpace {
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            1 => RasterColorSpace::DisplayP3,
            _ => RasterColorSpace::Srgb,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            RasterColorSpace::Srgb => 0,
            RasterColorSpace::DisplayP3 => 1,
        }
    }
}

/// Accepts partial-pixel contributions, full-pixel writes, and
/// full-region writes, each in either the host's "client" color space or
/// the raster's declared "output" color space. Implementations must copy
/// the color argument rather than retain it (spec.md §6 contract).
pub trait OutputRaster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Accumulate a weighted partial-coverage contribution, `color` given
    /// in client space, at `(x, y)`.
    fn add_client_partial_pixel(&mut self, color: Vec4, weight: f32, x: u32, y: u32);

    /// Overwrite a fully-covered pixel, `color` in client space.
    fn add_client_full_pixel(&mut self, color: Vec4, x: u32, y: u32);

    /// Overwrite a fully-covered pixel, `color` already in output space.
    fn add_output_full_pixel(&mut self, color: Vec4, x: u32, y: u32);

    /// Overwrite a fully-covered rectangular region, `color` in client
    /// space.
    fn add_client_full_region(&mut self, color: Vec4, x: u32, y: u32, w: u32, h: u32) {
        for dy in 0..h {
            for dx in 0..w {
                self.add_client_full_pixel(color, x + dx, y + dy);
            }
        }
    }

    /// Overwrite a fully-covered rectangular region, `color` already in
    /// output space.
    fn add_output_full_region(&mut self, color: Vec4, x: u32, y: u32, w: u32, h: u32) {
        for dy in 0..h {
            for dx in 0..w {
                self.add_output_full_pixel(color, x + dx, y + dy);
            }
        }
    }
}

/// Mediates between the three color spaces a rasterization call touches:
/// the host's "client" space, the program's premultiplied-linear-sRGB
/// "accumulation" space, and the raster's declared "output" space.
/// Each method takes and returns a straight-alpha `Vec4`; callers must not
/// retain the returned value across the next call (it is shared scratch
/// storage in spirit, matching spec.md §6's contract, even though this
/// implementation returns by value for simplicity).
pub struct RasterColorConverter {
    pub client_space: RasterColorSpace,
    pub output_space: RasterColorSpace,
}

impl RasterColorConverter {
    pub fn new(client_space: RasterColorSpace, output_space: RasterColorSpace) -> Self {
        Self { client_space, output_space }
    }

    pub fn client_to_accumulation(&self, c: Vec4) -> Vec4 {
        to_linear_srgb(c, self.client_space)
    }

    pub fn client_to_output(&self, c: Vec4) -> Vec4 {
        self.accumulation_to_output(self.client_to_accumulation(c))
    }

    pub fn accumulation_to_output(&self, c: Vec4) -> Vec4 {
        from_linear_srgb(c, self.output_space)
    }
}

fn to_linear_srgb(c: Vec4, from: RasterColorSpace) -> Vec4 {
    match from {
        RasterColorSpace::Srgb => {
            let rgb = srgb_to_linear(c.rgb());
            Vec4::rgba(rgb[0], rgb[1], rgb[2], c.a())
        }
        RasterColorSpace::DisplayP3 => {
            // Display-P3 input is assumed already linear (a typical wide-gamut
            // client supplies linear samples); convert primaries only.
            let rgb = linear_p3_to_linear_srgb(c.rgb());
            Vec4::rgba(rgb[0], rgb[1], rgb[2], c.a())
        }
    }
}

fn from_linear_srgb(c: Vec4, to: RasterColorSpace) -> Vec4 {
    match to {
        RasterColorSpace::Srgb => {
            let rgb = linear_to_srgb(c.rgb());
            Vec4::rgba(rgb[0], rgb[1], rgb[2], c.a())
        }
        RasterColorSpace::DisplayP3 => {
            let rgb = linear_srgb_to_linear_p3(c.rgb());
            Vec4::rgba(rgb[0], rgb[1], rgb[2], c.a())
        }
    }
}

/// An `image`-backed `OutputRaster`: accumulates straight-alpha client
/// colors into an 8-bit `RgbaImage`, converting through
/// `RasterColorConverter` on write. This is the crate's reference sink —
/// enough to exercise the rasterizer end-to-end without a host supplying
/// its own raster target.
pub struct ImageRaster {
    image: RgbaImage,
    converter: RasterColorConverter,
}

impl ImageRaster {
    pub fn new(width: u32, height: u32, client_space: RasterColorSpace, output_space: RasterColorSpace) -> Self {
        Self { image: RgbaImage::new(width, height), converter: RasterColorConverter::new(client_space, output_space) }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn write(&mut self, color: Vec4, x: u32, y: u32) {
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let bytes = [
            (color.r().clamp(0.0, 1.0) * 255.0).round() as u8,
            (color.g().clamp(0.0, 1.0) * 255.0).round() as u8,
            (color.b().clamp(0.0, 1.0) * 255.0).round() as u8,
            (color.a().clamp(0.0, 1.0) * 255.0).round() as u8,
        ];
        self.image.put_pixel(x, y, Rgba(bytes));
    }
}

impl OutputRaster for ImageRaster {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn add_client_partial_pixel(&mut self, color: Vec4, weight: f32, x: u32, y: u32) {
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let output = self.converter.client_to_output(color) * weight.clamp(0.0, 1.0);
        let existing = self.image.get_pixel(x, y).0;
        let existing = Vec4::rgba(
            existing[0] as f32 / 255.0,
            existing[1] as f32 / 255.0,
            existing[2] as f32 / 255.0,
            existing[3] as f32 / 255.0,
        );
        let blended = output + existing * (1.0 - weight.clamp(0.0, 1.0));
        self.write(blended, x, y);
    }

    fn add_client_full_pixel(&mut self, color: Vec4, x: u32, y: u32) {
        let output = self.converter.client_to_output(color);
        self.write(output, x, y);
    }

    fn add_output_full_pixel(&mut self, color: Vec4, x: u32, y: u32) {
        self.write(color, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pixel_write_round_trips_through_srgb_conversion() {
        let mut raster = ImageRaster::new(1, 1, RasterColorSpace::Srgb, RasterColorSpace::Srgb);
        raster.add_client_full_pixel(Vec4::rgba(1.0, 0.0, 0.0, 1.0), 0, 0);
        let pixel = raster.image().get_pixel(0, 0).0;
        assert_eq!(pixel, [255, 0, 0, 255]);
    }

    #[test]
    fn out_of_bounds_write_is_ignored() {
        let mut raster = ImageRaster::new(2, 2, RasterColorSpace::Srgb, RasterColorSpace::Srgb);
        raster.add_client_full_pixel(Vec4::ONE, 5, 5);
    }

    #[test]
    fn identity_conversion_is_a_no_op() {
        let converter = RasterColorConverter::new(RasterColorSpace::Srgb, RasterColorSpace::Srgb);
        let c = Vec4::rgba(0.3, 0.6, 0.9, 1.0);
        let round = converter.accumulation_to_output(converter.client_to_accumulation(c));
        assert!((round.r() - c.r()).abs() < 1e-4);
        assert!((round.g() - c.g()).abs() < 1e-4);
        assert!((round.b() - c.b()).abs() < 1e-4);
    }
}
