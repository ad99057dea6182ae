use foundation::bounds::PixelRect;
use foundation::geo::SurfaceSize;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use layers::symbology::Rgba as Color;

/// Straight-alpha source-over of `src` (alpha already scaled by `src_alpha`)
/// onto `dst`.
pub fn blend_over(dst: &mut Rgba<u8>, src: [u8; 3], src_alpha: f32) {
    let sa = src_alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = f32::from(src[c]);
        let d = f32::from(dst.0[c]);
        out[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

/// An RGBA drawable the size of the map viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    /// Whether every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Blends `color` over every pixel whose centre lies inside `rect`.
    /// Parts of `rect` outside the surface are ignored.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        let (w, h) = (self.image.width(), self.image.height());
        let Some((x0, x1)) = covered_span(rect.min.x, rect.max.x, w) else {
            return;
        };
        let Some((y0, y1)) = covered_span(rect.min.y, rect.max.y, h) else {
            return;
        };
        let rgb = [color.r, color.g, color.b];
        for y in y0..y1 {
            for x in x0..x1 {
                blend_over(self.image.get_pixel_mut(x, y), rgb, color.a);
            }
        }
    }

    /// Replaces the surface content with `src` stretched to fit.
    pub fn draw_image(&mut self, src: &RgbaImage) {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || src.width() == 0 || src.height() == 0 {
            return;
        }
        if src.dimensions() == (w, h) {
            self.image.clone_from(src);
        } else {
            self.image = imageops::resize(src, w, h, FilterType::Triangle);
        }
    }
}

/// Half-open pixel index range whose centres fall in `[min, max]`.
fn covered_span(min: f64, max: f64, len: u32) -> Option<(u32, u32)> {
    if !(min.is_finite() && max.is_finite()) || max <= min {
        return None;
    }
    let start = (min - 0.5).ceil().max(0.0);
    let end = (max - 0.5).floor() + 1.0;
    let end = end.min(f64::from(len));
    if end <= start {
        return None;
    }
    Some((start as u32, end as u32))
}
