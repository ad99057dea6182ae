use image::imageops;
use image::{Rgba, Rgba32FImage, RgbaImage};
use layers::symbology::LayerStyle;

use crate::surface::blend_over;

/// Applies a layer's presentation (surface-wide blur, then opacity) to
/// `overlay` and blends the result over `base`.
///
/// The blur runs on premultiplied colour so transparent neighbours only fade
/// a fill, never darken it. Surfaces of different sizes are composed over the
/// base's extent; overlay pixels outside it are dropped.
pub fn present(base: &RgbaImage, overlay: &RgbaImage, style: LayerStyle) -> RgbaImage {
    let mut out = base.clone();
    if !style.visible || overlay.width() == 0 || overlay.height() == 0 {
        return out;
    }

    let mut layer = premultiply(overlay);
    if style.blur_sigma > 0.0 {
        layer = imageops::blur(&layer, style.blur_sigma);
    }

    let opacity = style.opacity.clamp(0.0, 1.0);
    let (w, h) = (out.width().min(layer.width()), out.height().min(layer.height()));
    for y in 0..h {
        for x in 0..w {
            let Some((rgb, a)) = unpremultiply(layer.get_pixel(x, y)) else {
                continue;
            };
            blend_over(out.get_pixel_mut(x, y), rgb, a * opacity);
        }
    }
    out
}

fn premultiply(image: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = f32::from(a) / 255.0;
        Rgba([
            f32::from(r) / 255.0 * a,
            f32::from(g) / 255.0 * a,
            f32::from(b) / 255.0 * a,
            a,
        ])
    })
}

/// Straight 8-bit colour and alpha of a premultiplied pixel; `None` when
/// fully transparent.
fn unpremultiply(p: &Rgba<f32>) -> Option<([u8; 3], f32)> {
    let [r, g, b, a] = p.0;
    if a <= f32::EPSILON {
        return None;
    }
    let channel = |c: f32| (c / a * 255.0).round().clamp(0.0, 255.0) as u8;
    Some(([channel(r), channel(g), channel(b)], a.min(1.0)))
}
