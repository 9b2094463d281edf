//! Box overlays for visual inspection.

use crate::common::*;

const DASH_LEN: u32 = 6;
const STROKE: u32 = 2;
const GROUND_TRUTH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const PREDICTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// The stroke pattern of a rectangle outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl LineStyle {
    fn is_drawn(&self, offset: u32) -> bool {
        match self {
            Self::Solid => true,
            Self::Dashed => (offset / DASH_LEN) % 2 == 0,
        }
    }
}

/// Recover the corner-form pixel box of a normalized box on an image of
/// `width` × `height` pixels.
pub fn corner_box(
    bbox: &RatioCyCxHW<f64>,
    width: u32,
    height: u32,
) -> anyhow::Result<PixelTLBR<f64>> {
    let size = Pixel(HW::try_from_hw([height as f64, width as f64])?);
    Ok(bbox.to_pixel_tlbr(&size))
}

/// Draw a rectangle outline in place. Parts outside the image are clipped,
/// and a rectangle that misses the image entirely is not drawn.
pub fn draw_rect(
    image: &mut RgbImage,
    tlbr: &PixelTLBR<f64>,
    stroke: u32,
    color: Rgb<u8>,
    style: LineStyle,
) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || stroke == 0 {
        return;
    }

    let [t, l, b, r] = tlbr.tlbr().map(f64::round);
    let max_y = (height - 1) as f64;
    let max_x = (width - 1) as f64;
    if b < 0.0 || r < 0.0 || t > max_y || l > max_x {
        return;
    }

    let clip = |value: f64, upper: f64| value.max(0.0).min(upper) as u32;
    let t = clip(t, max_y);
    let b = clip(b, max_y);
    let l = clip(l, max_x);
    let r = clip(r, max_x);

    for x in l..=r {
        if !style.is_drawn(x - l) {
            continue;
        }
        for offset in 0..stroke.min(b - t + 1) {
            image.put_pixel(x, t + offset, color);
            image.put_pixel(x, b - offset, color);
        }
    }

    for y in t..=b {
        if !style.is_drawn(y - t) {
            continue;
        }
        for offset in 0..stroke.min(r - l + 1) {
            image.put_pixel(l + offset, y, color);
            image.put_pixel(r - offset, y, color);
        }
    }
}

/// Render an RGB copy of `image` with the ground truth box drawn solid and
/// the optional prediction drawn dashed.
pub fn render_boxes(
    image: &DynamicImage,
    ground_truth: &RatioCyCxHW<f64>,
    prediction: Option<&RatioCyCxHW<f64>>,
) -> anyhow::Result<RgbImage> {
    let mut canvas = image.to_rgb8();
    let (width, height) = canvas.dimensions();

    let tlbr = corner_box(ground_truth, width, height)?;
    draw_rect(&mut canvas, &tlbr, STROKE, GROUND_TRUTH_COLOR, LineStyle::Solid);

    if let Some(prediction) = prediction {
        let tlbr = corner_box(prediction, width, height)?;
        draw_rect(&mut canvas, &tlbr, STROKE, PREDICTION_COLOR, LineStyle::Dashed);
    }

    Ok(canvas)
}
