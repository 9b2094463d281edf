//! Unit markers for boxes and sizes.

use crate::{common::*, CyCxHW, HW, TLBR};

/// A value measured in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Pixel<T>(pub T);

/// A value measured in fractions of the image size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ratio<T>(pub T);

pub type PixelCyCxHW<T> = Pixel<CyCxHW<T>>;
pub type PixelTLBR<T> = Pixel<TLBR<T>>;
pub type PixelSize<T> = Pixel<HW<T>>;
pub type RatioCyCxHW<T> = Ratio<CyCxHW<T>>;

impl<T> Deref for Pixel<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> Deref for Ratio<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> PixelCyCxHW<T>
where
    T: Float,
{
    /// Normalize by the image size. Horizontal components are divided by the
    /// width and vertical components by the height.
    pub fn to_ratio(&self, size: &PixelSize<T>) -> Result<RatioCyCxHW<T>> {
        let [img_h, img_w] = size.hw();
        let zero = T::zero();
        ensure!(
            img_h > zero && img_w > zero,
            "image height and width must be positive"
        );

        let CyCxHW { cy, cx, h, w } = self.0;
        Ok(Ratio(CyCxHW {
            cy: cy / img_h,
            cx: cx / img_w,
            h: h / img_h,
            w: w / img_w,
        }))
    }
}

impl<T> RatioCyCxHW<T>
where
    T: Float,
{
    /// Scale back to pixel units of an image with the given size.
    pub fn to_pixel(&self, size: &PixelSize<T>) -> PixelCyCxHW<T> {
        let [img_h, img_w] = size.hw();
        let CyCxHW { cy, cx, h, w } = self.0;
        Pixel(CyCxHW {
            cy: cy * img_h,
            cx: cx * img_w,
            h: h * img_h,
            w: w * img_w,
        })
    }

    /// Check that every component lies in `[0, 1]`.
    pub fn is_within_unit(&self) -> bool {
        let zero = T::zero();
        let one = T::one();
        self.0
            .xywh()
            .iter()
            .all(|&value| value >= zero && value <= one)
    }
}

impl<T> RatioCyCxHW<T>
where
    T: Float,
{
    /// Recover the corner-form box in pixels.
    pub fn to_pixel_tlbr(&self, size: &PixelSize<T>) -> PixelTLBR<T> {
        let Pixel(cycxhw) = self.to_pixel(size);
        Pixel((&cycxhw).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rect, RectNum};
    use approx::assert_abs_diff_eq;

    fn size(h: f64, w: f64) -> PixelSize<f64> {
        Pixel(HW::try_from_hw([h, w]).unwrap())
    }

    #[test]
    fn normalize_by_image_size() {
        let pixel = Pixel(CyCxHW::try_from_cycxhw([70.0, 30.0, 100.0, 40.0]).unwrap());
        let ratio = pixel.to_ratio(&size(200.0, 100.0)).unwrap();
        let [x, y, w, h] = ratio.xywh();
        assert_abs_diff_eq!(x, 0.3);
        assert_abs_diff_eq!(y, 0.35);
        assert_abs_diff_eq!(w, 0.4);
        assert_abs_diff_eq!(h, 0.5);
        assert!(ratio.is_within_unit());
    }

    #[test]
    fn reject_empty_image() {
        let pixel = Pixel(CyCxHW::try_from_cycxhw([1.0, 1.0, 1.0, 1.0]).unwrap());
        assert!(pixel.to_ratio(&size(0.0, 10.0)).is_err());
    }

    #[test]
    fn corners_survive_round_trip() {
        let img_size = size(375.0, 500.0);
        for tlbr in [[20, 10, 120, 50], [0, 0, 375, 500], [33, 47, 281, 399], [5, 9, 6, 12]] {
            let pixel = CyCxHW::try_from_tlbr(tlbr).unwrap();
            let pixel = Pixel(pixel.try_cast::<f64>().unwrap());
            let Pixel(recovered) = pixel.to_ratio(&img_size).unwrap().to_pixel_tlbr(&img_size);

            recovered
                .tlbr()
                .iter()
                .zip(tlbr)
                .for_each(|(&actual, expect)| {
                    assert!((actual - expect as f64).abs() <= 1.0);
                });
            assert!(recovered.h() >= 0.0 && recovered.w() >= 0.0);
        }
    }
}
