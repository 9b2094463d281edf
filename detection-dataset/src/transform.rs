//! Image transforms applied by [DetectionDataset](crate::DetectionDataset).
//!
//! A transform is any `Fn(DynamicImage) -> T`. The functions here build the
//! common ones.

use crate::common::*;

/// A shared, type-erased image transform.
pub type ImageTransform<T> = Arc<dyn Fn(DynamicImage) -> T + Send + Sync>;

/// Resize the image to exactly `height` × `width` pixels.
pub fn resize(
    height: NonZeroU32,
    width: NonZeroU32,
) -> impl Fn(DynamicImage) -> DynamicImage + Send + Sync + Clone {
    let height = height.get();
    let width = width.get();
    move |image: DynamicImage| image.resize_exact(width, height, FilterType::Triangle)
}

/// Convert the image to a CHW `f32` RGB tensor scaled to `[0, 1]`.
pub fn to_tensor() -> impl Fn(DynamicImage) -> Array3<f32> + Send + Sync + Clone {
    |image: DynamicImage| image_to_tensor(&image)
}

/// Chain two transforms.
pub fn compose<A, B, C, F, G>(first: F, second: G) -> impl Fn(A) -> C + Send + Sync + Clone
where
    F: Fn(A) -> B + Send + Sync + Clone,
    G: Fn(B) -> C + Send + Sync + Clone,
{
    move |input: A| second(first(input))
}

pub fn image_to_tensor(image: &DynamicImage) -> Array3<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    Array3::from_shape_fn(
        (3, height as usize, width as usize),
        |(channel, row, col)| {
            let pixel = rgb.get_pixel(col as u32, row as u32);
            pixel[channel] as f32 / 255.0
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_image() -> DynamicImage {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(3, 1, Rgb([255, 0, 51]));
        DynamicImage::ImageRgb8(image)
    }

    #[test]
    fn tensor_is_chw_and_scaled() {
        let tensor = to_tensor()(sample_image());
        assert_eq!(tensor.shape(), &[3, 2, 4]);
        assert_abs_diff_eq!(tensor[[0, 1, 3]], 1.0);
        assert_abs_diff_eq!(tensor[[1, 1, 3]], 0.0);
        assert_abs_diff_eq!(tensor[[2, 1, 3]], 0.2);
        assert_abs_diff_eq!(tensor[[0, 0, 0]], 0.0);
    }

    #[test]
    fn resize_then_tensor() {
        let size = NonZeroU32::new(8).unwrap();
        let transform = compose(resize(size, NonZeroU32::new(6).unwrap()), to_tensor());
        let tensor = transform(sample_image());
        assert_eq!(tensor.shape(), &[3, 8, 6]);
    }
}
