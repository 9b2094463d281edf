//! The indexable detection dataset.

use crate::{
    annotation::Annotation,
    common::*,
    config::DatasetConfig,
    index::DatasetIndex,
    transform::{self, ImageTransform},
};

/// The dataset that can be random accessed.
pub trait RandomAccessDataset {
    type Item;

    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth record in the dataset.
    fn nth(&self, index: usize) -> DatasetResult<Self::Item>;
}

/// An image with the normalized box of its first annotated object.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<T> {
    pub image: T,
    pub bbox: RatioCyCxHW<f64>,
}

impl<T> Example<T> {
    /// The box as (x_center, y_center, width, height).
    pub fn xywh(&self) -> [f64; 4] {
        self.bbox.xywh()
    }
}

/// Image and annotation directories exposed as a sequence of examples.
///
/// Every access decodes the image and parses the annotation again.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""))]
pub struct DetectionDataset<T = DynamicImage> {
    index: DatasetIndex,
    #[derivative(Debug = "ignore")]
    transform: ImageTransform<T>,
}

impl DetectionDataset<DynamicImage> {
    /// Index both directories without checking file pairing.
    pub fn open(
        images_dir: impl AsRef<Path>,
        annotations_dir: impl AsRef<Path>,
    ) -> DatasetResult<Self> {
        let index = DatasetIndex::new(images_dir, annotations_dir)?;
        Ok(Self::from_index(index))
    }

    pub fn from_index(index: DatasetIndex) -> Self {
        Self {
            index,
            transform: Arc::new(|image: DynamicImage| image),
        }
    }

    pub fn from_config(config: &DatasetConfig) -> DatasetResult<Self> {
        let DatasetConfig {
            ref images_dir,
            ref annotations_dir,
            check_pairing,
            image_size,
        } = *config;

        let index = if check_pairing {
            DatasetIndex::new_checked(images_dir, annotations_dir)?
        } else {
            DatasetIndex::new(images_dir, annotations_dir)?
        };
        let dataset = Self::from_index(index);

        let dataset = match image_size {
            Some(size) => dataset.with_transform(transform::resize(size, size)),
            None => dataset,
        };
        Ok(dataset)
    }
}

impl<T> DetectionDataset<T>
where
    T: 'static,
{
    /// Apply `transform` to the image after the current transform.
    pub fn with_transform<U, F>(self, transform: F) -> DetectionDataset<U>
    where
        U: 'static,
        F: 'static + Fn(T) -> U + Send + Sync,
    {
        let Self {
            index,
            transform: prev,
        } = self;

        DetectionDataset {
            index,
            transform: Arc::new(move |image: DynamicImage| transform(prev(image))),
        }
    }
}

impl<T> DetectionDataset<T> {
    /// The number of images.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    /// Load the example at `index`.
    pub fn get(&self, index: usize) -> DatasetResult<Example<T>> {
        let (image_file, annotation_file) = self.paths(index)?;

        let image = decode_image(image_file)?;
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return Err(DatasetError::EmptyImage {
                path: image_file.to_owned(),
            });
        }

        let bbox = Annotation::open(annotation_file)?
            .first_box()
            .and_then(|tlbr| normalize_box(&tlbr, img_h, img_w))
            .map_err(|err| DatasetError::parse(annotation_file, format!("{:#}", err)))?;

        let image = (self.transform)(image);
        Ok(Example { image, bbox })
    }

    /// Parse the full annotation at `index`, including every object.
    pub fn annotation(&self, index: usize) -> DatasetResult<Annotation> {
        let (_, annotation_file) = self.paths(index)?;
        Annotation::open(annotation_file)
    }

    /// Load the examples in order.
    pub fn iter(&self) -> impl Iterator<Item = DatasetResult<Example<T>>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    fn paths(&self, index: usize) -> DatasetResult<(&Path, &Path)> {
        let image_file = self
            .index
            .image_file(index)
            .ok_or_else(|| DatasetError::IndexOutOfBounds {
                index,
                len: self.len(),
            })?;
        let annotation_file =
            self.index
                .annotation_file(index)
                .ok_or_else(|| DatasetError::MissingAnnotation {
                    index,
                    num_annotations: self.index.num_annotations(),
                })?;
        Ok((image_file, annotation_file))
    }
}

impl<T> RandomAccessDataset for DetectionDataset<T> {
    type Item = Example<T>;

    fn num_records(&self) -> usize {
        self.len()
    }

    fn nth(&self, index: usize) -> DatasetResult<Self::Item> {
        self.get(index)
    }
}

/// Decode an image, detecting the format from the file content first and
/// the extension second.
fn decode_image(path: &Path) -> DatasetResult<DynamicImage> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| DatasetError::Decode {
            path: path.to_owned(),
            source,
        })
}

/// Convert a corner-form pixel box to center form normalized by the image
/// size.
///
/// The center is computed in integer pixels, so it is truncated before the
/// division.
pub fn normalize_box(
    tlbr: &PixelTLBR<i64>,
    img_h: u32,
    img_w: u32,
) -> anyhow::Result<RatioCyCxHW<f64>> {
    let [t, l, b, r] = tlbr.tlbr();
    ensure!(
        b.checked_sub(t).is_some() && r.checked_sub(l).is_some(),
        "box size overflows"
    );
    let cycxhw: CyCxHW<i64> = (&**tlbr).into();
    let cycxhw = cycxhw
        .try_cast::<f64>()
        .ok_or_else(|| format_err!("box coordinates are not representable"))?;
    let size = HW::try_from_hw([img_h as f64, img_w as f64])?;
    Pixel(cycxhw).to_ratio(&Pixel(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_reference_box() {
        let tlbr = Pixel(TLBR::try_from_tlbr([20, 10, 120, 50]).unwrap());
        let bbox = normalize_box(&tlbr, 200, 100).unwrap();
        let [x, y, w, h] = bbox.xywh();
        assert_abs_diff_eq!(x, 0.3);
        assert_abs_diff_eq!(y, 0.35);
        assert_abs_diff_eq!(w, 0.4);
        assert_abs_diff_eq!(h, 0.5);
    }

    #[test]
    fn normalize_truncates_center() {
        // w = 5, so the center sits at 2 + 2 rather than 2 + 2.5
        let tlbr = Pixel(TLBR::try_from_tlbr([0, 2, 3, 7]).unwrap());
        let bbox = normalize_box(&tlbr, 10, 10).unwrap();
        let [x, y, w, h] = bbox.xywh();
        assert_abs_diff_eq!(x, 0.4);
        assert_abs_diff_eq!(y, 0.1);
        assert_abs_diff_eq!(w, 0.5);
        assert_abs_diff_eq!(h, 0.3);
    }

    #[test]
    fn normalize_rejects_overflowing_box() {
        let tlbr = Pixel(TLBR::try_from_tlbr([0, i64::MIN, 10, i64::MAX]).unwrap());
        assert!(normalize_box(&tlbr, 10, 10).is_err());
    }

    #[test]
    fn dataset_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DetectionDataset>();
        assert_send_sync::<DetectionDataset<Array3<f32>>>();
    }
}
