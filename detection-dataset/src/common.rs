pub use crate::error::{DatasetError, DatasetResult};
pub use anyhow::{ensure, format_err, Context as _};
pub use bbox::{
    prelude::*, CyCxHW, Pixel, PixelTLBR, Ratio, RatioCyCxHW, HW, TLBR,
};
pub use derivative::Derivative;
pub use image::{
    imageops::FilterType, io::Reader as ImageReader, DynamicImage, GenericImageView as _,
    ImageError, Rgb, RgbImage,
};
pub use itertools::izip;
pub use log::{debug, warn};
pub use ndarray::Array3;
pub use serde::{Deserialize, Serialize};
pub use std::{
    fs,
    num::NonZeroU32,
    path::{Path, PathBuf},
    sync::Arc,
};
