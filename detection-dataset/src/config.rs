//! Dataset configuration format.

use crate::common::*;

/// Dataset options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The directory of image files.
    pub images_dir: PathBuf,
    /// The directory of XML annotation files.
    pub annotations_dir: PathBuf,
    /// If set, require image and annotation file stems to match.
    #[serde(default)]
    pub check_pairing: bool,
    /// If set, resize images to this square size.
    #[serde(default)]
    pub image_size: Option<NonZeroU32>,
}

impl DatasetConfig {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config = json5::from_str(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Resolve relative directories against `base_dir`.
    pub fn relative_to(self, base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            images_dir: base_dir.join(self.images_dir),
            annotations_dir: base_dir.join(self.annotations_dir),
            ..self
        }
    }
}
