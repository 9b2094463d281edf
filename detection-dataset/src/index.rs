//! Aligned listings of image and annotation files.

use crate::common::*;

/// Two parallel file lists sorted by file name.
///
/// The i-th image pairs with the i-th annotation. [DatasetIndex::new] takes
/// the pairing on trust; [DatasetIndex::new_checked] verifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIndex {
    image_files: Vec<PathBuf>,
    annotation_files: Vec<PathBuf>,
}

impl DatasetIndex {
    /// List both directories without checking that the files correspond.
    pub fn new(
        images_dir: impl AsRef<Path>,
        annotations_dir: impl AsRef<Path>,
    ) -> DatasetResult<Self> {
        let image_files = list_dir_sorted(images_dir.as_ref())?;
        let annotation_files = list_dir_sorted(annotations_dir.as_ref())?;

        if image_files.len() != annotation_files.len() {
            warn!(
                "found {} images but {} annotations in '{}' and '{}'",
                image_files.len(),
                annotation_files.len(),
                images_dir.as_ref().display(),
                annotations_dir.as_ref().display()
            );
        }
        debug!("indexed {} images", image_files.len());

        Ok(Self {
            image_files,
            annotation_files,
        })
    }

    /// List both directories and require equal counts and equal file stems
    /// at every position.
    pub fn new_checked(
        images_dir: impl AsRef<Path>,
        annotations_dir: impl AsRef<Path>,
    ) -> DatasetResult<Self> {
        let index = Self::new(images_dir, annotations_dir)?;
        index.check_pairing()?;
        Ok(index)
    }

    pub fn check_pairing(&self) -> DatasetResult<()> {
        let Self {
            image_files,
            annotation_files,
        } = self;

        if image_files.len() != annotation_files.len() {
            return Err(DatasetError::Pairing {
                reason: format!(
                    "{} images versus {} annotations",
                    image_files.len(),
                    annotation_files.len()
                ),
            });
        }

        let mismatch = izip!(image_files, annotation_files)
            .enumerate()
            .find(|(_, (image_file, annotation_file))| {
                image_file.file_stem() != annotation_file.file_stem()
            });

        match mismatch {
            Some((index, (image_file, annotation_file))) => Err(DatasetError::Pairing {
                reason: format!(
                    "'{}' does not match '{}' at index {}",
                    image_file.display(),
                    annotation_file.display(),
                    index
                ),
            }),
            None => Ok(()),
        }
    }

    /// The number of indexed images.
    pub fn len(&self) -> usize {
        self.image_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_files.is_empty()
    }

    pub fn num_annotations(&self) -> usize {
        self.annotation_files.len()
    }

    pub fn image_file(&self, index: usize) -> Option<&Path> {
        self.image_files.get(index).map(AsRef::as_ref)
    }

    pub fn annotation_file(&self, index: usize) -> Option<&Path> {
        self.annotation_files.get(index).map(AsRef::as_ref)
    }

    pub fn image_files(&self) -> &[PathBuf] {
        &self.image_files
    }

    pub fn annotation_files(&self) -> &[PathBuf] {
        &self.annotation_files
    }
}

/// List every entry of a directory sorted by file name and joined onto the
/// directory path.
fn list_dir_sorted(dir: &Path) -> DatasetResult<Vec<PathBuf>> {
    let read_dir_err = |source| DatasetError::ReadDir {
        path: dir.to_owned(),
        source,
    };

    let mut file_names: Vec<_> = fs::read_dir(dir)
        .map_err(read_dir_err)?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<Result<_, _>>()
        .map_err(read_dir_err)?;
    file_names.sort();

    let paths = file_names
        .into_iter()
        .map(|file_name| dir.join(file_name))
        .collect();
    Ok(paths)
}
