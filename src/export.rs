//! Writing orientation slots to disk.
//!
//! Every slot is written as two numbered series, `img_<Label>_<n>` for the
//! reference images and `seg_<Label>_<n>` for the registered segmentations.
//! The viewer pairs them by label and number.

use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::orientation::{classify_volume, OrientationLabel, OrientationSlot};
use crate::volume::{Volume, VolumeError};

pub const IMAGE_TOKEN: &str = "img";
pub const SEGMENTATION_TOKEN: &str = "seg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Nii,
    NiiGz,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Nii => "nii",
            OutputFormat::NiiGz => "nii.gz",
        }
    }
}

/// `<token>_<label>_<n>.<ext>`
pub fn slice_file_name(
    token: &str,
    label: OrientationLabel,
    number: usize,
    format: OutputFormat,
) -> String {
    format!("{token}_{label}_{number}.{}", format.extension())
}

#[derive(Debug)]
pub struct SliceExporter {
    output_dir: PathBuf,
    format: OutputFormat,
    written: HashSet<PathBuf>,
}

impl SliceExporter {
    pub fn new(output_dir: &Path, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            format,
            written: HashSet::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes one numbered series. Numbering starts at 0 on every call and the
    /// label is worked out again for each volume.
    pub fn write_series<'a, I>(&mut self, token: &str, volumes: I) -> Result<Vec<PathBuf>, VolumeError>
    where
        I: IntoIterator<Item = &'a Volume>,
    {
        let mut paths = Vec::new();
        for (number, volume) in volumes.into_iter().enumerate() {
            let label = classify_volume(volume);
            let path = self
                .output_dir
                .join(slice_file_name(token, label, number, self.format));
            if !self.written.insert(path.clone()) {
                warn!("Overwriting {} written earlier in this run", path.display());
            }
            volume.save(&path)?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Writes the images of `slot`, then its segmentations.
    pub fn export_slot(&mut self, slot: &OrientationSlot) -> Result<Vec<PathBuf>, VolumeError> {
        let mut paths = self.write_series(IMAGE_TOKEN, slot.images())?;
        paths.extend(self.write_series(SEGMENTATION_TOKEN, slot.segmentations())?);
        info!(
            "Wrote {} files for slot labelled {}",
            paths.len(),
            slot.label().map_or("(empty)", |l| l.as_str())
        );
        Ok(paths)
    }
}
