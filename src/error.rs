use std::path::PathBuf;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::orientation::RegistryError;
use crate::pairing::PairingError;
use crate::resample::ResampleError;
use crate::translations::TranslationError;
use crate::volume::VolumeError;

/// Any failure that stops a run.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Translations(#[from] TranslationError),

    #[error(transparent)]
    Volume(#[from] VolumeError),

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("could not resample the segmentation: {0}")]
    Resample(#[from] ResampleError),

    #[error("could not create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackError {
    /// Process exit status for this failure. Success is 0 and clap uses 2 for
    /// usage errors, so these start at 3.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrackError::Layout(_) => 3,
            TrackError::Translations(_) => 4,
            TrackError::Volume(_) => 5,
            TrackError::Pairing(_) => 6,
            TrackError::Registry(_) => 7,
            TrackError::Resample(_) => 8,
            TrackError::OutputDir { .. } => 9,
        }
    }
}
