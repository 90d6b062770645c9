//! Joining image paths with translation rows.
//!
//! The n-th image in the input directory is aligned with the n-th valid row
//! of the translation table. Nothing else ties the two together.

use log::warn;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::common::TranslationVector;

/// What to do when the number of images and translations differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountPolicy {
    /// Warn and align only as many images as there are translations.
    #[default]
    Lenient,
    /// Refuse to align anything.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    pub translations: usize,
    pub images: usize,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "there are {} translations and {} images",
            self.translations, self.images
        )
    }
}

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("count mismatch between translations and images: {0}")]
    CountMismatch(CountMismatch),
}

/// One unit of alignment work.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentJob {
    pub index: usize,
    pub image: PathBuf,
    pub translation: TranslationVector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub jobs: Vec<AlignmentJob>,
    pub mismatch: Option<CountMismatch>,
}

/// Joins `images` and `translations` by position.
///
/// With [`CountPolicy::Lenient`] a mismatch is logged and the longer list is
/// cut to the length of the shorter one.
pub fn pair_inputs(
    images: Vec<PathBuf>,
    translations: Vec<TranslationVector>,
    policy: CountPolicy,
) -> Result<Pairing, PairingError> {
    let mismatch = (images.len() != translations.len()).then(|| CountMismatch {
        translations: translations.len(),
        images: images.len(),
    });

    if let Some(mismatch) = mismatch {
        if policy == CountPolicy::Strict {
            return Err(PairingError::CountMismatch(mismatch));
        }
        warn!(
            "There is a count mismatch between translations and images: {}",
            mismatch
        );
    }

    let jobs = images
        .into_iter()
        .zip(translations)
        .enumerate()
        .map(|(index, (image, translation))| AlignmentJob {
            index,
            image,
            translation,
        })
        .collect();

    Ok(Pairing { jobs, mismatch })
}
