//! Registering the segmentation onto each reference image.

use log::debug;

use crate::common::TranslationVector;
use crate::error::TrackError;
use crate::orientation::{classify_volume, OrientationRegistry};
use crate::pairing::AlignmentJob;
use crate::resample::{resample_nearest, ResampleError, TranslationTransform};
use crate::volume::Volume;

/// Value written where the moved segmentation does not reach.
const BACKGROUND: f32 = 0.0;

/// A reference image and the segmentation resampled onto its grid.
#[derive(Debug, Clone)]
pub struct RegisteredPair {
    pub reference: Volume,
    pub segmentation: Volume,
}

/// Holds the segmentation shared by every alignment of a run.
#[derive(Debug)]
pub struct Aligner {
    segmentation: Volume,
}

impl Aligner {
    pub fn new(segmentation: Volume) -> Self {
        Self { segmentation }
    }

    pub fn segmentation(&self) -> &Volume {
        &self.segmentation
    }

    /// Pulls the segmentation onto `reference` through the inverse of
    /// `translation`.
    ///
    /// The translation lines `reference` up with the segmentation, so its
    /// inverse carries the segmentation onto the reference. The result has the
    /// reference's grid and header.
    pub fn register(
        &self,
        reference: Volume,
        translation: &TranslationVector,
    ) -> Result<RegisteredPair, ResampleError> {
        let transform = TranslationTransform::new(translation).inverse();
        let data = resample_nearest(
            &self.segmentation,
            &transform,
            &reference.geometry,
            BACKGROUND,
        )?;
        let segmentation = reference.with_data(data);
        Ok(RegisteredPair {
            reference,
            segmentation,
        })
    }

    /// Loads the image of `job`, registers it and files the pair. Returns the
    /// slot the pair went into.
    pub fn align_job(
        &self,
        job: &AlignmentJob,
        registry: &mut OrientationRegistry,
    ) -> Result<usize, TrackError> {
        let reference = Volume::load(&job.image)?;
        let label = classify_volume(&reference);
        let pair = self.register(reference, &job.translation)?;
        let slot = registry.file(pair)?;
        debug!(
            "Aligned {} with translation {} into slot {} ({})",
            job.image.display(),
            job.translation,
            slot,
            label
        );
        Ok(slot)
    }

    /// Aligns every job in order.
    pub fn align_all(
        &self,
        jobs: &[AlignmentJob],
        registry: &mut OrientationRegistry,
    ) -> Result<(), TrackError> {
        for job in jobs {
            self.align_job(job, registry)?;
        }
        Ok(())
    }
}
