//! Prepares a tracking package for playback in 3D Slicer.
//!
//! A package is a directory holding a series of nifti images, one
//! `Segmentation` volume and a `Transforms` CSV table with one X, Y, Z
//! translation per image. For every image the segmentation is moved by the
//! inverse of its translation and resampled onto the image's grid, so the
//! mask covers the tracked region. Images and their registered segmentations
//! are grouped by direction matrix and written to `<input>_output` as
//! `img_<Label>_<n>.nii` / `seg_<Label>_<n>.nii`.

pub mod align;
pub mod common;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod orientation;
pub mod pairing;
pub mod pipeline;
pub mod resample;
pub mod translations;
pub mod volume;

pub use error::TrackError;
pub use pipeline::{run, PipelineConfig, RunSummary};
