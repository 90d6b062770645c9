//! Reading and writing NIfTI volumes.

use ndarray::{Array3, Axis, Ix2, Ix3};
use nifti::error::NiftiError;
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::common::DirectionMatrix;
use crate::geometry::{Geometry, GeometryError};

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },

    #[error("could not write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },

    #[error("{path:?} has {ndim} dimensions, expected a 2D or 3D image")]
    UnsupportedDimensionality { path: PathBuf, ndim: usize },

    #[error("{path:?} has an unusable affine: {source}")]
    Geometry {
        path: PathBuf,
        #[source]
        source: GeometryError,
    },

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// A scalar image together with the grid it lives on.
#[derive(Debug, Clone)]
pub struct Volume {
    pub data: Array3<f32>,
    pub geometry: Geometry,
    pub header: NiftiHeader,
    /// Dimensionality recorded in the file (`dim[0]`), before 2D images are
    /// promoted to a single slice.
    pub source_ndim: usize,
}

impl Volume {
    /// Reads a `.nii` or `.nii.gz` file.
    ///
    /// Voxel values are scaled by `scl_slope`/`scl_inter` on the way in. A 2D
    /// image becomes a volume with one slice along the third axis; trailing
    /// singleton axes beyond the third are dropped.
    pub fn load(path: &Path) -> Result<Self, VolumeError> {
        let obj = ReaderOptions::new()
            .read_file(path)
            .map_err(|source| VolumeError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let header = obj.header().clone();
        let img = obj
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(|source| VolumeError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let source_ndim = img.ndim();
        let data = match source_ndim {
            2 => img.into_dimensionality::<Ix2>()?.insert_axis(Axis(2)),
            3 => img.into_dimensionality::<Ix3>()?,
            n if n > 3 && img.shape()[3..].iter().all(|&d| d == 1) => {
                let mut img = img;
                while img.ndim() > 3 {
                    let last = img.ndim() - 1;
                    img = img.index_axis_move(Axis(last), 0);
                }
                img.into_dimensionality::<Ix3>()?
            }
            ndim => {
                return Err(VolumeError::UnsupportedDimensionality {
                    path: path.to_path_buf(),
                    ndim,
                })
            }
        };

        let (nx, ny, nz) = data.dim();
        let geometry = Geometry::from_affine(&header.affine::<f64>(), [nx, ny, nz]).map_err(
            |source| VolumeError::Geometry {
                path: path.to_path_buf(),
                source,
            },
        )?;

        Ok(Self {
            data,
            geometry,
            header,
            source_ndim,
        })
    }

    /// Builds a 3D volume from voxels and a grid, with a fresh header whose
    /// sform carries the grid.
    pub fn from_geometry(data: Array3<f32>, geometry: Geometry) -> Self {
        let mut header = NiftiHeader::default();
        header.set_affine(&geometry.to_affine());
        header.sform_code = 1;
        for axis in 0..3 {
            header.pixdim[axis + 1] = geometry.spacing[axis] as f32;
        }
        Self {
            data,
            geometry,
            header,
            source_ndim: 3,
        }
    }

    /// Same grid and header, different voxels.
    pub fn with_data(&self, data: Array3<f32>) -> Self {
        Self {
            data,
            geometry: self.geometry.clone(),
            header: self.header.clone(),
            source_ndim: self.source_ndim,
        }
    }

    pub fn direction(&self) -> &DirectionMatrix {
        &self.geometry.direction
    }

    /// Writes the volume as `f32`, reusing the header it was read with.
    ///
    /// The data is already scaled, so the intensity scaling of the header is
    /// reset. A `.gz` suffix on `path` compresses the output.
    pub fn save(&self, path: &Path) -> Result<(), VolumeError> {
        let mut header = self.header.clone();
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&self.data)
            .map_err(|source| VolumeError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}
