//! Physical sampling grid of a volume.
//!
//! NIfTI stores a voxel-to-world affine in RAS coordinates. The registration
//! offsets in the transforms table are expressed in LPS, so every grid is kept
//! in LPS here: the first two rows of the NIfTI affine are negated on the way
//! in and again on the way out.

use nalgebra::{Matrix3, Matrix4, Vector3};
use thiserror::Error;

use crate::common::DirectionMatrix;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("voxel axis {axis} has a degenerate spacing of {spacing}")]
    DegenerateAxis { axis: usize, spacing: f64 },
}

/// Sign flip between RAS and LPS for row `r`.
fn lps_sign(r: usize) -> f64 {
    if r < 2 {
        -1.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub origin: Vector3<f64>,
    pub spacing: Vector3<f64>,
    pub direction: DirectionMatrix,
    pub size: [usize; 3],
}

impl Geometry {
    /// Splits a RAS voxel-to-world affine into origin, spacing and direction.
    ///
    /// Spacing is the length of each column of the linear part; direction is
    /// that column divided by its length.
    pub fn from_affine(affine: &Matrix4<f64>, size: [usize; 3]) -> Result<Self, GeometryError> {
        let linear = Matrix3::from_fn(|r, c| lps_sign(r) * affine[(r, c)]);
        let origin = Vector3::from_fn(|r, _| lps_sign(r) * affine[(r, 3)]);

        let mut spacing = Vector3::zeros();
        let mut direction = Matrix3::zeros();
        for axis in 0..3 {
            let column = linear.column(axis);
            let length = column.norm();
            if !length.is_finite() || length <= 0.0 {
                return Err(GeometryError::DegenerateAxis {
                    axis,
                    spacing: length,
                });
            }
            spacing[axis] = length;
            direction.set_column(axis, &(column / length));
        }

        Ok(Self {
            origin,
            spacing,
            direction,
            size,
        })
    }

    /// RAS voxel-to-world affine, the inverse of [`Geometry::from_affine`].
    pub fn to_affine(&self) -> Matrix4<f64> {
        let linear = self.index_to_physical();
        let mut affine = Matrix4::identity();
        for r in 0..3 {
            for c in 0..3 {
                affine[(r, c)] = lps_sign(r) * linear[(r, c)];
            }
            affine[(r, 3)] = lps_sign(r) * self.origin[r];
        }
        affine
    }

    /// Linear map from a voxel index to an LPS offset from the origin.
    pub fn index_to_physical(&self) -> Matrix3<f64> {
        self.direction * Matrix3::from_diagonal(&self.spacing)
    }

    /// LPS position of the centre of voxel `index`.
    pub fn physical_point(&self, index: [usize; 3]) -> Vector3<f64> {
        let idx = Vector3::new(index[0] as f64, index[1] as f64, index[2] as f64);
        self.origin + self.index_to_physical() * idx
    }

    pub fn num_voxels(&self) -> usize {
        self.size.iter().product()
    }
}
