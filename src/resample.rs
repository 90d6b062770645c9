//! Nearest-neighbour resampling of a volume onto another grid.

use nalgebra::Vector3;
use ndarray::Array3;
use thiserror::Error;

use crate::common::TranslationVector;
use crate::geometry::Geometry;
use crate::volume::Volume;

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("source grid cannot be inverted")]
    SingularGrid,
}

/// Rigid shift of physical space, `x -> x + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationTransform {
    offset: Vector3<f64>,
}

impl TranslationTransform {
    pub fn new(translation: &TranslationVector) -> Self {
        Self {
            offset: translation.to_vector(),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            offset: -self.offset,
        }
    }

    pub fn offset(&self) -> &Vector3<f64> {
        &self.offset
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        point + self.offset
    }
}

/// Samples `source` on every voxel of `frame`.
///
/// `transform` maps points of the output frame into the source's physical
/// space. Each output voxel copies the source voxel nearest to the mapped
/// point, so label values are never blended. Points that land outside the
/// source get `default`.
pub fn resample_nearest(
    source: &Volume,
    transform: &TranslationTransform,
    frame: &Geometry,
    default: f32,
) -> Result<Array3<f32>, ResampleError> {
    let to_source_index = source
        .geometry
        .index_to_physical()
        .try_inverse()
        .ok_or(ResampleError::SingularGrid)?;
    let to_physical = frame.index_to_physical();
    let source_size = source.geometry.size;

    let [nx, ny, nz] = frame.size;
    Ok(Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
        let index = Vector3::new(i as f64, j as f64, k as f64);
        let point = transform.transform_point(&(frame.origin + to_physical * index));
        let continuous = to_source_index * (point - source.geometry.origin);
        match nearest_index(&continuous, source_size) {
            Some(idx) => source.data[idx],
            None => default,
        }
    }))
}

/// Rounds a continuous index half-up, or `None` when it falls outside the
/// half-voxel border of the buffer.
fn nearest_index(continuous: &Vector3<f64>, size: [usize; 3]) -> Option<[usize; 3]> {
    let mut index = [0usize; 3];
    for axis in 0..3 {
        let c = continuous[axis];
        if !(c >= -0.5 && c < size[axis] as f64 - 0.5) {
            return None;
        }
        index[axis] = (c + 0.5).floor() as usize;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn grid(origin: Vector3<f64>, spacing: f64, size: [usize; 3]) -> Geometry {
        Geometry {
            origin,
            spacing: Vector3::new(spacing, spacing, spacing),
            direction: Matrix3::identity(),
            size,
        }
    }

    fn labelled_cube() -> Volume {
        let data = Array3::from_shape_fn((4, 4, 4), |(i, j, k)| {
            if i == 1 && j == 2 && k == 3 {
                5.0
            } else if i >= 2 {
                1.0
            } else {
                0.0
            }
        });
        Volume::from_geometry(data, grid(Vector3::zeros(), 1.0, [4, 4, 4]))
    }

    #[test]
    fn inverse_undoes_the_shift() {
        let transform = TranslationTransform::new(&TranslationVector::new(1.0, -2.0, 0.5));
        let p = Vector3::new(3.0, 3.0, 3.0);
        assert_eq!(transform.inverse().transform_point(&transform.transform_point(&p)), p);
        assert_eq!(*transform.inverse().offset(), Vector3::new(-1.0, 2.0, -0.5));
    }

    #[test]
    fn zero_translation_on_the_same_grid_is_the_identity() {
        let seg = labelled_cube();
        let identity = TranslationTransform::new(&TranslationVector::zero());
        let out = resample_nearest(&seg, &identity, &seg.geometry, 0.0).unwrap();
        assert_eq!(out, seg.data);
    }

    #[test]
    fn translation_moves_labels_by_whole_voxels() {
        let seg = labelled_cube();
        // Pulling through the inverse of +1 mm in X moves content one voxel up X.
        let inverse = TranslationTransform::new(&TranslationVector::new(1.0, 0.0, 0.0)).inverse();
        let out = resample_nearest(&seg, &inverse, &seg.geometry, 0.0).unwrap();
        assert_eq!(out[[2, 2, 3]], 5.0);
        assert_eq!(out[[1, 2, 3]], 0.0);
        // X = 0 samples outside the source and falls back to the default.
        assert_eq!(out[[0, 0, 0]], 0.0);
        assert_eq!(out[[3, 0, 0]], 1.0);
    }

    #[test]
    fn sub_voxel_offsets_never_blend_labels() {
        let seg = labelled_cube();
        let inverse = TranslationTransform::new(&TranslationVector::new(0.4, 0.3, -0.2)).inverse();
        let out = resample_nearest(&seg, &inverse, &seg.geometry, 0.0).unwrap();
        assert!(out.iter().all(|&v| v == 0.0 || v == 1.0 || v == 5.0));
        assert_eq!(out, seg.data);
    }

    #[test]
    fn output_takes_the_frame_grid() {
        let seg = labelled_cube();
        // A coarser frame offset by one voxel: output voxel n sits on source voxel 2n + 1.
        let frame = grid(Vector3::new(1.0, 1.0, 1.0), 2.0, [2, 2, 2]);
        let identity = TranslationTransform::new(&TranslationVector::zero());
        let out = resample_nearest(&seg, &identity, &frame, -1.0).unwrap();
        assert_eq!(out.dim(), (2, 2, 2));
        assert_eq!(out[[0, 0, 1]], seg.data[[1, 1, 3]]);
        assert_eq!(out[[1, 1, 1]], seg.data[[3, 3, 3]]);
    }

    #[test]
    fn half_voxel_border_is_inside() {
        assert_eq!(nearest_index(&Vector3::new(-0.5, 0.0, 3.49), [4, 4, 4]), Some([0, 0, 3]));
        assert_eq!(nearest_index(&Vector3::new(3.5, 0.0, 0.0), [4, 4, 4]), None);
        assert_eq!(nearest_index(&Vector3::new(-0.51, 0.0, 0.0), [4, 4, 4]), None);
        assert_eq!(nearest_index(&Vector3::new(f64::NAN, 0.0, 0.0), [4, 4, 4]), None);
        assert_eq!(nearest_index(&Vector3::new(1.5, 0.0, 0.0), [4, 4, 4]), Some([2, 0, 0]));
    }

    #[test]
    fn singular_source_grid_is_an_error() {
        let mut seg = labelled_cube();
        seg.geometry.direction = Matrix3::zeros();
        let identity = TranslationTransform::new(&TranslationVector::zero());
        let frame = seg.geometry.clone();
        assert!(matches!(
            resample_nearest(&seg, &identity, &frame, 0.0),
            Err(ResampleError::SingularGrid)
        ));
    }
}
