//! Orientation labels and grouping of images by direction matrix.

use std::fmt;
use thiserror::Error;

use crate::align::RegisteredPair;
use crate::common::{Direction, DirectionMatrix};
use crate::volume::Volume;

/// Name of an image orientation as shown by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationLabel {
    Sagittal,
    Coronal,
    Axial,
    Oblique,
    /// Anything that is not a 3D image.
    Img,
}

impl OrientationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationLabel::Sagittal => "Sagittal",
            OrientationLabel::Coronal => "Coronal",
            OrientationLabel::Axial => "Axial",
            OrientationLabel::Oblique => "Oblique",
            OrientationLabel::Img => "img",
        }
    }
}

impl From<Direction> for OrientationLabel {
    fn from(axis: Direction) -> Self {
        match axis {
            Direction::X => OrientationLabel::Sagittal,
            Direction::Y => OrientationLabel::Coronal,
            Direction::Z => OrientationLabel::Axial,
        }
    }
}

impl fmt::Display for OrientationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels an image by the patient axis its slices are stacked along.
///
/// Only the third column of `direction` is inspected. The rows are checked
/// in X, Y, Z order and the first whose rounded absolute cosine is 1 wins.
/// Any unit column has a component of at least 1/sqrt(3), so a tilted stack
/// still gets a named label; `Oblique` is left for columns with no
/// component in [0.5, 1.5). Images that are not 3D are always labelled `img`.
pub fn classify(ndim: usize, direction: &DirectionMatrix) -> OrientationLabel {
    if ndim != 3 {
        return OrientationLabel::Img;
    }
    Direction::ALL
        .iter()
        .find(|axis| direction[(axis.to_usize(), 2)].abs().round() == 1.0)
        .map(|&axis| axis.into())
        .unwrap_or(OrientationLabel::Oblique)
}

pub fn classify_volume(volume: &Volume) -> OrientationLabel {
    classify(volume.source_ndim, volume.direction())
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("more than {capacity} distinct orientations found")]
    CapacityExceeded { capacity: usize },
}

/// Images sharing one exact direction matrix, each with its registered
/// segmentation.
#[derive(Debug)]
pub struct OrientationSlot {
    direction: DirectionMatrix,
    pairs: Vec<RegisteredPair>,
}

impl OrientationSlot {
    fn new(direction: DirectionMatrix) -> Self {
        Self {
            direction,
            pairs: Vec::new(),
        }
    }

    /// The matrix of the first image filed here.
    pub fn direction(&self) -> &DirectionMatrix {
        &self.direction
    }

    pub fn pairs(&self) -> &[RegisteredPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn images(&self) -> impl Iterator<Item = &Volume> {
        self.pairs.iter().map(|pair| &pair.reference)
    }

    pub fn segmentations(&self) -> impl Iterator<Item = &Volume> {
        self.pairs.iter().map(|pair| &pair.segmentation)
    }

    /// Label of the first image in the slot, if any.
    pub fn label(&self) -> Option<OrientationLabel> {
        self.pairs.first().map(|pair| classify_volume(&pair.reference))
    }
}

/// Slots in the order their direction matrix was first seen.
#[derive(Debug, Default)]
pub struct OrientationRegistry {
    slots: Vec<OrientationSlot>,
    capacity: Option<usize>,
}

impl OrientationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that refuses to open more than `capacity` slots.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Index of the slot whose matrix equals `direction` exactly, opening a
    /// new slot when none does.
    pub fn slot_index(&mut self, direction: &DirectionMatrix) -> Result<usize, RegistryError> {
        if let Some(index) = self.slots.iter().position(|s| s.direction == *direction) {
            return Ok(index);
        }
        if let Some(capacity) = self.capacity {
            if self.slots.len() >= capacity {
                return Err(RegistryError::CapacityExceeded { capacity });
            }
        }
        self.slots.push(OrientationSlot::new(*direction));
        Ok(self.slots.len() - 1)
    }

    /// Appends `pair` to the slot of its reference image and returns the
    /// slot index.
    pub fn file(&mut self, pair: RegisteredPair) -> Result<usize, RegistryError> {
        let index = self.slot_index(pair.reference.direction())?;
        self.slots[index].pairs.push(pair);
        Ok(index)
    }

    pub fn slots(&self) -> &[OrientationSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total_pairs(&self) -> usize {
        self.slots.iter().map(OrientationSlot::len).sum()
    }
}
