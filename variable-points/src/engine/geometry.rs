use std::iter::Copied;
use std::ops::Range;
use std::slice;
use std::sync::OnceLock;

use bevy::math::bounding::BoundingSphere;
use bevy::math::Isometry3d;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Per-point attribute buffers shared by the renderer and the picker.
///
/// `positions`, `sizes` and `colours` are index-parallel: entry `i` of each
/// describes one logical point. Sizes are on-screen diameters in pixels and
/// colours are linear RGB written verbatim by the fragment stage.
///
/// Loadable from `*.points.json` files:
///
/// ```json
/// { "positions": [[0, 0, -10]], "sizes": [20], "colours": [[1, 0, 0]], "index": [0] }
/// ```
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCloudGeometry {
    positions: Vec<[f32; 3]>,
    sizes: Vec<f32>,
    #[serde(alias = "colors")]
    colours: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<Vec<u32>>,
    #[serde(skip)]
    bounding_sphere: OnceLock<Option<BoundingSphere>>,
}

impl PointCloudGeometry {
    pub fn new(positions: Vec<[f32; 3]>, sizes: Vec<f32>, colours: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            sizes,
            colours,
            index: None,
            bounding_sphere: OnceLock::new(),
        }
    }

    pub fn with_index(mut self, index: Vec<u32>) -> Self {
        self.index = Some(index);
        self
    }

    /// Number of points in the attribute buffers, ignoring any index.
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local-space position of point `i`. Panics when `i` is out of range.
    pub fn position(&self, i: u32) -> Vec3 {
        Vec3::from_array(self.positions[i as usize])
    }

    /// Pixel diameter of point `i`. Panics when `i` is out of range.
    pub fn size(&self, i: u32) -> f32 {
        self.sizes[i as usize]
    }

    /// Linear colour of point `i`. Panics when `i` is out of range.
    pub fn colour(&self, i: u32) -> Vec3 {
        Vec3::from_array(self.colours[i as usize])
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    pub fn set_positions(&mut self, positions: Vec<[f32; 3]>) {
        self.positions = positions;
        self.bounding_sphere = OnceLock::new();
    }

    pub fn set_colour(&mut self, i: u32, colour: Vec3) {
        self.colours[i as usize] = colour.to_array();
    }

    /// Points to process, in processing order: the index buffer when present,
    /// otherwise every point in buffer order.
    pub fn candidate_indices(&self) -> CandidateIndices<'_> {
        match &self.index {
            Some(index) => CandidateIndices::Indexed(index.iter().copied()),
            None => CandidateIndices::Linear(0..self.positions.len() as u32),
        }
    }

    /// Local-space sphere enclosing every position, computed on first use and
    /// cached until the positions change. `None` for an empty cloud.
    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere
            .get_or_init(|| self.compute_bounding_sphere())
            .as_ref()
    }

    fn compute_bounding_sphere(&self) -> Option<BoundingSphere> {
        if self.positions.is_empty() {
            return None;
        }
        let points: Vec<Vec3> = self.positions.iter().copied().map(Vec3::from_array).collect();
        Some(BoundingSphere::from_point_cloud(Isometry3d::IDENTITY, &points))
    }

    /// Check the index-parallel invariant up front instead of faulting on the
    /// first out-of-range read.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let expected = self.positions.len();
        for (attribute, actual) in [("sizes", self.sizes.len()), ("colours", self.colours.len())] {
            if actual != expected {
                return Err(GeometryError::AttributeLength {
                    attribute,
                    expected,
                    actual,
                });
            }
        }

        if let Some((point, &size)) = self.sizes.iter().enumerate().find(|(_, s)| **s < 0.0) {
            return Err(GeometryError::NegativeSize { point, size });
        }

        if let Some(index) = &self.index {
            if let Some((slot, &point)) = index
                .iter()
                .enumerate()
                .find(|(_, p)| **p as usize >= expected)
            {
                return Err(GeometryError::IndexOutOfRange {
                    slot,
                    point,
                    count: expected,
                });
            }
        }

        Ok(())
    }
}

/// Iterator over the point indices a render or pick pass visits.
pub enum CandidateIndices<'a> {
    Indexed(Copied<slice::Iter<'a, u32>>),
    Linear(Range<u32>),
}

impl Iterator for CandidateIndices<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            Self::Indexed(iter) => iter.next(),
            Self::Linear(range) => range.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Indexed(iter) => iter.size_hint(),
            Self::Linear(range) => range.size_hint(),
        }
    }
}

impl ExactSizeIterator for CandidateIndices<'_> {}
