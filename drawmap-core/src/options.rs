//! Configuration for mapping, region extraction and query sessions

use crate::point::ImageSize;
use serde::{Deserialize, Serialize};

/// How the image's vertical axis relates to the UV `v` axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAxis {
    /// Image origin top-left, UV origin bottom-left: `v = 1 - y / height`
    #[default]
    Flipped,
    /// Both origins at the same corner: `v = y / height`
    Aligned,
}

/// How enclosed UV points are found for a drawn border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentStrategy {
    /// Test every UV point against the polygon
    Exhaustive,
    /// Only test UV points inside the border's bounding box
    #[default]
    BoundingBox,
}

/// Options for pixel -> UV -> vertex mapping
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingOptions {
    pub vertical_axis: VerticalAxis,
}

impl MappingOptions {
    pub fn with_vertical_axis(mut self, vertical_axis: VerticalAxis) -> Self {
        self.vertical_axis = vertical_axis;
        self
    }
}

/// Options for surface patch extraction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionOptions {
    #[serde(default)]
    pub mapping: MappingOptions,
    #[serde(default)]
    pub containment: ContainmentStrategy,
}

impl RegionOptions {
    pub fn with_mapping(mut self, mapping: MappingOptions) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_containment(mut self, containment: ContainmentStrategy) -> Self {
        self.containment = containment;
        self
    }
}

/// Options for a geodesic query session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Size of the location drawing the batch pixel coordinates refer to
    pub image_size: ImageSize,
    #[serde(default)]
    pub mapping: MappingOptions,
}

impl SessionOptions {
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,
            mapping: MappingOptions::default(),
        }
    }

    pub fn with_mapping(mut self, mapping: MappingOptions) -> Self {
        self.mapping = mapping;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RegionOptions::default();
        assert_eq!(options.mapping.vertical_axis, VerticalAxis::Flipped);
        assert_eq!(options.containment, ContainmentStrategy::BoundingBox);
    }

    #[test]
    fn test_builders() {
        let options = RegionOptions::default()
            .with_containment(ContainmentStrategy::Exhaustive)
            .with_mapping(MappingOptions::default().with_vertical_axis(VerticalAxis::Aligned));
        assert_eq!(options.containment, ContainmentStrategy::Exhaustive);
        assert_eq!(options.mapping.vertical_axis, VerticalAxis::Aligned);
    }
}
