//! Point types for mesh, UV and pixel space

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D mesh vertex position
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A 2D point in UV (template) space, nominally in [0,1] x [0,1]
pub type UvPoint = Point2<f64>;

/// A pixel coordinate on the location drawing image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for PixelPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for PixelPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the location drawing image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ImageSize {
    width: f64,
    height: f64,
}

impl ImageSize {
    /// Create an image size, rejecting non-positive or non-finite dimensions
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
            return Err(Error::OutOfRange(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whether a pixel lies on the image, edges included
    pub fn contains(&self, pixel: &PixelPoint) -> bool {
        pixel.is_finite()
            && (0.0..=self.width).contains(&pixel.x)
            && (0.0..=self.height).contains(&pixel.y)
    }
}

impl TryFrom<[f64; 2]> for ImageSize {
    type Error = Error;

    fn try_from([width, height]: [f64; 2]) -> Result<Self> {
        Self::new(width, height)
    }
}

impl From<ImageSize> for [f64; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width, size.height]
    }
}

/// Whether a UV point lies strictly inside the unit square
pub fn uv_in_bounds(uv: &UvPoint) -> bool {
    uv.x > 0.0 && uv.x < 1.0 && uv.y > 0.0 && uv.y < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_rejects_non_positive() {
        assert!(ImageSize::new(500.0, 500.0).is_ok());
        assert!(matches!(ImageSize::new(0.0, 500.0), Err(Error::OutOfRange(_))));
        assert!(matches!(ImageSize::new(500.0, -1.0), Err(Error::OutOfRange(_))));
        assert!(matches!(ImageSize::new(f64::NAN, 10.0), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_image_contains_edges() {
        let image = ImageSize::new(100.0, 50.0).unwrap();
        assert!(image.contains(&PixelPoint::new(0.0, 0.0)));
        assert!(image.contains(&PixelPoint::new(100.0, 50.0)));
        assert!(!image.contains(&PixelPoint::new(100.5, 10.0)));
        assert!(!image.contains(&PixelPoint::new(f64::NAN, 10.0)));
    }

    #[test]
    fn test_uv_bounds_are_strict() {
        assert!(uv_in_bounds(&UvPoint::new(0.5, 0.5)));
        assert!(!uv_in_bounds(&UvPoint::new(0.0, 0.5)));
        assert!(!uv_in_bounds(&UvPoint::new(0.5, 1.0)));
        assert!(!uv_in_bounds(&UvPoint::new(1.3, 0.5)));
        assert!(!uv_in_bounds(&UvPoint::new(-0.2, 0.5)));
    }
}
