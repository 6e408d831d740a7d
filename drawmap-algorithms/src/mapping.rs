//! Pixel -> UV -> vertex mapping
//!
//! Pixel coordinates are normalized into UV space with the configured
//! [`VerticalAxis`] convention, matched to the nearest UV point, and resolved
//! through the UV->vertex lookup table.

use crate::nearest_neighbor::KdUvIndex;
use drawmap_core::{
    Error, ImageSize, MappingOptions, PixelPoint, Result, UvMap, UvPoint, UvSearch, VerticalAxis,
};

/// Normalize a pixel into UV space. The pixel must lie on the image.
pub fn normalize_pixel(
    pixel: &PixelPoint,
    image: &ImageSize,
    vertical_axis: VerticalAxis,
) -> Result<UvPoint> {
    if !image.contains(pixel) {
        return Err(Error::OutOfRange(format!(
            "pixel ({}, {}) is outside the {}x{} image",
            pixel.x,
            pixel.y,
            image.width(),
            image.height()
        )));
    }

    let u = pixel.x / image.width();
    let v = match vertical_axis {
        VerticalAxis::Flipped => 1.0 - pixel.y / image.height(),
        VerticalAxis::Aligned => pixel.y / image.height(),
    };
    Ok(UvPoint::new(u, v))
}

/// Converts annotation pixels into UV ids and mesh vertex ids
pub struct CoordinateMapper<S: UvSearch = KdUvIndex> {
    index: S,
    lookup: Vec<usize>,
    options: MappingOptions,
}

impl CoordinateMapper<KdUvIndex> {
    /// Build a mapper backed by a KD-Tree over the map's UV table
    pub fn new(uv_map: &UvMap, options: MappingOptions) -> Result<Self> {
        uv_map.validate()?;
        Self::with_index(KdUvIndex::new(&uv_map.uvs), uv_map.lookup.clone(), options)
    }
}

impl<S: UvSearch> CoordinateMapper<S> {
    /// Build a mapper from an existing UV search and its lookup table
    pub fn with_index(index: S, lookup: Vec<usize>, options: MappingOptions) -> Result<Self> {
        if index.is_empty() {
            return Err(Error::Validation("UV table is empty".to_string()));
        }
        if index.len() != lookup.len() {
            return Err(Error::Validation(format!(
                "UV index has {} points but lookup table has {}",
                index.len(),
                lookup.len()
            )));
        }
        Ok(Self {
            index,
            lookup,
            options,
        })
    }

    pub fn options(&self) -> &MappingOptions {
        &self.options
    }

    pub fn uv_count(&self) -> usize {
        self.lookup.len()
    }

    /// Nearest UV id to a point already in UV space
    pub fn nearest_uv(&self, uv: &UvPoint) -> Result<usize> {
        if !(uv.x.is_finite() && uv.y.is_finite()) {
            return Err(Error::OutOfRange(format!(
                "UV query ({}, {}) is not finite",
                uv.x, uv.y
            )));
        }
        self.index
            .nearest_uv(uv)
            .ok_or_else(|| Error::Validation("UV table is empty".to_string()))
    }

    /// Nearest UV id to a pixel on the drawing
    pub fn pixel_to_uv(&self, pixel: &PixelPoint, image: &ImageSize) -> Result<usize> {
        let uv = normalize_pixel(pixel, image, self.options.vertical_axis)?;
        self.nearest_uv(&uv)
    }

    /// Vertex id for a UV id
    pub fn uv_to_vertex(&self, uv_id: usize) -> Result<usize> {
        self.lookup.get(uv_id).copied().ok_or_else(|| {
            Error::OutOfRange(format!(
                "UV id {} is outside 0..{}",
                uv_id,
                self.lookup.len()
            ))
        })
    }

    /// Vertex id for a pixel on a `width` x `height` drawing
    pub fn pixel_to_vertex(&self, x: f64, y: f64, width: f64, height: f64) -> Result<usize> {
        let image = ImageSize::new(width, height)?;
        self.pixel_vertex(&PixelPoint::new(x, y), &image)
    }

    /// Vertex id for a pixel
    pub fn pixel_vertex(&self, pixel: &PixelPoint, image: &ImageSize) -> Result<usize> {
        let uv_id = self.pixel_to_uv(pixel, image)?;
        self.uv_to_vertex(uv_id)
    }

    /// Independent lookups for a batch of pixels, in input order
    pub fn pixels_to_vertices(
        &self,
        pixels: &[PixelPoint],
        image: &ImageSize,
    ) -> Result<Vec<usize>> {
        pixels
            .iter()
            .map(|pixel| self.pixel_vertex(pixel, image))
            .collect()
    }
}
