// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip containers.
//!
//! A container is a logical clipping region: a `width` × `height` rectangle
//! placed by an affine transform, optionally nested in a parent container.
//! Its clip polygon is published once as a custom property on the document
//! root, and every DOM instantiation of the container (one per layer it is
//! used in) references that property. Recomputing the polygon therefore
//! updates all instantiations at once.

use alloc::format;
use alloc::string::String;
use core::fmt::Write as _;

use kurbo::{Affine, Point};

/// Class on every container instantiation.
pub const CONTAINER_CLASS: &str = "clipping-container";
/// Attribute carrying the container id on every instantiation.
pub const CONTAINER_ID_ATTRIBUTE: &str = "data-container-id";

/// A sparse update to a container's geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerPatch {
    /// New width in pixels.
    pub width: Option<f64>,
    /// New height in pixels.
    pub height: Option<f64>,
    /// New transform, as `[a, b, c, d, e, f]`.
    pub transform: Option<[f64; 6]>,
}

/// The logical state of one container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Container {
    /// Enclosing container, or `None` if the container sits directly in a
    /// layer overlay.
    pub parent: Option<u32>,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Placement within the parent.
    pub transform: Affine,
}

impl Container {
    /// A zero-sized container at the parent's origin.
    #[must_use]
    pub const fn new(parent: Option<u32>) -> Self {
        Self {
            parent,
            width: 0.0,
            height: 0.0,
            transform: Affine::IDENTITY,
        }
    }

    /// Applies the fields present in `patch`.
    pub fn merge(&mut self, patch: &ContainerPatch) {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(coeffs) = patch.transform {
            self.transform = Affine::new(coeffs);
        }
    }

    /// The clip rectangle's corners after the transform, clockwise from the
    /// origin.
    #[must_use]
    pub fn clip_polygon(&self) -> [Point; 4] {
        let (w, h) = (self.width, self.height);
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(|p| self.transform * Point::from(p))
    }

    /// The CSS `polygon()` value of [`clip_polygon`](Self::clip_polygon).
    #[must_use]
    pub fn clip_path_css(&self) -> String {
        let mut css = String::from("polygon(");
        for (i, p) in self.clip_polygon().iter().enumerate() {
            if i > 0 {
                css.push_str(", ");
            }
            let _ = write!(css, "{}px {}px", p.x, p.y);
        }
        css.push(')');
        css
    }
}

/// Name of the root custom property holding container `id`'s clip path.
#[must_use]
pub fn clip_property(id: u32) -> String {
    format!("--container-{id}-clip-path")
}

/// The `clip-path` value every instantiation of container `id` uses.
#[must_use]
pub fn clip_reference(id: u32) -> String {
    format!("var({})", clip_property(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_polygon_is_the_rectangle() {
        let mut container = Container::new(None);
        container.merge(&ContainerPatch {
            width: Some(100.0),
            height: Some(50.0),
            transform: None,
        });
        assert_eq!(
            container.clip_polygon(),
            [
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(0.0, 50.0),
            ]
        );
        assert_eq!(
            container.clip_path_css(),
            "polygon(0px 0px, 100px 0px, 100px 50px, 0px 50px)"
        );
    }

    #[test]
    fn corners_follow_the_affine() {
        let mut container = Container::new(Some(1));
        container.merge(&ContainerPatch {
            width: Some(10.0),
            height: Some(20.0),
            // x' = 2x + 5, y' = 3y + 7
            transform: Some([2.0, 0.0, 0.0, 3.0, 5.0, 7.0]),
        });
        let [a, b, c, d] = container.clip_polygon();
        assert_eq!(a, Point::new(5.0, 7.0));
        assert_eq!(b, Point::new(25.0, 7.0));
        assert_eq!(c, Point::new(25.0, 67.0));
        assert_eq!(d, Point::new(5.0, 67.0));
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut container = Container::new(None);
        container.merge(&ContainerPatch {
            width: Some(4.0),
            height: Some(8.0),
            transform: Some([1.0, 0.0, 0.0, 1.0, 3.0, 0.0]),
        });
        container.merge(&ContainerPatch {
            height: Some(9.0),
            ..ContainerPatch::default()
        });
        assert_eq!(container.width, 4.0);
        assert_eq!(container.height, 9.0);
        assert_eq!(container.transform.translation().x, 3.0);
    }

    #[test]
    fn property_names_are_keyed_by_id() {
        assert_eq!(clip_property(12), "--container-12-clip-path");
        assert_eq!(clip_reference(12), "var(--container-12-clip-path)");
    }
}
