// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One occlusion layer: a drawing surface paired with a native overlay.
//!
//! Layer `i` stacks its canvas and its overlay at `z-index: i`, with the
//! canvas appended first, so the pair paints strictly above layer `i - 1`
//! and below layer `i + 1`. The canvas is registered with the core under a
//! [`SurfaceId`] derived from the index alone.

use alloc::collections::BTreeMap;
use alloc::string::ToString as _;
use core::fmt;

use crate::chassis::CoreLink;
use crate::dom::{Dom, ElementKind, NodeId, NodePools, OwnedNode};
use crate::error::Result;

/// Class on every layer canvas.
pub const CANVAS_CLASS: &str = "canvas";
/// Class on every layer overlay.
pub const OVERLAY_CLASS: &str = "native-overlay";

/// Identifies a drawing surface to the core.
///
/// The id of layer `i` is always `SurfaceId(i)`; its string form is the
/// canvas element's `id` attribute, which is how the core finds the canvas.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// The surface id of layer `index`.
    #[inline]
    #[must_use]
    pub const fn for_layer(index: u32) -> Self {
        Self(index)
    }

    /// The layer index this surface belongs to.
    #[inline]
    #[must_use]
    pub const fn layer(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Size of a canvas as laid out and as allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceMetrics {
    /// Layout width in CSS pixels.
    pub client_width: f64,
    /// Layout height in CSS pixels.
    pub client_height: f64,
    /// Backing buffer width in device pixels.
    pub buffer_width: u32,
    /// Backing buffer height in device pixels.
    pub buffer_height: u32,
}

impl SurfaceMetrics {
    /// The buffer size needed at `device_pixel_ratio`, or `None` if the
    /// current buffer already matches.
    #[must_use]
    pub fn resize_target(&self, device_pixel_ratio: f64) -> Option<(u32, u32)> {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "canvas sizes are small non-negative values; fractions truncate like the DOM does"
        )]
        let target = (
            (self.client_width * device_pixel_ratio) as u32,
            (self.client_height * device_pixel_ratio) as u32,
        );
        (target != (self.buffer_width, self.buffer_height)).then_some(target)
    }
}

/// Live drawing surfaces by id.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: BTreeMap<SurfaceId, NodeId>,
}

impl SurfaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The canvas node registered under `id`.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<NodeId> {
        self.surfaces.get(&id).copied()
    }

    /// Number of registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether no surfaces are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Iterates registered surfaces in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, NodeId)> + '_ {
        self.surfaces.iter().map(|(&id, &node)| (id, node))
    }

    fn insert(&mut self, id: SurfaceId, node: NodeId) {
        let previous = self.surfaces.insert(id, node);
        debug_assert!(previous.is_none(), "{id:?} registered twice");
    }

    fn remove(&mut self, id: SurfaceId) {
        let removed = self.surfaces.remove(&id);
        debug_assert!(removed.is_some(), "{id:?} was not registered");
    }
}

/// The collaborators every DOM-building operation borrows: the document,
/// its node pools, and the core.
pub struct Host<'a, D: Dom> {
    /// The document.
    pub dom: &'a mut D,
    /// Node pools.
    pub pools: &'a mut NodePools<D>,
    /// The core.
    pub core: &'a mut dyn CoreLink,
}

impl<D: Dom> fmt::Debug for Host<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}

/// A canvas and an overlay occupying one paint-order slot.
#[derive(Debug)]
pub struct Layer {
    index: u32,
    canvas: OwnedNode,
    overlay: OwnedNode,
}

impl Layer {
    /// Creates layer `index` under `mount` and registers its surface.
    ///
    /// # Errors
    ///
    /// Fails if the canvas or div pool is not registered.
    pub fn build<D: Dom>(
        host: &mut Host<'_, D>,
        surfaces: &mut SurfaceRegistry,
        mount: NodeId,
        index: u32,
    ) -> Result<Self> {
        let canvas = host.pools.get(&ElementKind::Canvas, host.dom)?;
        let overlay = host.pools.get(&ElementKind::Div, host.dom)?;
        let surface = SurfaceId::for_layer(index);
        let z_index = index.to_string();

        let dom = &mut *host.dom;
        dom.set_attribute(canvas.id(), "class", CANVAS_CLASS);
        dom.set_attribute(canvas.id(), "id", &surface.to_string());
        dom.set_style(canvas.id(), "z-index", &z_index);
        dom.set_attribute(overlay.id(), "class", OVERLAY_CLASS);
        dom.set_style(overlay.id(), "z-index", &z_index);
        dom.append_child(mount, canvas.id());
        dom.append_child(mount, overlay.id());

        surfaces.insert(surface, canvas.id());
        host.core.add_context(surface);
        Ok(Self {
            index,
            canvas,
            overlay,
        })
    }

    /// Unregisters the surface and returns both nodes to their pools.
    ///
    /// # Errors
    ///
    /// Fails if the canvas or div pool is not registered.
    pub fn clean_up<D: Dom>(
        self,
        host: &mut Host<'_, D>,
        surfaces: &mut SurfaceRegistry,
    ) -> Result<()> {
        let surface = self.surface_id();
        host.core.remove_context(surface);
        surfaces.remove(surface);
        host.pools.put(&ElementKind::Canvas, host.dom, self.canvas)?;
        host.pools.put(&ElementKind::Div, host.dom, self.overlay)
    }

    /// Paint-order index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Surface id of the canvas.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        SurfaceId::for_layer(self.index)
    }

    /// The canvas node.
    #[must_use]
    pub fn canvas(&self) -> NodeId {
        self.canvas.id()
    }

    /// The overlay node that native elements attach to.
    #[must_use]
    pub fn overlay(&self) -> NodeId {
        self.overlay.id()
    }
}
