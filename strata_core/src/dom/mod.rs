// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host DOM seam.
//!
//! Everything the chassis does to the page goes through [`Dom`]. Nodes live
//! in a host-owned arena and are addressed by [`NodeId`], an index handle.
//! Pools hand nodes out as [`OwnedNode`], which is neither `Copy` nor
//! `Clone`: returning it to its pool moves it, so the previous owner cannot
//! keep using it.
//!
//! `strata_backend_web` implements [`Dom`] on top of `web-sys`; [`MemoryDom`]
//! implements it in memory for tests and headless runs.

mod memory;

pub use memory::{FormState, MemoryDom, SurfaceState};

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::interrupt::InputBinding;
use crate::layer::SurfaceMetrics;
use crate::pool::ObjectManager;
use crate::retry::Backoff;
use crate::scroll::ScrollManager;
use crate::text::{FontStyle, FontWeight};

/// Index of a node in the host's node arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Wraps a raw arena index. Hosts use this when allocating nodes.
    #[inline]
    #[must_use]
    pub const fn from_index(idx: u32) -> Self {
        Self(idx)
    }

    /// Returns the raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The element types the chassis creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// `<div>`
    Div,
    /// `<canvas>`
    Canvas,
    /// `<input>`
    Input,
    /// `<select>`
    Select,
    /// `<option>`
    Option,
    /// `<button>`
    Button,
    /// `<fieldset>`
    Fieldset,
    /// `<label>`
    Label,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Div,
        Self::Canvas,
        Self::Input,
        Self::Select,
        Self::Option,
        Self::Button,
        Self::Fieldset,
        Self::Label,
    ];

    /// The HTML tag name.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Canvas => "canvas",
            Self::Input => "input",
            Self::Select => "select",
            Self::Option => "option",
            Self::Button => "button",
            Self::Fieldset => "fieldset",
            Self::Label => "label",
        }
    }

    /// Whether elements of this kind take keyboard focus.
    #[must_use]
    pub const fn is_focusable(self) -> bool {
        matches!(self, Self::Input | Self::Select | Self::Button)
    }
}

/// A pooled node on loan to its owner.
///
/// Obtained from [`NodePools::get`](ObjectManager::get) and given back with
/// [`NodePools::put`](ObjectManager::put); both sides move the value.
#[derive(Debug, PartialEq, Eq)]
pub struct OwnedNode {
    id: NodeId,
    kind: ElementKind,
}

impl OwnedNode {
    pub(crate) const fn new(id: NodeId, kind: ElementKind) -> Self {
        Self { id, kind }
    }

    /// The node's handle, for passing to [`Dom`] methods.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The element kind, which is also the node's pool tag.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }
}

/// Node pools for host `D`, one per [`ElementKind`].
pub type NodePools<D> = ObjectManager<ElementKind, OwnedNode, D>;

/// Builds a [`NodePools`] with every [`ElementKind`] registered.
///
/// Fresh nodes come from [`Dom::create_element`]; released nodes are passed
/// through [`Dom::reset`].
#[must_use]
pub fn node_pools<D: Dom>() -> NodePools<D> {
    let mut pools = NodePools::new();
    for kind in ElementKind::ALL {
        pools.register(
            kind,
            move |dom: &mut D| OwnedNode::new(dom.create_element(kind), kind),
            |dom: &mut D, node: &mut OwnedNode| dom.reset(node.id()),
        );
    }
    log::debug!("registered {} node pools", ElementKind::ALL.len());
    pools
}

/// A form-control property write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormProperty<'a> {
    /// `input.type`
    InputType(&'a str),
    /// `input.value`. Hosts keep the caret in place (clamped to the new
    /// length) when the element has focus.
    Value(&'a str),
    /// `input.checked`
    Checked(bool),
    /// `input.min`
    Min(f64),
    /// `input.max`
    Max(f64),
    /// `input.step`
    Step(f64),
    /// `select.selectedIndex`
    SelectedIndex(u32),
    /// `element.scrollLeft`
    ScrollLeft(f64),
    /// `element.scrollTop`
    ScrollTop(f64),
}

/// Where a font face is fetched from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FontSource {
    /// A stylesheet declaring `@font-face` rules, injected as-is.
    Stylesheet(String),
    /// A font file loaded through the font loading API.
    File(String),
}

/// A font face the host should make available.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontFaceRequest {
    /// CSS family name.
    pub family: String,
    /// Where to load it from.
    pub source: FontSource,
    /// Face style descriptor.
    pub style: Option<FontStyle>,
    /// Face weight descriptor.
    pub weight: Option<FontWeight>,
}

/// An image the host should fetch, decode and hand to the core.
///
/// On success the host sends
/// [`NativeInterrupt::Image`](crate::interrupt::NativeInterrupt::Image) with
/// the RGBA pixels as payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    /// Id of the element that asked for the image.
    pub id: u32,
    /// Asset path as sent by the core.
    pub path: String,
    /// Retry schedule for the fetch.
    pub retry: Backoff,
}

/// Cancels a host sampling task when dropped.
///
/// Returned by [`Dom::sample_scroll`] and owned by the scroll region that
/// started the sampler.
pub struct SamplerHandle {
    cancel: Option<alloc::boxed::Box<dyn FnOnce()>>,
}

impl SamplerHandle {
    /// Wraps the host's cancellation routine.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(alloc::boxed::Box::new(cancel)),
        }
    }

    /// Stops the sampler now.
    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for SamplerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Operations the chassis performs on the host document.
///
/// Implementations own the actual nodes; [`NodeId`]s are only meaningful to
/// the host that issued them. Methods taking a `NodeId` may panic if it was
/// not issued by this host.
pub trait Dom: 'static {
    // -- Tree ---------------------------------------------------------------

    /// Creates a detached element.
    fn create_element(&mut self, kind: ElementKind) -> NodeId;
    /// Appends `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    /// Detaches `node` from its parent, if any.
    fn detach(&mut self, node: NodeId);
    /// The node's parent, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Number of child nodes.
    fn child_count(&self, node: NodeId) -> usize;
    /// Restores the canonical empty state for reuse: detached, no children,
    /// attributes, inline style, content, form state or input bindings, and
    /// no size observation.
    fn reset(&mut self, node: NodeId);

    // -- Attributes and style -----------------------------------------------

    /// Sets an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    /// Removes an attribute.
    fn remove_attribute(&mut self, node: NodeId, name: &str);
    /// Sets an inline style property (including custom properties).
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    /// Removes an inline style property.
    fn remove_style(&mut self, node: NodeId, property: &str);
    /// Sets an inline style property on every `<a>` below `node`.
    fn set_link_style(&mut self, node: NodeId, property: &str, value: &str);
    /// Sets a custom property on the document root.
    fn set_root_property(&mut self, name: &str, value: &str);
    /// Removes a custom property from the document root.
    fn remove_root_property(&mut self, name: &str);

    // -- Content ------------------------------------------------------------

    /// Replaces the node's children with parsed HTML.
    fn set_inner_html(&mut self, node: NodeId, html: &str);
    /// The node's current serialized HTML content.
    fn inner_html(&self, node: NodeId) -> String;
    /// Replaces the node's children with a text node.
    fn set_text(&mut self, node: NodeId, text: &str);

    // -- Form controls ------------------------------------------------------

    /// Writes a form-control property.
    fn set_form_property(&mut self, node: NodeId, property: FormProperty<'_>);
    /// Moves keyboard focus to `node`.
    fn focus(&mut self, node: NodeId);
    /// Forwards user input on `node` to the core as the interrupt described
    /// by `binding`, tagged with element `id`.
    fn bind_input(&mut self, node: NodeId, id: u32, binding: InputBinding);

    // -- Observation --------------------------------------------------------

    /// Reports size changes of `node` to the core as resize requests.
    fn observe_size(&mut self, node: NodeId);
    /// Stops reporting size changes of `node`.
    fn unobserve_size(&mut self, node: NodeId);
    /// Starts sampling the scroll offset of `node` into `region`.
    ///
    /// The host also reports touch start/end on `node` to `region`.
    fn sample_scroll(
        &mut self,
        node: NodeId,
        region: Rc<RefCell<ScrollManager>>,
        interval_ms: u32,
    ) -> SamplerHandle;

    // -- Drawing surfaces ---------------------------------------------------

    /// CSS and backing-buffer size of a canvas.
    fn surface_metrics(&self, node: NodeId) -> SurfaceMetrics;
    /// Clears a canvas.
    fn clear_surface(&mut self, node: NodeId);
    /// Resizes a canvas buffer and scales its context by `scale`.
    fn resize_surface(&mut self, node: NodeId, width: u32, height: u32, scale: f64);

    // -- Assets -------------------------------------------------------------

    /// Registers a font face with the document.
    fn load_font(&mut self, request: &FontFaceRequest);
    /// Starts fetching an image.
    fn load_image(&mut self, request: ImageRequest);
}
