// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The native element façade.
//!
//! [`NativeElementPool`] turns patches into DOM. It owns the id registry,
//! the node pools, the occlusion layer stack and the font-face cache. Every
//! native element is a pooled leaf `div` carrying its id, with a small
//! kind-specific subtree below it:
//!
//! | kind          | subtree below the leaf                          |
//! |---------------|-------------------------------------------------|
//! | text          | text `div`                                      |
//! | button        | `button` › text container `div` › text `div`    |
//! | checkbox      | `input[type=checkbox]`                          |
//! | textbox       | `input[type=text]`                              |
//! | slider        | `input[type=range]`                             |
//! | dropdown      | `select` › `option`*                            |
//! | radio set     | `fieldset` › (`div` › `input` + `label`)*       |
//! | scroller      | inner pane `div`                                |
//! | event blocker | nothing                                         |
//!
//! Create builds the subtree and inserts it through the
//! [`OcclusionLayerManager`]. Update writes only the fields present in the
//! patch. Delete returns every node of the subtree to its pool.

mod style;
mod widgets;

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Vec2;

use crate::chassis::CoreLink;
use crate::config::ChassisConfig;
use crate::container::ContainerPatch;
use crate::dom::{
    Dom, ElementKind, ImageRequest, NodeId, NodePools, OwnedNode, SamplerHandle, node_pools,
};
use crate::error::{Error, Result};
use crate::layer::{Host, SurfaceRegistry};
use crate::occlusion::OcclusionLayerManager;
use crate::patch::{AnyCreatePatch, ImageLoadPatch, OcclusionPatch, Patch};
use crate::scroll::ScrollManager;
use crate::text::TextStyle;

pub use style::FontCache;

/// Class on every native leaf.
pub const LEAF_CLASS: &str = "native-leaf";
/// Attribute carrying the element id on every native leaf.
pub const ID_ATTRIBUTE: &str = "data-native-id";

/// Widget kind of a native element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[expect(missing_docs, reason = "named after the widgets")]
pub enum NativeKind {
    Text,
    Button,
    Checkbox,
    Textbox,
    Slider,
    Dropdown,
    RadioSet,
    Scroller,
    EventBlocker,
}

impl NativeKind {
    /// Human-readable name, used in errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Textbox => "textbox",
            Self::Slider => "slider",
            Self::Dropdown => "dropdown",
            Self::RadioSet => "radio set",
            Self::Scroller => "scroller",
            Self::EventBlocker => "event blocker",
        }
    }
}

/// A scroller's prediction state and the sampler feeding it.
struct ScrollRegion {
    manager: Rc<RefCell<ScrollManager>>,
    /// Cancels the sampler when the region is dropped.
    _sampler: SamplerHandle,
    width: f64,
    height: f64,
}

impl fmt::Debug for ScrollRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollRegion")
            .field("mode", &self.manager.borrow().mode())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Last values written to a slider, so unchanged ones are not rewritten.
#[derive(Clone, Copy, Debug, Default)]
struct SliderCache {
    value: Option<f64>,
    step: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

/// One registered native element.
#[derive(Debug)]
struct NativeNode {
    kind: NativeKind,
    leaf: OwnedNode,
    /// Fixed subtree, parents before children. `parts[0]` is the leaf's
    /// first child.
    parts: Vec<OwnedNode>,
    /// Nodes rebuilt when the option list changes.
    options: Vec<OwnedNode>,
    parent_frame: Option<u32>,
    layer: u32,
    observed: bool,
    link_style: Option<TextStyle>,
    /// Last markup written to a text element.
    html: Option<String>,
    /// Selected option, reapplied when the options are rebuilt.
    selected: Option<u32>,
    /// Tab index given to focusable nodes, once the element has a z-index.
    tab_index: Option<i64>,
    scroll: Option<ScrollRegion>,
    slider: SliderCache,
}

impl NativeNode {
    fn part(&self, index: usize) -> Option<NodeId> {
        self.parts.get(index).map(OwnedNode::id)
    }

    fn first_child(&self) -> NodeId {
        self.part(0).unwrap_or(self.leaf.id())
    }
}

/// Borrowed state shared by widget builders and updaters.
pub(crate) struct Ctx<'a, D: Dom> {
    pub(crate) host: Host<'a, D>,
    pub(crate) layers: &'a mut OcclusionLayerManager,
    pub(crate) fonts: &'a mut FontCache,
    pub(crate) config: &'a ChassisConfig,
}

impl<D: Dom> Ctx<'_, D> {
    fn take(&mut self, kind: ElementKind) -> Result<OwnedNode> {
        self.host.pools.get(&kind, self.host.dom)
    }

    fn give(&mut self, node: OwnedNode) -> Result<()> {
        self.host.pools.put(&node.kind(), self.host.dom, node)
    }

    fn dom(&mut self) -> &mut D {
        &mut *self.host.dom
    }
}

/// Registry of live native elements and everything needed to patch them.
pub struct NativeElementPool<D: Dom> {
    pools: NodePools<D>,
    layers: OcclusionLayerManager,
    nodes: BTreeMap<u32, NativeNode>,
    fonts: FontCache,
    config: ChassisConfig,
}

impl<D: Dom> fmt::Debug for NativeElementPool<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeElementPool")
            .field("pools", &self.pools)
            .field("layers", &self.layers)
            .field("nodes", &self.nodes.len())
            .field("fonts", &self.fonts)
            .field("config", &self.config)
            .finish()
    }
}

impl<D: Dom> NativeElementPool<D> {
    /// Takes over `mount`, creating the base occlusion layer in it.
    ///
    /// # Errors
    ///
    /// Fails if the base layer cannot be built.
    pub fn attach(
        dom: &mut D,
        core: &mut dyn CoreLink,
        mount: NodeId,
        config: ChassisConfig,
    ) -> Result<Self> {
        let mut pools = node_pools();
        let layers = OcclusionLayerManager::attach(
            &mut Host {
                dom,
                pools: &mut pools,
                core,
            },
            mount,
        )?;
        Ok(Self {
            pools,
            layers,
            nodes: BTreeMap::new(),
            fonts: FontCache::default(),
            config,
        })
    }

    /// The occlusion layer stack.
    #[must_use]
    pub fn layers(&self) -> &OcclusionLayerManager {
        &self.layers
    }

    /// Drawing surfaces of all layers.
    #[must_use]
    pub fn surfaces(&self) -> &SurfaceRegistry {
        self.layers.surfaces()
    }

    /// Node pools, for inspection.
    #[must_use]
    pub fn pools(&self) -> &NodePools<D> {
        &self.pools
    }

    /// Number of live native elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no native element is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Kind of element `id`, if live.
    #[must_use]
    pub fn kind(&self, id: u32) -> Option<NativeKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    /// Leaf node of element `id`, if live.
    #[must_use]
    pub fn leaf(&self, id: u32) -> Option<NodeId> {
        self.nodes.get(&id).map(|n| n.leaf.id())
    }

    /// The `index`th fixed node below the leaf of element `id`, in the
    /// order listed in the module docs.
    #[must_use]
    pub fn part(&self, id: u32, index: usize) -> Option<NodeId> {
        self.nodes.get(&id)?.part(index)
    }

    /// Option nodes of element `id` (dropdown `option`s, or radio rows as
    /// `div`, `input`, `label` triples).
    #[must_use]
    pub fn options(&self, id: u32) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.options.iter().map(OwnedNode::id).collect())
            .unwrap_or_default()
    }

    /// Occlusion layer of element `id`, if live.
    #[must_use]
    pub fn layer_of(&self, id: u32) -> Option<u32> {
        self.nodes.get(&id).map(|n| n.layer)
    }

    /// Scroll state of scroller `id`.
    #[must_use]
    pub fn scroll_region(&self, id: u32) -> Option<Rc<RefCell<ScrollManager>>> {
        let region = self.nodes.get(&id)?.scroll.as_ref()?;
        Some(Rc::clone(&region.manager))
    }

    /// Clears every drawing surface, and resizes those whose backing buffer
    /// no longer matches their layout size at `device_pixel_ratio`.
    pub fn clear_surfaces(&self, dom: &mut D, device_pixel_ratio: f64) {
        for (_, canvas) in self.surfaces().iter() {
            dom.clear_surface(canvas);
            if let Some((width, height)) = dom
                .surface_metrics(canvas)
                .resize_target(device_pixel_ratio)
            {
                dom.resize_surface(canvas, width, height, device_pixel_ratio);
            }
        }
    }

    /// Pending scroll movement of every scroller, advancing each baseline.
    pub fn scroll_deltas(&mut self, now_ms: f64) -> Vec<(u32, Vec2)> {
        self.nodes
            .iter()
            .filter_map(|(&id, node)| {
                let region = node.scroll.as_ref()?;
                Some((id, region.manager.borrow_mut().scroll_delta(now_ms)))
            })
            .collect()
    }

    /// Applies one patch.
    ///
    /// # Errors
    ///
    /// Any protocol violation: unknown or duplicate ids, kind mismatches,
    /// unknown containers, or removal of a container that is still in use.
    pub fn apply(&mut self, dom: &mut D, core: &mut dyn CoreLink, patch: Patch) -> Result<()> {
        log::trace!("applying {patch:?}");
        let Self {
            pools,
            layers,
            nodes,
            fonts,
            config,
        } = self;
        let mut cx = Ctx {
            host: Host { dom, pools, core },
            layers,
            fonts,
            config,
        };
        let cx = &mut cx;

        match patch {
            Patch::OcclusionUpdate(p) => occlusion_update(cx, nodes, &p),

            Patch::TextCreate(p) => create(cx, nodes, NativeKind::Text, p),
            Patch::TextUpdate(p) => {
                widgets::update_text(cx, lookup(nodes, p.id, NativeKind::Text)?, &p)
            }
            Patch::TextDelete(id) => delete(cx, nodes, NativeKind::Text, id),

            Patch::ButtonCreate(p) => create(cx, nodes, NativeKind::Button, p),
            Patch::ButtonUpdate(p) => {
                widgets::update_button(cx, lookup(nodes, p.id, NativeKind::Button)?, &p)
            }
            Patch::ButtonDelete(id) => delete(cx, nodes, NativeKind::Button, id),

            Patch::CheckboxCreate(p) => create(cx, nodes, NativeKind::Checkbox, p),
            Patch::CheckboxUpdate(p) => {
                widgets::update_checkbox(cx, lookup(nodes, p.id, NativeKind::Checkbox)?, &p)
            }
            Patch::CheckboxDelete(id) => delete(cx, nodes, NativeKind::Checkbox, id),

            Patch::TextboxCreate(p) => create(cx, nodes, NativeKind::Textbox, p),
            Patch::TextboxUpdate(p) => {
                widgets::update_textbox(cx, lookup(nodes, p.id, NativeKind::Textbox)?, &p)
            }
            Patch::TextboxDelete(id) => delete(cx, nodes, NativeKind::Textbox, id),

            Patch::SliderCreate(p) => create(cx, nodes, NativeKind::Slider, p),
            Patch::SliderUpdate(p) => {
                widgets::update_slider(cx, lookup(nodes, p.id, NativeKind::Slider)?, &p)
            }
            Patch::SliderDelete(id) => delete(cx, nodes, NativeKind::Slider, id),

            Patch::DropdownCreate(p) => create(cx, nodes, NativeKind::Dropdown, p),
            Patch::DropdownUpdate(p) => {
                widgets::update_dropdown(cx, lookup(nodes, p.id, NativeKind::Dropdown)?, &p)
            }
            Patch::DropdownDelete(id) => delete(cx, nodes, NativeKind::Dropdown, id),

            Patch::RadioSetCreate(p) => create(cx, nodes, NativeKind::RadioSet, p),
            Patch::RadioSetUpdate(p) => {
                widgets::update_radio_set(cx, lookup(nodes, p.id, NativeKind::RadioSet)?, &p)
            }
            Patch::RadioSetDelete(id) => delete(cx, nodes, NativeKind::RadioSet, id),

            Patch::ScrollerCreate(p) => create(cx, nodes, NativeKind::Scroller, p),
            Patch::ScrollerUpdate(p) => {
                widgets::update_scroller(cx, lookup(nodes, p.id, NativeKind::Scroller)?, &p)
            }
            Patch::ScrollerDelete(id) => delete(cx, nodes, NativeKind::Scroller, id),

            Patch::EventBlockerCreate(p) => create(cx, nodes, NativeKind::EventBlocker, p),
            Patch::EventBlockerUpdate(p) => {
                let node = lookup(nodes, p.id, NativeKind::EventBlocker)?;
                let leaf = node.leaf.id();
                style::apply_geometry(cx.dom(), leaf, leaf, &p.geometry);
                Ok(())
            }
            Patch::EventBlockerDelete(id) => delete(cx, nodes, NativeKind::EventBlocker, id),

            Patch::FrameCreate(p) => cx.layers.add_container(p.id, p.parent_frame),
            Patch::FrameUpdate(p) => {
                let patch = ContainerPatch {
                    width: p.geometry.size_x,
                    height: p.geometry.size_y,
                    transform: p.geometry.transform,
                };
                cx.layers.update_container(cx.host.dom, p.id, &patch)
            }
            Patch::FrameDelete(id) => cx.layers.remove_container(&mut cx.host, id),

            Patch::ImageLoad(p) => {
                image_load(cx, p);
                Ok(())
            }
        }
    }
}

fn lookup(
    nodes: &mut BTreeMap<u32, NativeNode>,
    id: u32,
    kind: NativeKind,
) -> Result<&mut NativeNode> {
    let node = nodes.get_mut(&id).ok_or(Error::UnknownElement(id))?;
    if node.kind != kind {
        return Err(Error::KindMismatch {
            id,
            expected: kind.name(),
            actual: node.kind.name(),
        });
    }
    Ok(node)
}

fn create<D: Dom>(
    cx: &mut Ctx<'_, D>,
    nodes: &mut BTreeMap<u32, NativeNode>,
    kind: NativeKind,
    patch: AnyCreatePatch,
) -> Result<()> {
    if nodes.contains_key(&patch.id) {
        return Err(Error::DuplicateElement(patch.id));
    }
    let leaf = cx.take(ElementKind::Div)?;
    let dom = cx.dom();
    dom.set_attribute(leaf.id(), "class", LEAF_CLASS);
    dom.set_attribute(leaf.id(), ID_ATTRIBUTE, &patch.id.to_string());

    let mut node = NativeNode {
        kind,
        leaf,
        parts: Vec::new(),
        options: Vec::new(),
        parent_frame: patch.parent_frame,
        layer: patch.occlusion_layer_id,
        observed: false,
        link_style: None,
        html: None,
        selected: None,
        tab_index: None,
        scroll: None,
        slider: SliderCache::default(),
    };
    let placed = widgets::build(cx, &mut node, patch.id).and_then(|()| {
        cx.layers.add_element(
            &mut cx.host,
            node.leaf.id(),
            patch.parent_frame,
            patch.occlusion_layer_id,
        )
    });
    if let Err(e) = placed {
        release(cx, node)?;
        return Err(e);
    }
    nodes.insert(patch.id, node);
    Ok(())
}

fn delete<D: Dom>(
    cx: &mut Ctx<'_, D>,
    nodes: &mut BTreeMap<u32, NativeNode>,
    kind: NativeKind,
    id: u32,
) -> Result<()> {
    lookup(nodes, id, kind)?;
    let node = nodes.remove(&id).ok_or(Error::UnknownElement(id))?;
    release(cx, node)
}

/// Returns a node's whole subtree to the pools.
fn release<D: Dom>(cx: &mut Ctx<'_, D>, node: NativeNode) -> Result<()> {
    let NativeNode {
        leaf,
        parts,
        options,
        observed,
        scroll,
        ..
    } = node;
    if observed {
        cx.dom().unobserve_size(leaf.id());
    }
    drop(scroll);
    for owned in options.into_iter().rev().chain(parts.into_iter().rev()) {
        cx.give(owned)?;
    }
    cx.give(leaf)
}

fn occlusion_update<D: Dom>(
    cx: &mut Ctx<'_, D>,
    nodes: &mut BTreeMap<u32, NativeNode>,
    patch: &OcclusionPatch,
) -> Result<()> {
    let node = nodes
        .get_mut(&patch.id)
        .ok_or(Error::UnknownElement(patch.id))?;
    let leaf = node.leaf.id();
    cx.layers.add_element(
        &mut cx.host,
        leaf,
        node.parent_frame,
        patch.occlusion_layer_id,
    )?;
    node.layer = patch.occlusion_layer_id;

    let tab_index = cx.config.tab_index_base - i64::from(patch.z_index);
    node.tab_index = Some(tab_index);
    let tab_index = tab_index.to_string();
    let dom = &mut *cx.host.dom;
    dom.set_style(leaf, "z-index", &patch.z_index.to_string());
    for owned in node.parts.iter().chain(&node.options) {
        if owned.kind().is_focusable() {
            dom.set_attribute(owned.id(), "tabindex", &tab_index);
        }
    }
    Ok(())
}

fn image_load<D: Dom>(cx: &mut Ctx<'_, D>, patch: ImageLoadPatch) {
    if cx.host.core.image_loaded(&patch.path) {
        log::trace!("image {} already loaded", patch.path);
        return;
    }
    let retry = cx.config.image_retry;
    cx.dom().load_image(ImageRequest {
        id: patch.id,
        path: patch.path,
        retry,
    });
}

#[cfg(test)]
mod tests;
