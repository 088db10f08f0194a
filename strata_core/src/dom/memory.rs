// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Dom`] for tests and headless runs.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use super::{Dom, ElementKind, FontFaceRequest, FormProperty, ImageRequest, NodeId, SamplerHandle};
use crate::events::{native_id, resize_collection};
use crate::interrupt::{InputBinding, InputValue, NativeInterrupt, ResizeRequest};
use crate::layer::SurfaceMetrics;
use crate::scroll::ScrollManager;

/// Form-control state of a [`MemoryDom`] node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    /// `input.type`
    pub input_type: Option<String>,
    /// `input.value`
    pub value: String,
    /// `input.checked`
    pub checked: bool,
    /// `input.min`
    pub min: Option<f64>,
    /// `input.max`
    pub max: Option<f64>,
    /// `input.step`
    pub step: Option<f64>,
    /// `select.selectedIndex`
    pub selected_index: Option<u32>,
    /// `element.scrollLeft`
    pub scroll_left: f64,
    /// `element.scrollTop`
    pub scroll_top: f64,
}

/// Canvas state of a [`MemoryDom`] node.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceState {
    /// Layout and buffer size.
    pub metrics: SurfaceMetrics,
    /// Scale applied to the context by the last resize.
    pub scale: f64,
    /// Number of clears since creation.
    pub clears: u32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            metrics: SurfaceMetrics::default(),
            scale: 1.0,
            clears: 0,
        }
    }
}

#[derive(Debug)]
struct Node {
    kind: ElementKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    link_style: BTreeMap<String, String>,
    inner_html: String,
    form: FormState,
    bindings: Vec<(u32, InputBinding)>,
    surface: SurfaceState,
}

impl Node {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            link_style: BTreeMap::new(),
            inner_html: String::new(),
            form: FormState::default(),
            bindings: Vec::new(),
            surface: SurfaceState::default(),
        }
    }
}

#[derive(Debug)]
struct Sampler {
    node: NodeId,
    region: Rc<RefCell<ScrollManager>>,
    live: Rc<Cell<bool>>,
    interval_ms: u32,
}

/// A document held entirely in memory.
///
/// Records everything the chassis does to it and exposes that state for
/// inspection. User input is simulated with [`fire`](Self::fire).
///
/// # Panics
///
/// Every method taking a [`NodeId`] panics if the id was not issued by this
/// document.
#[derive(Debug, Default)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    root_properties: BTreeMap<String, String>,
    observed: BTreeSet<NodeId>,
    fonts: Vec<FontFaceRequest>,
    images: Vec<ImageRequest>,
    samplers: Vec<Sampler>,
    focused: Option<NodeId>,
}

impl MemoryDom {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("{id:?} was not issued by this MemoryDom"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.0 as usize)
            .unwrap_or_else(|| panic!("{id:?} was not issued by this MemoryDom"))
    }

    fn clear_children(&mut self, id: NodeId) {
        for child in core::mem::take(&mut self.node_mut(id).children) {
            self.node_mut(child).parent = None;
        }
    }

    /// Number of nodes ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node's element kind.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> ElementKind {
        self.node(node).kind
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// An attribute value.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).attributes.get(name).map(String::as_str)
    }

    /// An inline style value.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node).style.get(property).map(String::as_str)
    }

    /// A style applied to the node's links.
    #[must_use]
    pub fn link_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node).link_style.get(property).map(String::as_str)
    }

    /// A custom property on the document root.
    #[must_use]
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties.get(name).map(String::as_str)
    }

    /// Number of custom properties on the document root.
    #[must_use]
    pub fn root_property_count(&self) -> usize {
        self.root_properties.len()
    }

    /// Form-control state.
    #[must_use]
    pub fn form(&self, node: NodeId) -> &FormState {
        &self.node(node).form
    }

    /// Input bindings as `(element id, binding)`.
    #[must_use]
    pub fn bindings(&self, node: NodeId) -> &[(u32, InputBinding)] {
        &self.node(node).bindings
    }

    /// Canvas state.
    #[must_use]
    pub fn surface(&self, node: NodeId) -> &SurfaceState {
        &self.node(node).surface
    }

    /// Simulates a layout change of a canvas.
    pub fn set_surface_client_size(&mut self, node: NodeId, width: f64, height: f64) {
        let metrics = &mut self.node_mut(node).surface.metrics;
        metrics.client_width = width;
        metrics.client_height = height;
    }

    /// The node holding keyboard focus.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether the node's size is observed.
    #[must_use]
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    /// Font faces requested so far, in order.
    #[must_use]
    pub fn fonts(&self) -> &[FontFaceRequest] {
        &self.fonts
    }

    /// Image fetches requested so far, in order.
    #[must_use]
    pub fn images(&self) -> &[ImageRequest] {
        &self.images
    }

    /// Number of scroll samplers that have not been cancelled.
    #[must_use]
    pub fn live_samplers(&self) -> usize {
        self.samplers.iter().filter(|s| s.live.get()).count()
    }

    /// The region a live sampler on `node` feeds.
    #[must_use]
    pub fn scroll_region(&self, node: NodeId) -> Option<Rc<RefCell<ScrollManager>>> {
        self.samplers
            .iter()
            .find(|s| s.node == node && s.live.get())
            .map(|s| Rc::clone(&s.region))
    }

    /// Interval requested by the live sampler on `node`.
    #[must_use]
    pub fn sampler_interval(&self, node: NodeId) -> Option<u32> {
        self.samplers
            .iter()
            .find(|s| s.node == node && s.live.get())
            .map(|s| s.interval_ms)
    }

    /// Simulates the DOM event `event` on `node`, returning the interrupts
    /// its bindings produce.
    pub fn fire(&mut self, node: NodeId, event: &str, value: &InputValue) -> Vec<NativeInterrupt> {
        let interrupts: Vec<_> = self
            .node(node)
            .bindings
            .iter()
            .filter(|(_, binding)| binding.dom_event() == event)
            .filter_map(|&(id, binding)| binding.interrupt(id, value.clone()))
            .collect();
        // Checkbox toggles are reverted; the core answers with the real state.
        if let InputValue::Checked(state) = value
            && self
                .node(node)
                .bindings
                .iter()
                .any(|(_, b)| *b == InputBinding::CheckboxToggle)
        {
            self.node_mut(node).form.checked = !state;
        }
        interrupts
    }

    /// Simulates the size observer reporting new sizes for observed nodes.
    ///
    /// Nodes that are not observed, or carry no element id, are ignored.
    #[must_use]
    pub fn report_sizes(&self, sizes: &[(NodeId, f64, f64)]) -> Option<NativeInterrupt> {
        let requests = sizes
            .iter()
            .filter(|(node, ..)| self.observed.contains(node))
            .filter_map(|&(node, width, height)| {
                let id = native_id(self.attribute(node, crate::native::ID_ATTRIBUTE)?)?;
                Some(ResizeRequest { id, width, height })
            })
            .collect();
        resize_collection(requests)
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

impl Dom for MemoryDom {
    fn create_element(&mut self, kind: ElementKind) -> NodeId {
        let id = NodeId(
            u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("node arena full")),
        );
        self.nodes.push(Node::new(kind));
        id
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.node(node).children.len()
    }

    fn reset(&mut self, node: NodeId) {
        self.detach(node);
        self.clear_children(node);
        self.observed.remove(&node);
        if self.focused == Some(node) {
            self.focused = None;
        }
        let kind = self.node(node).kind;
        *self.node_mut(node) = Node::new(kind);
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.node_mut(node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.node_mut(node).attributes.remove(name);
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.node_mut(node)
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        self.node_mut(node).style.remove(property);
    }

    fn set_link_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.node_mut(node)
            .link_style
            .insert(property.to_string(), value.to_string());
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        self.root_properties
            .insert(name.to_string(), value.to_string());
    }

    fn remove_root_property(&mut self, name: &str) {
        self.root_properties.remove(name);
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        self.node_mut(node).inner_html = html.to_string();
    }

    fn inner_html(&self, node: NodeId) -> String {
        self.node(node).inner_html.clone()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        self.node_mut(node).inner_html = escape_text(text);
    }

    fn set_form_property(&mut self, node: NodeId, property: FormProperty<'_>) {
        let form = &mut self.node_mut(node).form;
        match property {
            FormProperty::InputType(t) => form.input_type = Some(t.to_string()),
            FormProperty::Value(v) => form.value = v.to_string(),
            FormProperty::Checked(c) => form.checked = c,
            FormProperty::Min(v) => form.min = Some(v),
            FormProperty::Max(v) => form.max = Some(v),
            FormProperty::Step(v) => form.step = Some(v),
            FormProperty::SelectedIndex(i) => form.selected_index = Some(i),
            FormProperty::ScrollLeft(v) => form.scroll_left = v,
            FormProperty::ScrollTop(v) => form.scroll_top = v,
        }
    }

    fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    fn bind_input(&mut self, node: NodeId, id: u32, binding: InputBinding) {
        self.node_mut(node).bindings.push((id, binding));
    }

    fn observe_size(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    fn unobserve_size(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }

    fn sample_scroll(
        &mut self,
        node: NodeId,
        region: Rc<RefCell<ScrollManager>>,
        interval_ms: u32,
    ) -> SamplerHandle {
        let live = Rc::new(Cell::new(true));
        self.samplers.push(Sampler {
            node,
            region,
            live: Rc::clone(&live),
            interval_ms,
        });
        SamplerHandle::new(move || live.set(false))
    }

    fn surface_metrics(&self, node: NodeId) -> SurfaceMetrics {
        self.node(node).surface.metrics
    }

    fn clear_surface(&mut self, node: NodeId) {
        self.node_mut(node).surface.clears += 1;
    }

    fn resize_surface(&mut self, node: NodeId, width: u32, height: u32, scale: f64) {
        let surface = &mut self.node_mut(node).surface;
        surface.metrics.buffer_width = width;
        surface.metrics.buffer_height = height;
        surface.scale = scale;
    }

    fn load_font(&mut self, request: &FontFaceRequest) {
        self.fonts.push(request.clone());
    }

    fn load_image(&mut self, request: ImageRequest) {
        self.images.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_moves_between_parents() {
        let mut dom = MemoryDom::new();
        let a = dom.create_element(ElementKind::Div);
        let b = dom.create_element(ElementKind::Div);
        let child = dom.create_element(ElementKind::Input);
        dom.append_child(a, child);
        dom.append_child(b, child);
        assert_eq!(dom.children(a), &[] as &[NodeId]);
        assert_eq!(dom.children(b), &[child]);
        assert_eq!(dom.parent(child), Some(b));
    }

    #[test]
    fn reset_restores_empty_state() {
        let mut dom = MemoryDom::new();
        let parent = dom.create_element(ElementKind::Div);
        let node = dom.create_element(ElementKind::Input);
        let child = dom.create_element(ElementKind::Div);
        dom.append_child(parent, node);
        dom.append_child(node, child);
        dom.set_attribute(node, "class", "x");
        dom.set_style(node, "width", "3px");
        dom.set_form_property(node, FormProperty::Checked(true));
        dom.bind_input(node, 1, InputBinding::CheckboxToggle);
        dom.observe_size(node);

        dom.reset(node);
        assert_eq!(dom.parent(node), None);
        assert_eq!(dom.parent(child), None);
        assert_eq!(dom.child_count(node), 0);
        assert_eq!(dom.attribute(node, "class"), None);
        assert_eq!(dom.style(node, "width"), None);
        assert!(!dom.form(node).checked);
        assert!(dom.bindings(node).is_empty());
        assert!(!dom.is_observed(node));
        assert_eq!(dom.kind(node), ElementKind::Input);
    }

    #[test]
    fn set_text_escapes_markup() {
        let mut dom = MemoryDom::new();
        let node = dom.create_element(ElementKind::Div);
        dom.set_text(node, "a < b");
        assert_eq!(dom.inner_html(node), "a &lt; b");
    }

    #[test]
    fn checkbox_toggle_reverts_dom_state() {
        let mut dom = MemoryDom::new();
        let node = dom.create_element(ElementKind::Input);
        dom.bind_input(node, 5, InputBinding::CheckboxToggle);
        let events = dom.fire(node, "change", &InputValue::Checked(true));
        assert_eq!(events, [NativeInterrupt::FormCheckboxToggle { id: 5, state: true }]);
        assert!(!dom.form(node).checked);
        assert!(dom.fire(node, "click", &InputValue::None).is_empty());
    }

    #[test]
    fn dropping_sampler_handle_cancels() {
        let mut dom = MemoryDom::new();
        let node = dom.create_element(ElementKind::Div);
        let region = Rc::new(RefCell::new(ScrollManager::default()));
        let handle = dom.sample_scroll(node, region, 0);
        assert_eq!(dom.live_samplers(), 1);
        assert!(dom.scroll_region(node).is_some());
        drop(handle);
        assert_eq!(dom.live_samplers(), 0);
        assert!(dom.scroll_region(node).is_none());
    }
}
