// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The browser implementation of [`Dom`].
//!
//! [`WebDom`] keeps an arena of `HtmlElement`s indexed by [`NodeId`], the
//! same way the in-memory host does, and forwards every operation to
//! `web-sys`. DOM calls that fail are logged and otherwise ignored: the
//! chassis treats the page as best-effort output.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::RefCell;

use js_sys::{Array, Reflect};
use kurbo::Point;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, ResizeObserver, ResizeObserverEntry,
};

use strata_core::chassis::CoreLink as _;
use strata_core::dom::{
    Dom, ElementKind, FontFaceRequest, FormProperty, ImageRequest, NodeId, SamplerHandle,
};
use strata_core::events::{native_id, resize_collection};
use strata_core::interrupt::{InputBinding, InputValue, ResizeRequest};
use strata_core::layer::SurfaceMetrics;
use strata_core::native::ID_ATTRIBUTE;
use strata_core::scroll::ScrollManager;

use crate::assets;
use crate::js_core::JsCore;
use crate::listener::{EventListener, ListenerOptions};
use crate::raf::performance_now;

struct Slot {
    element: HtmlElement,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<EventListener>,
}

type ObserverClosure = Closure<dyn FnMut(Array, ResizeObserver)>;

/// A [`Dom`] backed by the page's document.
pub struct WebDom {
    document: Document,
    nodes: Vec<Slot>,
    core: JsCore,
    observer: Option<(ResizeObserver, ObserverClosure)>,
}

impl core::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebDom")
            .field("nodes", &self.nodes.len())
            .field("observing", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl WebDom {
    /// Creates a host over `document`. Input bound through
    /// [`Dom::bind_input`] and size reports go to `core`.
    #[must_use]
    pub fn new(document: Document, core: JsCore) -> Self {
        let observer = size_observer(core.clone());
        Self {
            document,
            nodes: Vec::new(),
            core,
            observer,
        }
    }

    /// Registers an element that already exists in the page, such as the
    /// mount point, and returns its handle.
    pub fn adopt(&mut self, element: HtmlElement) -> NodeId {
        self.push(element)
    }

    /// The element behind `node`.
    ///
    /// # Panics
    ///
    /// If `node` was not issued by this host.
    #[must_use]
    pub fn element(&self, node: NodeId) -> &HtmlElement {
        &self.slot(node).element
    }

    /// The document this host writes to.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn push(&mut self, element: HtmlElement) -> NodeId {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("node arena holds more than u32::MAX elements"));
        self.nodes.push(Slot {
            element,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        });
        NodeId::from_index(index)
    }

    fn slot(&self, node: NodeId) -> &Slot {
        self.nodes
            .get(node.index() as usize)
            .unwrap_or_else(|| panic!("{node:?} was not issued by this host"))
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        self.nodes
            .get_mut(node.index() as usize)
            .unwrap_or_else(|| panic!("{node:?} was not issued by this host"))
    }

    /// Forgets tracked children after the browser dropped them.
    fn orphan_children(&mut self, node: NodeId) {
        for child in core::mem::take(&mut self.slot_mut(node).children) {
            self.slot_mut(child).parent = None;
        }
    }

    fn input(&self, node: NodeId) -> Option<&HtmlInputElement> {
        self.element(node).dyn_ref::<HtmlInputElement>()
    }

    fn is_focused(&self, node: NodeId) -> bool {
        self.document
            .active_element()
            .is_some_and(|active| {
                AsRef::<JsValue>::as_ref(&active) == AsRef::<JsValue>::as_ref(self.element(node))
            })
    }

    fn context_2d(&self, node: NodeId) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
        let canvas = self.element(node).dyn_ref::<HtmlCanvasElement>()?.clone();
        let context = canvas.get_context("2d").ok().flatten()?;
        Some((canvas, context.unchecked_into()))
    }

    fn set_value(&self, node: NodeId, value: &str) {
        let Some(input) = self.input(node) else {
            return;
        };
        if !self.is_focused(node) {
            input.set_value(value);
            return;
        }
        let caret = input.selection_start().ok().flatten();
        input.set_value(value);
        if let Some(caret) = caret {
            let len = u32::try_from(value.encode_utf16().count()).unwrap_or(u32::MAX);
            let caret = caret.min(len);
            let _ = input.set_selection_range(caret, caret);
        }
    }
}

fn size_observer(core: JsCore) -> Option<(ResizeObserver, ObserverClosure)> {
    let mut core = core;
    let closure: ObserverClosure = Closure::wrap(Box::new(move |entries: Array, _: ResizeObserver| {
        let requests: Vec<ResizeRequest> = entries
            .iter()
            .filter_map(|entry| {
                let entry: ResizeObserverEntry = entry.unchecked_into();
                let id = native_id(&entry.target().get_attribute(ID_ATTRIBUTE)?)?;
                let rect = entry.content_rect();
                Some(ResizeRequest {
                    id,
                    width: rect.width(),
                    height: rect.height(),
                })
            })
            .collect();
        if let Some(interrupt) = resize_collection(requests)
            && let Err(e) = core.send(&interrupt, None)
        {
            log::warn!("could not report sizes: {e}");
        }
    }) as Box<dyn FnMut(Array, ResizeObserver)>);
    match ResizeObserver::new(closure.as_ref().unchecked_ref()) {
        Ok(observer) => Some((observer, closure)),
        Err(e) => {
            log::warn!("ResizeObserver unavailable, content-sized text will not report: {e:?}");
            None
        }
    }
}

/// Reads the value `binding` reports from `element`.
fn read_input(binding: InputBinding, element: &HtmlElement, event: &Event) -> InputValue {
    match binding {
        InputBinding::ButtonClick => InputValue::None,
        InputBinding::CheckboxToggle => element
            .dyn_ref::<HtmlInputElement>()
            .map_or(InputValue::None, |input| InputValue::Checked(input.checked())),
        InputBinding::TextboxInput | InputBinding::TextboxChange => element
            .dyn_ref::<HtmlInputElement>()
            .map_or(InputValue::None, |input| InputValue::Text(input.value())),
        InputBinding::SliderChange => element
            .dyn_ref::<HtmlInputElement>()
            .map_or(InputValue::None, |input| {
                InputValue::Number(input.value_as_number())
            }),
        InputBinding::DropdownChange => element
            .dyn_ref::<HtmlSelectElement>()
            .and_then(|select| u32::try_from(select.selected_index()).ok())
            .map_or(InputValue::None, InputValue::Index),
        InputBinding::RadioSetChange => {
            radio_row(element, event).map_or(InputValue::None, InputValue::Index)
        }
        InputBinding::TextInput => InputValue::Text(element.inner_html()),
    }
}

/// Index of the row holding the radio button that fired `event`.
fn radio_row(fieldset: &HtmlElement, event: &Event) -> Option<u32> {
    let target: web_sys::Element = event.target()?.dyn_into().ok()?;
    let row = target.parent_element()?;
    let rows = fieldset.children();
    let row: &JsValue = row.as_ref();
    (0..rows.length()).find(|&i| rows.item(i).is_some_and(|r| AsRef::<JsValue>::as_ref(&r) == row))
}

fn set_js(target: &JsValue, key: &str, value: &JsValue) {
    if let Err(e) = Reflect::set(target, &JsValue::from_str(key), value) {
        log::warn!("could not set {key}: {e:?}");
    }
}

fn get_f64(target: &JsValue, key: &str) -> f64 {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

impl Dom for WebDom {
    /// # Panics
    ///
    /// If the document refuses to create the element.
    fn create_element(&mut self, kind: ElementKind) -> NodeId {
        let element = self
            .document
            .create_element(kind.tag_name())
            .unwrap_or_else(|e| panic!("could not create <{}>: {e:?}", kind.tag_name()));
        self.push(element.unchecked_into())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Err(e) = self.element(parent).append_child(self.element(child)) {
            log::warn!("could not append {child:?} to {parent:?}: {e:?}");
            return;
        }
        self.slot_mut(parent).children.push(child);
        self.slot_mut(child).parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        self.element(node).remove();
        if let Some(parent) = self.slot_mut(node).parent.take() {
            self.slot_mut(parent).children.retain(|&c| c != node);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.element(node).child_element_count() as usize
    }

    fn reset(&mut self, node: NodeId) {
        self.detach(node);
        if self.is_focused(node) {
            let _ = self.element(node).blur();
        }
        self.unobserve_size(node);
        self.set_inner_html(node, "");
        let slot = self.slot_mut(node);
        slot.listeners.clear();
        let element = slot.element.clone();
        for name in element.get_attribute_names().iter() {
            if let Some(name) = name.as_string() {
                let _ = element.remove_attribute(&name);
            }
        }
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
            input.set_checked(false);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Err(e) = self.element(node).set_attribute(name, value) {
            log::warn!("could not set attribute {name}: {e:?}");
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let _ = self.element(node).remove_attribute(name);
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let _ = self.element(node).style().set_property(property, value);
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        let _ = self.element(node).style().remove_property(property);
    }

    fn set_link_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Ok(links) = self.element(node).query_selector_all("a") else {
            return;
        };
        for i in 0..links.length() {
            if let Some(link) = links.item(i) {
                let link: HtmlElement = link.unchecked_into();
                let _ = link.style().set_property(property, value);
            }
        }
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        if let Some(root) = self.document.document_element() {
            let root: HtmlElement = root.unchecked_into();
            let _ = root.style().set_property(name, value);
        }
    }

    fn remove_root_property(&mut self, name: &str) {
        if let Some(root) = self.document.document_element() {
            let root: HtmlElement = root.unchecked_into();
            let _ = root.style().remove_property(name);
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.orphan_children(node);
        self.element(node).set_inner_html(html);
    }

    fn inner_html(&self, node: NodeId) -> String {
        self.element(node).inner_html()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.orphan_children(node);
        self.element(node).set_text_content(Some(text));
    }

    fn set_form_property(&mut self, node: NodeId, property: FormProperty<'_>) {
        let element = self.element(node);
        match property {
            FormProperty::InputType(kind) => {
                if let Some(input) = self.input(node) {
                    input.set_type(kind);
                }
            }
            FormProperty::Value(value) => self.set_value(node, value),
            FormProperty::Checked(checked) => {
                if let Some(input) = self.input(node) {
                    input.set_checked(checked);
                }
            }
            FormProperty::Min(v) => set_js(element, "min", &JsValue::from_str(&v.to_string())),
            FormProperty::Max(v) => set_js(element, "max", &JsValue::from_str(&v.to_string())),
            FormProperty::Step(v) => set_js(element, "step", &JsValue::from_str(&v.to_string())),
            FormProperty::SelectedIndex(index) => {
                if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                    select.set_selected_index(i32::try_from(index).unwrap_or(-1));
                }
            }
            FormProperty::ScrollLeft(v) => set_js(element, "scrollLeft", &JsValue::from_f64(v)),
            FormProperty::ScrollTop(v) => set_js(element, "scrollTop", &JsValue::from_f64(v)),
        }
    }

    fn focus(&mut self, node: NodeId) {
        if let Err(e) = self.element(node).focus() {
            log::debug!("could not focus {node:?}: {e:?}");
        }
    }

    fn bind_input(&mut self, node: NodeId, id: u32, binding: InputBinding) {
        let element = self.element(node).clone();
        let mut core = self.core.clone();
        let target = element.clone();
        let listener = EventListener::new(
            &element,
            binding.dom_event(),
            ListenerOptions::BUBBLE,
            move |event: Event| {
                let value = read_input(binding, &target, &event);
                let reverted = match (binding, &value) {
                    (InputBinding::CheckboxToggle, InputValue::Checked(state)) => Some(!state),
                    _ => None,
                };
                let Some(interrupt) = binding.interrupt(id, value) else {
                    log::debug!("{binding:?} on element {id} read nothing");
                    return;
                };
                if let Err(e) = core.send(&interrupt, None) {
                    log::warn!("could not forward {binding:?} on element {id}: {e}");
                }
                if let Some(state) = reverted
                    && let Some(input) = target.dyn_ref::<HtmlInputElement>()
                {
                    input.set_checked(state);
                }
            },
        );
        self.slot_mut(node).listeners.push(listener);
    }

    fn observe_size(&mut self, node: NodeId) {
        if let Some((observer, _)) = &self.observer {
            observer.observe(self.element(node));
        }
    }

    fn unobserve_size(&mut self, node: NodeId) {
        if let Some((observer, _)) = &self.observer {
            observer.unobserve(self.element(node));
        }
    }

    fn sample_scroll(
        &mut self,
        node: NodeId,
        region: Rc<RefCell<ScrollManager>>,
        interval_ms: u32,
    ) -> SamplerHandle {
        let element = self.element(node).clone();
        let target: JsValue = element.clone().into();
        let sampled = Rc::clone(&region);
        let tick: Closure<dyn FnMut()> = Closure::wrap(Box::new(move || {
            let offset = Point::new(get_f64(&target, "scrollLeft"), get_f64(&target, "scrollTop"));
            sampled.borrow_mut().sample(performance_now(), offset);
        }) as Box<dyn FnMut()>);

        let window = web_sys::window();
        let interval = window.as_ref().and_then(|window| {
            window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    tick.as_ref().unchecked_ref(),
                    i32::try_from(interval_ms).unwrap_or(i32::MAX),
                )
                .map_err(|e| log::warn!("could not start scroll sampler: {e:?}"))
                .ok()
        });

        let touching = Rc::clone(&region);
        let released = region;
        let touch_start = EventListener::new(
            &element,
            "touchstart",
            ListenerOptions::CAPTURE_PASSIVE,
            move |_| touching.borrow_mut().set_touching(true),
        );
        let touch_end = EventListener::new(
            &element,
            "touchend",
            ListenerOptions::CAPTURE_PASSIVE,
            move |_| released.borrow_mut().set_touching(false),
        );

        SamplerHandle::new(move || {
            if let (Some(window), Some(handle)) = (window, interval) {
                window.clear_interval_with_handle(handle);
            }
            drop(tick);
            drop(touch_start);
            drop(touch_end);
        })
    }

    fn surface_metrics(&self, node: NodeId) -> SurfaceMetrics {
        let element = self.element(node);
        let (buffer_width, buffer_height) = element
            .dyn_ref::<HtmlCanvasElement>()
            .map_or((0, 0), |canvas| (canvas.width(), canvas.height()));
        SurfaceMetrics {
            client_width: f64::from(element.client_width()),
            client_height: f64::from(element.client_height()),
            buffer_width,
            buffer_height,
        }
    }

    fn clear_surface(&mut self, node: NodeId) {
        let Some((canvas, context)) = self.context_2d(node) else {
            return;
        };
        context.save();
        let _ = context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        context.clear_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
        context.restore();
    }

    fn resize_surface(&mut self, node: NodeId, width: u32, height: u32, scale: f64) {
        let Some((canvas, context)) = self.context_2d(node) else {
            return;
        };
        canvas.set_width(width);
        canvas.set_height(height);
        if let Err(e) = context.scale(scale, scale) {
            log::warn!("could not scale {node:?}: {e:?}");
        }
        log::trace!("resized {node:?} to {width}x{height} at {scale}x");
    }

    fn load_font(&mut self, request: &FontFaceRequest) {
        assets::load_font(&self.document, request);
    }

    fn load_image(&mut self, request: ImageRequest) {
        log::debug!("fetching image {} for element {}", request.path, request.id);
        assets::load_image(self.core.clone(), request);
    }
}

impl Drop for WebDom {
    fn drop(&mut self) {
        if let Some((observer, _)) = &self.observer {
            observer.disconnect();
        }
    }
}

