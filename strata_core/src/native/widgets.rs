// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-widget subtree construction and updates.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString as _;
use alloc::vec::Vec;
use core::cell::RefCell;

use super::style::{self, px, set_color, set_px};
use super::{Ctx, NativeKind, NativeNode, ScrollRegion};
use crate::dom::{Dom, ElementKind, FormProperty, NodeId, OwnedNode};
use crate::error::Result;
use crate::interrupt::InputBinding;
use crate::markdown;
use crate::patch::{
    ButtonPatch, CheckboxPatch, DropdownPatch, Geometry, RadioSetPatch, ScrollerPatch,
    SliderPatch, TextPatch, TextboxPatch,
};
use crate::scroll::ScrollManager;

/// Builds the subtree below `node.leaf` and binds its inputs.
pub(super) fn build<D: Dom>(cx: &mut Ctx<'_, D>, node: &mut NativeNode, id: u32) -> Result<()> {
    let leaf = node.leaf.id();
    match node.kind {
        NativeKind::Text => {
            let text = child(cx, node, leaf, ElementKind::Div)?;
            cx.dom().bind_input(text, id, InputBinding::TextInput);
        }
        NativeKind::Button => {
            let button = child(cx, node, leaf, ElementKind::Button)?;
            let container = child(cx, node, button, ElementKind::Div)?;
            let text = child(cx, node, container, ElementKind::Div)?;
            let dom = cx.dom();
            dom.set_attribute(button, "class", "button-styles");
            dom.set_attribute(container, "class", "button-text-container");
            dom.set_style(text, "margin", "0");
            dom.bind_input(button, id, InputBinding::ButtonClick);
        }
        NativeKind::Checkbox => {
            let input = child(cx, node, leaf, ElementKind::Input)?;
            let dom = cx.dom();
            dom.set_form_property(input, FormProperty::InputType("checkbox"));
            dom.set_attribute(input, "class", "checkbox-styles");
            dom.set_style(input, "margin", "0");
            dom.bind_input(input, id, InputBinding::CheckboxToggle);
        }
        NativeKind::Textbox => {
            let input = child(cx, node, leaf, ElementKind::Input)?;
            let dom = cx.dom();
            dom.set_form_property(input, FormProperty::InputType("text"));
            dom.set_style(input, "margin", "0");
            dom.set_style(input, "padding", "0");
            dom.set_style(input, "padding-inline", "5px 5px");
            dom.set_style(input, "padding-block", "0");
            dom.set_style(input, "border-width", "0");
            dom.bind_input(input, id, InputBinding::TextboxInput);
            dom.bind_input(input, id, InputBinding::TextboxChange);
        }
        NativeKind::Slider => {
            let input = child(cx, node, leaf, ElementKind::Input)?;
            let dom = cx.dom();
            dom.set_form_property(input, FormProperty::InputType("range"));
            dom.set_style(input, "padding", "0px");
            dom.set_style(input, "margin", "0px");
            dom.set_style(input, "appearance", "none");
            dom.set_style(input, "display", "block");
            dom.set_style(leaf, "overflow", "visible");
            dom.bind_input(input, id, InputBinding::SliderChange);
        }
        NativeKind::Dropdown => {
            let select = child(cx, node, leaf, ElementKind::Select)?;
            cx.dom().bind_input(select, id, InputBinding::DropdownChange);
        }
        NativeKind::RadioSet => {
            let fieldset = child(cx, node, leaf, ElementKind::Fieldset)?;
            let dom = cx.dom();
            dom.set_style(fieldset, "border-width", "0");
            dom.set_style(fieldset, "margin", "0");
            dom.set_style(fieldset, "padding", "0");
            dom.bind_input(fieldset, id, InputBinding::RadioSetChange);
        }
        NativeKind::Scroller => {
            child(cx, node, leaf, ElementKind::Div)?;
            let manager = Rc::new(RefCell::new(ScrollManager::new(cx.config.scroll)));
            let interval = cx.config.scroll.sample_interval_ms;
            let sampler = cx.dom().sample_scroll(leaf, Rc::clone(&manager), interval);
            node.scroll = Some(ScrollRegion {
                manager,
                _sampler: sampler,
                width: 0.0,
                height: 0.0,
            });
        }
        NativeKind::EventBlocker => {}
    }
    Ok(())
}

/// Takes a node of `kind`, appends it to `parent` and records it as a part.
fn child<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    parent: NodeId,
    kind: ElementKind,
) -> Result<NodeId> {
    let owned = cx.take(kind)?;
    let id = owned.id();
    cx.dom().append_child(parent, id);
    node.parts.push(owned);
    Ok(id)
}

/// Returns the current option nodes to their pools.
fn clear_options<D: Dom>(cx: &mut Ctx<'_, D>, node: &mut NativeNode) -> Result<()> {
    for owned in node.options.drain(..).rev() {
        cx.give(owned)?;
    }
    Ok(())
}

fn take_option<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    parent: NodeId,
    kind: ElementKind,
) -> Result<NodeId> {
    let owned = cx.take(kind)?;
    let id = owned.id();
    cx.dom().append_child(parent, id);
    if let Some(tab_index) = node.tab_index.filter(|_| kind.is_focusable()) {
        cx.dom().set_attribute(id, "tabindex", &tab_index.to_string());
    }
    node.options.push(owned);
    Ok(id)
}

fn is_auto(size: Option<f64>) -> bool {
    size.is_some_and(|s| s < 0.0)
}

pub(super) fn update_text<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &TextPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let text = node.first_child();
    let geometry = &patch.geometry;

    // A negative size means the text sizes itself and reports back.
    if (is_auto(geometry.size_x) || is_auto(geometry.size_y)) && !node.observed {
        cx.dom().observe_size(leaf);
        node.observed = true;
    }
    let explicit = Geometry {
        size_x: geometry.size_x.filter(|s| *s >= 0.0),
        size_y: geometry.size_y.filter(|s| *s >= 0.0),
        transform: geometry.transform,
    };
    style::apply_geometry(cx.dom(), leaf, leaf, &explicit);
    for (size, property) in [(geometry.size_x, "width"), (geometry.size_y, "height")] {
        if is_auto(size) {
            cx.dom().remove_style(leaf, property);
        }
    }

    if let Some(editable) = patch.editable {
        let dom = cx.dom();
        dom.set_attribute(text, "contenteditable", if editable { "true" } else { "false" });
        if editable {
            dom.set_style(text, "outline", "none");
            dom.set_style(text, "width", "inherit");
            dom.set_style(text, "height", "inherit");
        }
    }

    if let Some(text_style) = &patch.style {
        style::apply_text_style(cx.host.dom, cx.fonts, leaf, text, text_style);
    }

    let mut relink = patch.style_link.is_some();
    if let Some(style_link) = &patch.style_link {
        node.link_style = Some(style_link.clone());
    }
    if let Some(content) = &patch.content {
        let html = markdown::render(content);
        if node.html.as_deref() != Some(html.as_str()) {
            cx.dom().set_inner_html(text, &html);
            node.html = Some(html);
            relink = true;
        }
    }
    if relink && let Some(link_style) = &node.link_style {
        style::apply_link_style(cx.host.dom, cx.fonts, leaf, text, link_style);
    }
    Ok(())
}

pub(super) fn update_button<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &ButtonPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let (Some(button), Some(container), Some(text)) = (node.part(0), node.part(1), node.part(2))
    else {
        return Ok(());
    };
    let dom = &mut *cx.host.dom;
    style::apply_geometry(dom, leaf, button, &patch.geometry);

    if let Some(content) = &patch.content {
        dom.set_inner_html(text, &markdown::render(content));
    }
    // An empty label collapses the button's line box.
    if dom.inner_html(text).is_empty() {
        dom.set_inner_html(text, " ");
    }

    set_color(dom, button, "background", patch.color.as_ref());
    set_color(dom, button, "--hover-color", patch.hover_color.as_ref());
    set_color(dom, button, "border-color", patch.outline_stroke_color.as_ref());
    set_px(dom, button, "border-width", patch.outline_stroke_width);
    set_px(dom, button, "border-radius", patch.border_radius);
    if let Some(text_style) = &patch.style {
        style::apply_text_style(dom, cx.fonts, container, text, text_style);
    }
    Ok(())
}

pub(super) fn update_checkbox<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &CheckboxPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let input = node.first_child();
    let dom = cx.dom();
    style::apply_geometry(dom, leaf, input, &patch.geometry);
    if let Some(checked) = patch.checked {
        dom.set_form_property(input, FormProperty::Checked(checked));
    }
    set_color(dom, input, "background", patch.background.as_ref());
    set_color(dom, input, "--checked-color", patch.background_checked.as_ref());
    set_color(dom, input, "border-color", patch.outline_color.as_ref());
    set_px(dom, input, "border-width", patch.outline_width);
    set_px(dom, input, "border-radius", patch.border_radius);
    Ok(())
}

pub(super) fn update_textbox<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &TextboxPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let input = node.first_child();
    let dom = &mut *cx.host.dom;
    // Inline padding is 5px per side.
    let padded = Geometry {
        size_x: patch.geometry.size_x.map(|w| w - 10.0),
        ..patch.geometry
    };
    style::apply_geometry(dom, leaf, input, &padded);
    if let Some(text_style) = &patch.style {
        style::apply_text_style(dom, cx.fonts, input, input, text_style);
    }
    dom.set_style(input, "border-style", "solid");
    set_color(dom, input, "background", patch.background.as_ref());
    set_color(dom, input, "border-color", patch.stroke_color.as_ref());
    set_px(dom, input, "border-width", patch.stroke_width);
    set_px(dom, input, "border-radius", patch.border_radius);
    if let Some(text) = &patch.text {
        dom.set_form_property(input, FormProperty::Value(text));
    }
    if patch.focus_on_mount == Some(true) {
        dom.focus(input);
    }
    Ok(())
}

pub(super) fn update_slider<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &SliderPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let input = node.first_child();
    let dom = &mut *cx.host.dom;
    style::apply_geometry(dom, leaf, input, &patch.geometry);

    let cache = &mut node.slider;
    let mut write = |slot: &mut Option<f64>,
                     value: Option<f64>,
                     property: fn(f64) -> FormProperty<'static>| {
        if let Some(value) = value
            && *slot != Some(value)
        {
            dom.set_form_property(input, property(value));
            *slot = Some(value);
        }
    };
    // Bounds before value, so the value is not clamped to stale bounds.
    write(&mut cache.min, patch.min, FormProperty::Min);
    write(&mut cache.max, patch.max, FormProperty::Max);
    write(&mut cache.step, patch.step, FormProperty::Step);
    if let Some(value) = patch.value
        && cache.value != Some(value)
    {
        dom.set_form_property(input, FormProperty::Value(&value.to_string()));
        cache.value = Some(value);
    }

    set_color(dom, input, "accent-color", patch.accent.as_ref());
    set_color(dom, input, "background-color", patch.background.as_ref());
    set_px(dom, input, "border-radius", patch.border_radius);
    Ok(())
}

pub(super) fn update_dropdown<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &DropdownPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let select = node.first_child();
    style::apply_geometry(cx.dom(), leaf, select, &patch.geometry);
    if let Some(text_style) = &patch.style {
        style::apply_text_style(cx.host.dom, cx.fonts, select, select, text_style);
    }

    if let Some(options) = &patch.options {
        clear_options(cx, node)?;
        for (index, label) in options.iter().enumerate() {
            let option = take_option(cx, node, select, ElementKind::Option)?;
            let dom = cx.dom();
            dom.set_attribute(option, "value", &index.to_string());
            dom.set_text(option, label);
        }
    }
    if let Some(selected) = patch.selected_id {
        node.selected = Some(selected);
    }
    if (patch.options.is_some() || patch.selected_id.is_some())
        && let Some(selected) = node.selected
    {
        cx.dom()
            .set_form_property(select, FormProperty::SelectedIndex(selected));
    }

    let dom = cx.dom();
    dom.set_style(select, "border-style", "solid");
    set_color(dom, select, "background-color", patch.background.as_ref());
    set_color(dom, select, "border-color", patch.stroke_color.as_ref());
    set_px(dom, select, "border-width", patch.stroke_width);
    set_px(dom, select, "border-radius", patch.border_radius);
    Ok(())
}

/// Radio rows are stored as `div`, `input`, `label` triples.
const RADIO_ROW: usize = 3;

pub(super) fn update_radio_set<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &RadioSetPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let fieldset = node.first_child();
    style::apply_geometry(cx.dom(), leaf, fieldset, &patch.geometry);
    if let Some(text_style) = &patch.style {
        style::apply_text_style(cx.host.dom, cx.fonts, leaf, leaf, text_style);
    }

    if let Some(options) = &patch.options {
        clear_options(cx, node)?;
        let group = format!("radio-{}", patch.id);
        for label_text in options {
            let row = take_option(cx, node, fieldset, ElementKind::Div)?;
            let input = take_option(cx, node, row, ElementKind::Input)?;
            let label = take_option(cx, node, row, ElementKind::Label)?;
            let dom = cx.dom();
            dom.set_style(row, "display", "flex");
            dom.set_style(row, "align-items", "center");
            dom.set_style(row, "margin-bottom", "3px");
            dom.set_form_property(input, FormProperty::InputType("radio"));
            dom.set_attribute(input, "name", &group);
            dom.set_attribute(input, "value", label_text);
            dom.set_attribute(input, "class", "radio-set-style");
            dom.set_text(label, label_text);
        }
    }
    if let Some(selected) = patch.selected_id {
        node.selected = Some(selected);
    }
    if (patch.options.is_some() || patch.selected_id.is_some())
        && let Some(selected) = node.selected
    {
        // Rows are `div`, `input`, `label` triples; the input is second.
        if let Some(input) = usize::try_from(selected)
            .ok()
            .and_then(|index| index.checked_mul(RADIO_ROW))
            .and_then(|row| node.options.get(1..)?.get(row))
            .map(OwnedNode::id)
        {
            cx.dom().set_form_property(input, FormProperty::Checked(true));
        } else {
            log::warn!("radio selection {selected} out of range");
        }
    }

    let dom = cx.dom();
    set_color(dom, fieldset, "--background-color", patch.background.as_ref());
    set_color(dom, fieldset, "--selected-color", patch.background_checked.as_ref());
    set_color(dom, fieldset, "--border-color", patch.outline_color.as_ref());
    set_px(dom, fieldset, "--border-width", patch.outline_width);
    Ok(())
}

pub(super) fn update_scroller<D: Dom>(
    cx: &mut Ctx<'_, D>,
    node: &mut NativeNode,
    patch: &ScrollerPatch,
) -> Result<()> {
    let leaf = node.leaf.id();
    let pane = node.first_child();
    let dom = &mut *cx.host.dom;
    style::apply_geometry(dom, leaf, leaf, &patch.geometry);

    let (mut width, mut height) = (0.0, 0.0);
    if let Some(region) = node.scroll.as_mut() {
        if let Some(w) = patch.geometry.size_x {
            region.width = w;
        }
        if let Some(h) = patch.geometry.size_y {
            region.height = h;
        }
        (width, height) = (region.width, region.height);
    }

    if let Some(x) = patch.scroll_x {
        dom.set_form_property(leaf, FormProperty::ScrollLeft(x));
    }
    if let Some(y) = patch.scroll_y {
        dom.set_form_property(leaf, FormProperty::ScrollTop(y));
    }
    if let Some(inner) = patch.size_inner_pane_x {
        dom.set_style(leaf, "overflow-x", overflow(inner, width));
        dom.set_style(pane, "width", &px(inner));
    }
    if let Some(inner) = patch.size_inner_pane_y {
        dom.set_style(leaf, "overflow-y", overflow(inner, height));
        dom.set_style(pane, "height", &px(inner));
    }
    Ok(())
}

fn overflow(inner: f64, outer: f64) -> &'static str {
    if inner <= outer { "hidden" } else { "auto" }
}

#[cfg(test)]
pub(super) fn radio_rows(options: &[NodeId]) -> Vec<[NodeId; RADIO_ROW]> {
    options
        .chunks_exact(RADIO_ROW)
        .map(|row| [row[0], row[1], row[2]])
        .collect()
}
