// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style writes shared by several widgets.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString as _};

use crate::color::Color;
use crate::dom::{Dom, FontFaceRequest, NodeId};
use crate::patch::Geometry;
use crate::text::{Font, TextStyle};
use crate::transform::css_matrix3d;

/// Font faces already handed to the host.
#[derive(Clone, Debug, Default)]
pub struct FontCache {
    registered: BTreeSet<FontFaceRequest>,
}

impl FontCache {
    /// Makes `font` available, loading it only the first time a face is
    /// seen. Returns whether a load was started.
    pub fn register<D: Dom>(&mut self, dom: &mut D, font: &Font) -> bool {
        let Some(request) = font.face_request() else {
            return false;
        };
        if self.registered.contains(&request) {
            return false;
        }
        log::debug!("loading font face {:?}", request.family);
        dom.load_font(&request);
        self.registered.insert(request);
        true
    }

    /// Number of distinct faces loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no face has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

pub(super) fn px(value: f64) -> String {
    format!("{value}px")
}

pub(super) fn set_px<D: Dom>(dom: &mut D, node: NodeId, property: &str, value: Option<f64>) {
    if let Some(value) = value {
        dom.set_style(node, property, &px(value));
    }
}

pub(super) fn set_color<D: Dom>(dom: &mut D, node: NodeId, property: &str, color: Option<&Color>) {
    if let Some(color) = color {
        dom.set_style(node, property, &color.to_css());
    }
}

/// Sizes `sized` and transforms `leaf`.
pub(super) fn apply_geometry<D: Dom>(
    dom: &mut D,
    leaf: NodeId,
    sized: NodeId,
    geometry: &Geometry,
) {
    set_px(dom, sized, "width", geometry.size_x);
    set_px(dom, sized, "height", geometry.size_y);
    if let Some(coeffs) = geometry.transform {
        dom.set_style(leaf, "transform", &css_matrix3d(coeffs));
    }
}

fn font_family(font: &Font) -> String {
    format!("\"{}\"", font.family())
}

/// Applies a text style split across a layout `container` and the element
/// holding the text.
///
/// Face and block alignment go on the container, color, size, decoration
/// and line alignment on the element.
pub(super) fn apply_text_style<D: Dom>(
    dom: &mut D,
    fonts: &mut FontCache,
    container: NodeId,
    element: NodeId,
    style: &TextStyle,
) {
    if let Some(font) = &style.font {
        fonts.register(dom, font);
        dom.set_style(container, "font-family", &font_family(font));
        if let Some(face) = font.style() {
            dom.set_style(container, "font-style", face.css());
        }
        if let Some(weight) = font.weight() {
            dom.set_style(container, "font-weight", &weight.css().to_string());
        }
    }
    set_color(dom, element, "color", style.fill.as_ref());
    set_px(dom, element, "font-size", style.font_size);
    if let Some(underline) = style.underline {
        dom.set_style(element, "text-decoration", decoration(underline));
    }
    apply_alignment(dom, container, element, style);
}

/// Applies a link style to every `<a>` below `element`.
///
/// Alignment still applies to the block as a whole.
pub(super) fn apply_link_style<D: Dom>(
    dom: &mut D,
    fonts: &mut FontCache,
    container: NodeId,
    element: NodeId,
    style: &TextStyle,
) {
    if let Some(font) = &style.font {
        fonts.register(dom, font);
        dom.set_link_style(element, "font-family", &font_family(font));
        if let Some(face) = font.style() {
            dom.set_link_style(element, "font-style", face.css());
        }
        if let Some(weight) = font.weight() {
            dom.set_link_style(element, "font-weight", &weight.css().to_string());
        }
    }
    if let Some(fill) = &style.fill {
        dom.set_link_style(element, "color", &fill.to_css());
    }
    if let Some(size) = style.font_size {
        dom.set_link_style(element, "font-size", &px(size));
    }
    if let Some(underline) = style.underline {
        dom.set_link_style(element, "text-decoration", decoration(underline));
    }
    apply_alignment(dom, container, element, style);
}

fn apply_alignment<D: Dom>(dom: &mut D, container: NodeId, element: NodeId, style: &TextStyle) {
    if let Some(align) = style.align_horizontal {
        dom.set_style(container, "display", "flex");
        dom.set_style(container, "justify-content", align.justify_content());
    }
    if let Some(align) = style.align_vertical {
        dom.set_style(container, "align-items", align.align_items());
    }
    if let Some(align) = style.align_multiline {
        dom.set_style(element, "text-align", align.text_align());
    }
}

const fn decoration(underline: bool) -> &'static str {
    if underline { "underline" } else { "none" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementKind, MemoryDom};
    use crate::text::{FontWeight, TextAlignHorizontal, TextAlignVertical};

    fn web_font(weight: FontWeight) -> Font {
        Font::Web {
            family: "Inter".into(),
            url: "https://example.com/inter.woff2".into(),
            style: None,
            weight: Some(weight),
        }
    }

    #[test]
    fn font_faces_load_once() {
        let mut dom = MemoryDom::new();
        let mut fonts = FontCache::default();
        assert!(fonts.register(&mut dom, &web_font(FontWeight::Bold)));
        assert!(!fonts.register(&mut dom, &web_font(FontWeight::Bold)));
        assert!(fonts.register(&mut dom, &web_font(FontWeight::Light)), "new face");
        assert_eq!(dom.fonts().len(), 2);
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn text_style_splits_container_and_element() {
        let mut dom = MemoryDom::new();
        let mut fonts = FontCache::default();
        let container = dom.create_element(ElementKind::Div);
        let element = dom.create_element(ElementKind::Div);
        let style = TextStyle {
            font: Some(web_font(FontWeight::Bold)),
            fill: Some(Color::Rgb([1.0, 0.0, 0.0])),
            font_size: Some(12.0),
            underline: Some(false),
            align_multiline: Some(TextAlignHorizontal::Right),
            align_horizontal: Some(TextAlignHorizontal::Center),
            align_vertical: Some(TextAlignVertical::Bottom),
        };
        apply_text_style(&mut dom, &mut fonts, container, element, &style);

        assert_eq!(dom.style(container, "font-family"), Some("\"Inter\""));
        assert_eq!(dom.style(container, "font-weight"), Some("700"));
        assert_eq!(dom.style(container, "display"), Some("flex"));
        assert_eq!(dom.style(container, "justify-content"), Some("center"));
        assert_eq!(dom.style(container, "align-items"), Some("flex-end"));
        assert_eq!(dom.style(element, "color"), Some("rgba(255,0,0,1)"));
        assert_eq!(dom.style(element, "font-size"), Some("12px"));
        assert_eq!(dom.style(element, "text-decoration"), Some("none"));
        assert_eq!(dom.style(element, "text-align"), Some("right"));
        assert_eq!(dom.style(element, "font-family"), None);
    }

    #[test]
    fn geometry_sizes_and_transforms_separately() {
        let mut dom = MemoryDom::new();
        let leaf = dom.create_element(ElementKind::Div);
        let child = dom.create_element(ElementKind::Input);
        let geometry = Geometry {
            size_x: Some(40.0),
            size_y: None,
            transform: Some([1.0, 0.0, 0.0, 1.0, 5.0, 6.0]),
        };
        apply_geometry(&mut dom, leaf, child, &geometry);
        assert_eq!(dom.style(child, "width"), Some("40px"));
        assert_eq!(dom.style(child, "height"), None);
        assert_eq!(dom.style(leaf, "width"), None);
        assert!(dom.style(leaf, "transform").is_some_and(|t| t.starts_with("matrix3d(")));
    }
}
