// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The patch stream.
//!
//! Each tick the core hands over a JSON array of patches. Every patch is an
//! object with a single key naming its variant. [`decode_batch`] turns the
//! array into [`Patch`] values once, at the boundary; everything downstream
//! matches on the enum.
//!
//! Entries whose key is not a known variant are skipped so an older chassis
//! keeps working against a newer core. A known variant with a payload that
//! does not fit its schema fails the whole batch.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::text::TextStyle;

/// Placement of a newly created element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct AnyCreatePatch {
    /// Element id, unique among live elements.
    pub id: u32,
    /// Clip container to nest in, if any.
    #[serde(default)]
    pub parent_frame: Option<u32>,
    /// Occlusion layer to attach to.
    pub occlusion_layer_id: u32,
}

/// Moves an element to another occlusion layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct OcclusionPatch {
    /// Element id.
    pub id: u32,
    /// Target layer.
    pub occlusion_layer_id: u32,
    /// Paint order within the layer.
    pub z_index: u32,
}

/// Geometry fields shared by every update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Width in pixels. `-1` on text means "size to content".
    pub size_x: Option<f64>,
    /// Height in pixels. `-1` on text means "size to content".
    pub size_y: Option<f64>,
    /// Placement as `[a, b, c, d, e, f]`.
    pub transform: Option<[f64; 6]>,
}

/// Update for elements that only carry geometry (frames, event blockers).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct GeometryPatch {
    /// Element or container id.
    pub id: u32,
    /// Geometry changes.
    #[serde(flatten)]
    pub geometry: Geometry,
}

/// Update for a text element.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct TextPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Markdown source.
    pub content: Option<String>,
    pub style: Option<TextStyle>,
    /// Style for links in the content.
    pub style_link: Option<TextStyle>,
    pub editable: Option<bool>,
}

/// Update for a button.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct ButtonPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub content: Option<String>,
    pub color: Option<Color>,
    pub hover_color: Option<Color>,
    pub outline_stroke_color: Option<Color>,
    pub outline_stroke_width: Option<f64>,
    pub border_radius: Option<f64>,
    pub style: Option<TextStyle>,
}

/// Update for a checkbox.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct CheckboxPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub checked: Option<bool>,
    pub background: Option<Color>,
    pub background_checked: Option<Color>,
    pub outline_color: Option<Color>,
    pub outline_width: Option<f64>,
    pub border_radius: Option<f64>,
}

/// Update for a single-line text input.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct TextboxPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub text: Option<String>,
    pub background: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub border_radius: Option<f64>,
    pub focus_on_mount: Option<bool>,
    pub style: Option<TextStyle>,
}

/// Update for a range slider.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct SliderPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub value: Option<f64>,
    pub step: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub accent: Option<Color>,
    pub background: Option<Color>,
    pub border_radius: Option<f64>,
}

/// Update for a dropdown.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct DropdownPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub options: Option<Vec<String>>,
    pub selected_id: Option<u32>,
    pub background: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub border_radius: Option<f64>,
    pub style: Option<TextStyle>,
}

/// Update for a radio button group.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct RadioSetPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub options: Option<Vec<String>>,
    pub selected_id: Option<u32>,
    pub background: Option<Color>,
    pub background_checked: Option<Color>,
    pub outline_color: Option<Color>,
    pub outline_width: Option<f64>,
    pub style: Option<TextStyle>,
}

/// Update for a native scroller.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub struct ScrollerPatch {
    pub id: u32,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub size_inner_pane_x: Option<f64>,
    pub size_inner_pane_y: Option<f64>,
    /// Horizontal scroll offset to apply.
    pub scroll_x: Option<f64>,
    /// Vertical scroll offset to apply.
    pub scroll_y: Option<f64>,
}

/// Request to fetch an image for the core.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ImageLoadPatch {
    /// Requesting element.
    pub id: u32,
    /// Asset path.
    #[serde(default)]
    pub path: String,
}

/// One instruction from the core.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "variants are named after the wire tags")]
pub enum Patch {
    OcclusionUpdate(OcclusionPatch),
    TextCreate(AnyCreatePatch),
    TextUpdate(TextPatch),
    TextDelete(u32),
    ButtonCreate(AnyCreatePatch),
    ButtonUpdate(ButtonPatch),
    ButtonDelete(u32),
    CheckboxCreate(AnyCreatePatch),
    CheckboxUpdate(CheckboxPatch),
    CheckboxDelete(u32),
    TextboxCreate(AnyCreatePatch),
    TextboxUpdate(TextboxPatch),
    TextboxDelete(u32),
    SliderCreate(AnyCreatePatch),
    SliderUpdate(SliderPatch),
    SliderDelete(u32),
    DropdownCreate(AnyCreatePatch),
    DropdownUpdate(DropdownPatch),
    DropdownDelete(u32),
    RadioSetCreate(AnyCreatePatch),
    RadioSetUpdate(RadioSetPatch),
    RadioSetDelete(u32),
    ScrollerCreate(AnyCreatePatch),
    ScrollerUpdate(ScrollerPatch),
    ScrollerDelete(u32),
    EventBlockerCreate(AnyCreatePatch),
    EventBlockerUpdate(GeometryPatch),
    EventBlockerDelete(u32),
    FrameCreate(AnyCreatePatch),
    FrameUpdate(GeometryPatch),
    FrameDelete(u32),
    ImageLoad(ImageLoadPatch),
}

/// Wire tags of every [`Patch`] variant.
pub const TAGS: &[&str] = &[
    "OcclusionUpdate",
    "TextCreate",
    "TextUpdate",
    "TextDelete",
    "ButtonCreate",
    "ButtonUpdate",
    "ButtonDelete",
    "CheckboxCreate",
    "CheckboxUpdate",
    "CheckboxDelete",
    "TextboxCreate",
    "TextboxUpdate",
    "TextboxDelete",
    "SliderCreate",
    "SliderUpdate",
    "SliderDelete",
    "DropdownCreate",
    "DropdownUpdate",
    "DropdownDelete",
    "RadioSetCreate",
    "RadioSetUpdate",
    "RadioSetDelete",
    "ScrollerCreate",
    "ScrollerUpdate",
    "ScrollerDelete",
    "EventBlockerCreate",
    "EventBlockerUpdate",
    "EventBlockerDelete",
    "FrameCreate",
    "FrameUpdate",
    "FrameDelete",
    "ImageLoad",
];

fn decode_error(e: impl core::fmt::Display) -> Error {
    Error::Decode(alloc::format!("{e}"))
}

/// Decodes one tick's worth of patches.
///
/// An empty buffer or a JSON `null` is an empty batch.
///
/// # Errors
///
/// [`Error::Decode`] if the buffer is not a JSON array of single-key
/// objects, or a known patch has an invalid payload.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<Patch>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let entries: Option<Vec<Map<String, Value>>> =
        serde_json::from_slice(bytes).map_err(decode_error)?;
    let entries = entries.unwrap_or_default();

    let mut patches = Vec::with_capacity(entries.len());
    for entry in entries {
        let tag = match entry.keys().next() {
            Some(tag) if entry.len() == 1 => tag,
            _ => {
                return Err(Error::Decode(alloc::format!(
                    "patch objects have exactly one key, found {}",
                    entry.len()
                )));
            }
        };
        if !TAGS.contains(&tag.as_str()) {
            log::debug!("skipping unknown patch {tag}");
            continue;
        }
        patches.push(serde_json::from_value(Value::Object(entry)).map_err(decode_error)?);
    }
    Ok(patches)
}
