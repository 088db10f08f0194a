// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts, text styles and alignment, as carried by text-bearing patches.

use alloc::string::String;

use serde::Deserialize;

use crate::color::Color;
use crate::dom::{FontFaceRequest, FontSource};

/// CSS `font-style`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum FontStyle {
    /// `normal`
    Normal,
    /// `italic`
    Italic,
    /// `oblique`
    Oblique,
}

impl FontStyle {
    /// The CSS keyword.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }
}

/// CSS `font-weight`, from 100 to 900.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[expect(missing_docs, reason = "standard weight names")]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    /// The numeric CSS weight.
    #[must_use]
    pub const fn css(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Normal => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Black => 900,
        }
    }
}

/// A font reference.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the wire schema")]
pub enum Font {
    /// Installed on the user's system; nothing to load.
    System {
        family: String,
        #[serde(default)]
        style: Option<FontStyle>,
        #[serde(default)]
        weight: Option<FontWeight>,
    },
    /// Served from a URL.
    Web {
        family: String,
        url: String,
        #[serde(default)]
        style: Option<FontStyle>,
        #[serde(default)]
        weight: Option<FontWeight>,
    },
    /// Bundled with the application.
    Local {
        family: String,
        path: String,
        #[serde(default)]
        style: Option<FontStyle>,
        #[serde(default)]
        weight: Option<FontWeight>,
    },
}

/// Stylesheet hosts whose URLs point at CSS rather than font files.
const STYLESHEET_HOSTS: &[&str] = &["fonts.googleapis.com/css"];

impl Font {
    /// CSS family name.
    #[must_use]
    pub fn family(&self) -> &str {
        match self {
            Self::System { family, .. } | Self::Web { family, .. } | Self::Local { family, .. } => {
                family
            }
        }
    }

    /// Face style, if specified.
    #[must_use]
    pub fn style(&self) -> Option<FontStyle> {
        match self {
            Self::System { style, .. } | Self::Web { style, .. } | Self::Local { style, .. } => {
                *style
            }
        }
    }

    /// Face weight, if specified.
    #[must_use]
    pub fn weight(&self) -> Option<FontWeight> {
        match self {
            Self::System { weight, .. } | Self::Web { weight, .. } | Self::Local { weight, .. } => {
                *weight
            }
        }
    }

    /// What the host has to load for this font, if anything.
    #[must_use]
    pub fn face_request(&self) -> Option<FontFaceRequest> {
        let source = match self {
            Self::System { .. } => return None,
            Self::Web { url, .. } if STYLESHEET_HOSTS.iter().any(|h| url.contains(h)) => {
                FontSource::Stylesheet(url.clone())
            }
            Self::Web { url, .. } => FontSource::File(url.clone()),
            Self::Local { path, .. } => FontSource::File(path.clone()),
        };
        Some(FontFaceRequest {
            family: self.family().into(),
            source,
            style: self.style(),
            weight: self.weight(),
        })
    }
}

/// Horizontal placement of a text block, and line alignment within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum TextAlignHorizontal {
    Left,
    Center,
    Right,
}

impl TextAlignHorizontal {
    /// `justify-content` on the flex container.
    #[must_use]
    pub const fn justify_content(self) -> &'static str {
        match self {
            Self::Left => "flex-start",
            Self::Center => "center",
            Self::Right => "flex-end",
        }
    }

    /// `text-align` on the text element.
    #[must_use]
    pub const fn text_align(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Vertical placement of a text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum TextAlignVertical {
    Top,
    Center,
    Bottom,
}

impl TextAlignVertical {
    /// `align-items` on the flex container.
    #[must_use]
    pub const fn align_items(self) -> &'static str {
        match self {
            Self::Top => "flex-start",
            Self::Center => "center",
            Self::Bottom => "flex-end",
        }
    }
}

/// Text styling; every field is optional and absent fields leave the
/// element's current styling alone.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font family and face.
    pub font: Option<Font>,
    /// Text color.
    pub fill: Option<Color>,
    /// Size in pixels.
    pub font_size: Option<f64>,
    /// Underline decoration.
    pub underline: Option<bool>,
    /// Alignment of lines within the block.
    pub align_multiline: Option<TextAlignHorizontal>,
    /// Horizontal placement of the block.
    pub align_horizontal: Option<TextAlignHorizontal>,
    /// Vertical placement of the block.
    pub align_vertical: Option<TextAlignVertical>,
}
