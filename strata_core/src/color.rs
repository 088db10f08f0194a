// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors as sent by the core, and their CSS form.
//!
//! All channels arrive normalized to `0.0..=1.0`. Formatting uses a single
//! rule for every variant: red, green and blue scale to `0..=255`, hue to
//! degrees, saturation and lightness to percentages, and alpha stays
//! normalized.

use alloc::format;
use alloc::string::String;

use serde::Deserialize;

/// A color patch. Decoding any other variant name fails the batch.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub enum Color {
    /// `[r, g, b, a]`
    Rgba([f64; 4]),
    /// `[h, s, l, a]`
    Hsla([f64; 4]),
    /// `[r, g, b]`, opaque.
    Rgb([f64; 3]),
    /// `[h, s, l]`, opaque.
    Hsl([f64; 3]),
}

impl Color {
    /// The CSS color value.
    #[must_use]
    pub fn to_css(&self) -> String {
        match *self {
            Self::Rgba([r, g, b, a]) => rgba(r, g, b, a),
            Self::Rgb([r, g, b]) => rgba(r, g, b, 1.0),
            Self::Hsla([h, s, l, a]) => hsla(h, s, l, a),
            Self::Hsl([h, s, l]) => hsla(h, s, l, 1.0),
        }
    }
}

fn rgba(r: f64, g: f64, b: f64, a: f64) -> String {
    format!("rgba({},{},{},{})", r * 255.0, g * 255.0, b * 255.0, a)
}

fn hsla(h: f64, s: f64, l: f64, a: f64) -> String {
    format!("hsla({},{}%,{}%,{})", h * 360.0, s * 100.0, l * 100.0, a)
}
