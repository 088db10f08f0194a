// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine patches expanded to CSS 3-D matrices.
//!
//! The core sends 2-D affines as six column-major coefficients
//! `[a, b, c, d, e, f]` (`x' = a·x + c·y + e`, `y' = b·x + d·y + f`), the same
//! layout as [`kurbo::Affine`]. CSS wants a `matrix3d()` with sixteen
//! column-major values; the 2-D affine occupies the x/y rows and columns and
//! leaves z untouched.

use alloc::format;
use alloc::string::String;

use kurbo::Affine;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Expands six affine coefficients into
    /// `[a,b,0,0, c,d,0,0, 0,0,1,0, e,f,0,1]`.
    #[inline]
    #[must_use]
    pub const fn from_coeffs([a, b, c, d, e, f]: [f64; 6]) -> Self {
        Self::from_cols(
            [a, b, 0.0, 0.0],
            [c, d, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [e, f, 0.0, 1.0],
        )
    }

    /// Expands a [`kurbo::Affine`].
    #[inline]
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        Self::from_coeffs(affine.as_coeffs())
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// The sixteen values in column-major order.
    #[must_use]
    pub fn to_cols_array(self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(col);
        }
        out
    }

    /// The CSS `matrix3d(...)` value.
    #[must_use]
    pub fn to_css(self) -> String {
        let [c0, c1, c2, c3] = self.cols;
        format!(
            "matrix3d({},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{})",
            c0[0],
            c0[1],
            c0[2],
            c0[3],
            c1[0],
            c1[1],
            c1[2],
            c1[3],
            c2[0],
            c2[1],
            c2[2],
            c2[3],
            c3[0],
            c3[1],
            c3[2],
            c3[3],
        )
    }
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for Transform3d {
    fn from(affine: Affine) -> Self {
        Self::from_affine(affine)
    }
}

/// CSS `transform` value for six affine coefficients.
#[must_use]
pub fn css_matrix3d(coeffs: [f64; 6]) -> String {
    Transform3d::from_coeffs(coeffs).to_css()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_coeffs_expand_to_identity() {
        let xf = Transform3d::from_coeffs([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(xf, Transform3d::IDENTITY);
        assert_eq!(
            xf.to_cols_array(),
            [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn coefficients_land_in_their_columns() {
        let xf = Transform3d::from_coeffs([2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(xf.col(0), [2.0, 3.0, 0.0, 0.0]);
        assert_eq!(xf.col(1), [4.0, 5.0, 0.0, 0.0]);
        assert_eq!(xf.col(2), [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(xf.col(3), [6.0, 7.0, 0.0, 1.0]);
    }

    #[test]
    fn expansion_is_deterministic() {
        let coeffs = [0.5, -0.25, 0.25, 0.5, 10.0, 20.0];
        assert_eq!(css_matrix3d(coeffs), css_matrix3d(coeffs));
    }

    #[test]
    fn css_translation() {
        let css = Transform3d::from_affine(Affine::translate((10.0, 20.5))).to_css();
        assert_eq!(css, "matrix3d(1,0,0,0,0,1,0,0,0,0,1,0,10,20.5,0,1)");
    }
}
