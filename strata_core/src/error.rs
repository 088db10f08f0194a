// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by every fallible chassis operation.
//!
//! All of these indicate an inconsistent patch stream or a programming error
//! upstream; none of them has a local recovery. The frame driver returns them
//! to its caller, which stops the render loop.

use alloc::string::String;

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Protocol and programmer errors raised while applying patches.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `get`/`put` on a pool tag that was never registered.
    #[error("no pool registered for tag {0}")]
    UnregisteredPoolTag(String),
    /// Update, delete or occlusion change for an id with no live element.
    #[error("native element {0} does not exist")]
    UnknownElement(u32),
    /// Create for an id that already has a live element.
    #[error("native element {0} already exists")]
    DuplicateElement(u32),
    /// A patch addressed an element of a different widget kind.
    #[error("native element {id} is a {actual}, not a {expected}")]
    KindMismatch {
        /// Element id.
        id: u32,
        /// Kind the patch was meant for.
        expected: &'static str,
        /// Kind registered under `id`.
        actual: &'static str,
    },
    /// Reference to a clip container that was never created.
    #[error("clip container {0} does not exist")]
    UnknownContainer(u32),
    /// Create for a clip container id that is already registered.
    #[error("clip container {0} already exists")]
    DuplicateContainer(u32),
    /// Removal of a clip container that still has DOM members.
    #[error("clip container {id} still has {members} member node(s)")]
    ContainerInUse {
        /// Container id.
        id: u32,
        /// Number of child nodes found across its instantiations.
        members: usize,
    },
    /// Shrinking the layer stack below a layer that still holds elements.
    #[error("occlusion layer {layer} still holds {members} element(s)")]
    LayerInUse {
        /// Layer index.
        layer: u32,
        /// Number of native nodes found in its overlay and containers.
        members: usize,
    },
    /// A malformed batch, or a known patch with an invalid payload.
    #[error("malformed patch batch: {0}")]
    Decode(String),
    /// An interrupt could not be encoded as JSON.
    #[error("could not encode interrupt: {0}")]
    Serialize(String),
}
