// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for presenting a patch stream as interleaved canvas and DOM
//! layers.
//!
//! `strata_core` is `no_std` (with `alloc`). It holds every piece of the
//! chassis that does not need a browser: object pools, the occlusion layer
//! stack, clip containers, the wire schema, native element patching and
//! scroll prediction. The host DOM is reached through the [`Dom`] trait, so
//! the same logic runs against the real browser (`strata_backend_web`) or the
//! in-memory [`MemoryDom`] used by tests.
//!
//! # Architecture
//!
//! ```text
//!  Core::tick() ──► JSON batch ──► patch::decode_batch ──► Vec<Patch>
//!                                                            │
//!                          ┌─────────────────────────────────┘
//!                          ▼
//!                 NativeElementPool (registry, fonts, scrollers)
//!                          │
//!                          ▼
//!              OcclusionLayerManager (layers + containers)
//!                          │
//!                          ▼
//!            Dom (MemoryDom / WebDom) ◄── ObjectManager (node pools)
//! ```
//!
//! [`Chassis`] drives one frame at a time: scroll deltas, surface upkeep,
//! tick, apply, render, release.
//!
//! # Modules
//!
//! - [`pool`]: generic object pools keyed by tag.
//! - [`dom`]: the host DOM seam, node handles and [`MemoryDom`].
//! - [`layer`]: one canvas/overlay pair and its surface id.
//! - [`container`]: clip frames and their clip polygons.
//! - [`occlusion`]: the layer stack and container materialization.
//! - [`patch`]: the wire schema.
//! - [`native`]: the native element façade.
//! - [`scroll`]: scroll prediction.
//! - [`interrupt`] / [`events`]: upstream events.
//! - [`chassis`]: the core collaborator traits and the frame driver.
//!
//! [`Dom`]: dom::Dom
//! [`MemoryDom`]: dom::MemoryDom
//! [`Chassis`]: chassis::Chassis

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod chassis;
pub mod color;
pub mod config;
pub mod container;
pub mod dom;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod layer;
pub mod markdown;
pub mod native;
pub mod occlusion;
pub mod patch;
pub mod pool;
pub mod retry;
pub mod scroll;
pub mod text;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
