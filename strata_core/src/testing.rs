// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles for the core.

use alloc::collections::{BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use crate::chassis::{Core, CoreLink};
use crate::interrupt::InterruptResult;
use crate::layer::SurfaceId;

/// A [`CoreLink`] that records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingLink {
    pub(crate) added: Vec<SurfaceId>,
    pub(crate) removed: Vec<SurfaceId>,
    pub(crate) viewports: Vec<(f64, f64)>,
    pub(crate) interrupts: Vec<(String, Option<Vec<u8>>)>,
    pub(crate) loaded_images: BTreeSet<String>,
    pub(crate) prevent_default: bool,
}

impl CoreLink for RecordingLink {
    fn add_context(&mut self, surface: SurfaceId) {
        self.added.push(surface);
    }

    fn remove_context(&mut self, surface: SurfaceId) {
        self.removed.push(surface);
    }

    fn send_viewport_update(&mut self, width: f64, height: f64) {
        self.viewports.push((width, height));
    }

    fn interrupt(&mut self, json: &str, payload: Option<&[u8]>) -> InterruptResult {
        self.interrupts.push((json.into(), payload.map(<[u8]>::to_vec)));
        InterruptResult {
            prevent_default: self.prevent_default,
        }
    }

    fn image_loaded(&self, path: &str) -> bool {
        self.loaded_images.contains(path)
    }
}

/// A batch handed out by [`ScriptedCore`]. Not `Clone`, so it can only be
/// deallocated once.
#[derive(Debug)]
pub(crate) struct ScriptedBatch(Vec<u8>);

impl AsRef<[u8]> for ScriptedBatch {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A [`Core`] replaying a fixed list of batches, then empty ones.
#[derive(Debug, Default)]
pub(crate) struct ScriptedCore {
    pub(crate) link: RecordingLink,
    pub(crate) calls: Vec<&'static str>,
    batches: VecDeque<String>,
    ticks: usize,
    deallocations: usize,
}

impl ScriptedCore {
    pub(crate) fn new(batches: &[&str]) -> Self {
        Self {
            batches: batches.iter().map(|b| String::from(*b)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn ticks(&self) -> usize {
        self.ticks
    }

    /// Batches ticked but not yet deallocated.
    pub(crate) fn outstanding(&self) -> usize {
        self.ticks - self.deallocations
    }
}

impl CoreLink for ScriptedCore {
    fn add_context(&mut self, surface: SurfaceId) {
        self.link.add_context(surface);
    }

    fn remove_context(&mut self, surface: SurfaceId) {
        self.link.remove_context(surface);
    }

    fn send_viewport_update(&mut self, width: f64, height: f64) {
        self.calls.push("viewport");
        self.link.send_viewport_update(width, height);
    }

    fn interrupt(&mut self, json: &str, payload: Option<&[u8]>) -> InterruptResult {
        self.link.interrupt(json, payload)
    }

    fn image_loaded(&self, path: &str) -> bool {
        self.link.image_loaded(path)
    }
}

impl Core for ScriptedCore {
    type Batch = ScriptedBatch;

    fn tick(&mut self) -> ScriptedBatch {
        self.calls.push("tick");
        self.ticks += 1;
        let json = self.batches.pop_front().unwrap_or_else(|| String::from("[]"));
        ScriptedBatch(json.into_bytes())
    }

    fn render(&mut self) {
        self.calls.push("render");
    }

    fn deallocate(&mut self, batch: ScriptedBatch) {
        self.calls.push("deallocate");
        self.deallocations += 1;
        drop(batch);
    }
}
