// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindings to the rendering core's JS-facing chassis object.

use alloc::vec::Vec;

use js_sys::{Array, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::prelude::*;

use strata_core::chassis::{Core, CoreLink};
use strata_core::interrupt::InterruptResult;
use strata_core::layer::SurfaceId;

#[wasm_bindgen]
extern "C" {
    /// The core's chassis object, as exported by its own wasm module.
    #[derive(Clone)]
    pub type CoreHandle;

    #[wasm_bindgen(method)]
    fn tick(this: &CoreHandle) -> MemorySlice;
    #[wasm_bindgen(method)]
    fn render(this: &CoreHandle);
    #[wasm_bindgen(method)]
    fn deallocate(this: &CoreHandle, slice: MemorySlice);
    #[wasm_bindgen(method)]
    fn add_context(this: &CoreHandle, id: u32);
    #[wasm_bindgen(method)]
    fn remove_context(this: &CoreHandle, id: u32);
    #[wasm_bindgen(method)]
    fn send_viewport_update(this: &CoreHandle, width: f64, height: f64);
    #[wasm_bindgen(method)]
    fn interrupt(this: &CoreHandle, json: &str, payload: &JsValue) -> JsValue;
    #[wasm_bindgen(method)]
    fn image_loaded(this: &CoreHandle, path: &str) -> bool;
    #[wasm_bindgen(method)]
    fn memory(this: &CoreHandle) -> WebAssembly::Memory;

    /// A span of the core's linear memory holding one patch batch.
    pub type MemorySlice;

    #[wasm_bindgen(method)]
    fn ptr(this: &MemorySlice) -> u32;
    #[wasm_bindgen(method, js_name = len)]
    fn byte_len(this: &MemorySlice) -> u32;
}

/// The core, reached through its JS handle and memory.
///
/// Cheap to clone; clones talk to the same core. Input listeners hold clones
/// so they can deliver interrupts without going through the frame loop.
#[derive(Clone)]
pub struct JsCore {
    handle: CoreHandle,
    memory: WebAssembly::Memory,
}

impl JsCore {
    /// Wraps a core handle and the memory its batches live in.
    #[must_use]
    pub fn new(handle: CoreHandle, memory: WebAssembly::Memory) -> Self {
        Self { handle, memory }
    }

    /// Wraps a core handle, taking the memory from its `memory()` accessor.
    #[must_use]
    pub fn from_handle(handle: CoreHandle) -> Self {
        let memory = handle.memory();
        Self { handle, memory }
    }

    fn copy_out(&self, slice: &MemorySlice) -> Vec<u8> {
        let view = Uint8Array::new_with_byte_offset_and_length(
            &self.memory.buffer(),
            slice.ptr(),
            slice.byte_len(),
        );
        view.to_vec()
    }
}

impl core::fmt::Debug for JsCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsCore").finish_non_exhaustive()
    }
}

/// A batch copied out of core memory. The span stays allocated in the core
/// until the batch is deallocated.
pub struct WebBatch {
    slice: MemorySlice,
    bytes: Vec<u8>,
}

impl AsRef<[u8]> for WebBatch {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl core::fmt::Debug for WebBatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebBatch")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl CoreLink for JsCore {
    fn add_context(&mut self, surface: SurfaceId) {
        self.handle.add_context(surface.0);
    }

    fn remove_context(&mut self, surface: SurfaceId) {
        self.handle.remove_context(surface.0);
    }

    fn send_viewport_update(&mut self, width: f64, height: f64) {
        self.handle.send_viewport_update(width, height);
    }

    fn interrupt(&mut self, json: &str, payload: Option<&[u8]>) -> InterruptResult {
        let payload: JsValue = match payload {
            Some(bytes) => Uint8Array::from(bytes).into(),
            None => Array::new().into(),
        };
        let result = self.handle.interrupt(json, &payload);
        let prevent_default = Reflect::get(&result, &JsValue::from_str("prevent_default"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        InterruptResult { prevent_default }
    }

    fn image_loaded(&self, path: &str) -> bool {
        self.handle.image_loaded(path)
    }
}

impl Core for JsCore {
    type Batch = WebBatch;

    fn tick(&mut self) -> WebBatch {
        let slice = self.handle.tick();
        let bytes = self.copy_out(&slice);
        WebBatch { slice, bytes }
    }

    fn render(&mut self) {
        self.handle.render();
    }

    fn deallocate(&mut self, batch: WebBatch) {
        self.handle.deallocate(batch.slice);
    }
}
