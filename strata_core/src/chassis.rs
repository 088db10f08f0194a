// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The core collaborator contract and the frame driver.
//!
//! The rendering core is an external collaborator: it produces patch batches
//! and consumes interrupts. [`CoreLink`] is the part of its API the chassis
//! calls while patching (surface registration, interrupts, the image cache);
//! [`Core`] adds the per-frame calls.
//!
//! [`Chassis`] is the one context object threaded through the render loop.
//! A host calls [`Chassis::frame`] once per animation frame:
//!
//! ```rust,ignore
//! fn on_animation_frame(now_ms: f64) {
//!     let viewport = Size::new(window.inner_width(), window.inner_height());
//!     match chassis.frame(&mut dom, now_ms, window.device_pixel_ratio(), viewport) {
//!         Ok(_) => request_animation_frame(on_animation_frame),
//!         Err(e) => log::error!("frame aborted: {e}"),
//!     }
//! }
//! ```

use core::fmt;

use kurbo::{Size, Vec2};

use crate::config::ChassisConfig;
use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::interrupt::{InterruptResult, NativeInterrupt, ScrollArgs};
use crate::layer::SurfaceId;
use crate::native::NativeElementPool;
use crate::patch::decode_batch;

/// Calls into the core that patching needs.
///
/// Object-safe, so patching code can hold a `&mut dyn CoreLink` without
/// knowing the core's batch type.
pub trait CoreLink {
    /// Registers a drawing surface for painting.
    fn add_context(&mut self, surface: SurfaceId);
    /// Unregisters a drawing surface.
    fn remove_context(&mut self, surface: SurfaceId);
    /// Reports the viewport size in CSS pixels.
    fn send_viewport_update(&mut self, width: f64, height: f64);
    /// Delivers one JSON-encoded interrupt, with an optional binary payload.
    fn interrupt(&mut self, json: &str, payload: Option<&[u8]>) -> InterruptResult;
    /// Whether the core already holds the image at `path`.
    fn image_loaded(&self, path: &str) -> bool;

    /// Encodes and delivers `interrupt`.
    ///
    /// # Errors
    ///
    /// Fails if the interrupt cannot be encoded.
    fn send(
        &mut self,
        interrupt: &NativeInterrupt,
        payload: Option<&[u8]>,
    ) -> Result<InterruptResult> {
        let json = interrupt.to_json()?;
        Ok(self.interrupt(&json, payload))
    }
}

/// The rendering core.
pub trait Core: CoreLink {
    /// A patch batch: UTF-8 JSON bytes, valid until deallocated.
    type Batch: AsRef<[u8]>;

    /// Advances the core one frame and returns the resulting patches.
    fn tick(&mut self) -> Self::Batch;
    /// Paints every registered surface.
    fn render(&mut self);
    /// Releases a batch returned by [`tick`](Self::tick).
    fn deallocate(&mut self, batch: Self::Batch);
}

/// What one [`Chassis::frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// This was the first frame that reached the core.
    pub first_frame: bool,
    /// Patches applied.
    pub patches: usize,
    /// Scroll interrupts sent.
    pub scrolled: usize,
}

/// The chassis: native elements, layers and the core, driven frame by frame.
pub struct Chassis<D: Dom, C: Core> {
    native: NativeElementPool<D>,
    core: C,
    config: ChassisConfig,
    initialized: bool,
}

impl<D: Dom, C: Core + fmt::Debug> fmt::Debug for Chassis<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chassis")
            .field("native", &self.native)
            .field("core", &self.core)
            .field("config", &self.config)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<D: Dom, C: Core> Chassis<D, C> {
    /// Mounts the chassis into `mount`, creating the base layer.
    ///
    /// # Errors
    ///
    /// Fails if the base layer cannot be built.
    pub fn new(dom: &mut D, mut core: C, mount: NodeId, config: ChassisConfig) -> Result<Self> {
        let native = NativeElementPool::attach(dom, &mut core, mount, config)?;
        log::debug!("chassis mounted at {mount:?}");
        Ok(Self {
            native,
            core,
            config,
            initialized: false,
        })
    }

    /// The native element façade.
    #[must_use]
    pub fn native(&self) -> &NativeElementPool<D> {
        &self.native
    }

    /// The core.
    #[must_use]
    pub fn core(&self) -> &C {
        &self.core
    }

    /// The core, mutably.
    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    /// The configuration the chassis was built with.
    #[must_use]
    pub fn config(&self) -> &ChassisConfig {
        &self.config
    }

    /// Whether a frame has reached the core yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs one frame.
    ///
    /// In order: report scroll movement, clear (and if needed resize) the
    /// drawing surfaces, tick the core, decode and apply its batch, paint,
    /// and release the batch. The viewport size is reported before the
    /// first batch is applied.
    ///
    /// # Errors
    ///
    /// Any error decoding or applying the batch. The batch is released and
    /// nothing is painted; the caller should stop the loop.
    pub fn frame(
        &mut self,
        dom: &mut D,
        now_ms: f64,
        device_pixel_ratio: f64,
        viewport: Size,
    ) -> Result<FrameReport> {
        let mut report = FrameReport {
            first_frame: !self.initialized,
            ..FrameReport::default()
        };
        for (id, delta) in self.native.scroll_deltas(now_ms) {
            if delta == Vec2::ZERO {
                continue;
            }
            log::trace!("scroller {id} moved by {delta:?}");
            let scroll = NativeInterrupt::Scroll(ScrollArgs {
                delta_x: delta.x,
                delta_y: delta.y,
            });
            self.core.send(&scroll, None)?;
            report.scrolled += 1;
        }

        self.native.clear_surfaces(dom, device_pixel_ratio);

        let batch = self.core.tick();
        let applied = self.apply_batch(dom, batch.as_ref(), viewport);
        if applied.is_ok() {
            self.core.render();
        }
        self.core.deallocate(batch);
        report.patches = applied?;
        Ok(report)
    }

    fn apply_batch(&mut self, dom: &mut D, bytes: &[u8], viewport: Size) -> Result<usize> {
        let patches = decode_batch(bytes)?;
        if !self.initialized {
            self.core
                .send_viewport_update(viewport.width, viewport.height);
            self.initialized = true;
        }
        let count = patches.len();
        for patch in patches {
            self.native.apply(dom, &mut self.core, patch)?;
        }
        Ok(count)
    }

    /// Reports a new viewport size.
    pub fn resize(&mut self, viewport: Size) {
        self.core
            .send_viewport_update(viewport.width, viewport.height);
    }

    /// Sends a host interrupt to the core.
    ///
    /// # Errors
    ///
    /// Fails if the interrupt cannot be encoded.
    pub fn interrupt(
        &mut self,
        interrupt: &NativeInterrupt,
        payload: Option<&[u8]>,
    ) -> Result<InterruptResult> {
        self.core.send(interrupt, payload)
    }
}
