// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for strata.
//!
//! This crate runs a [`Chassis`] in the browser:
//!
//! - [`WebDom`]: the [`Dom`] host over `web-sys`
//! - [`JsCore`]: the rendering core, reached through its JS handle
//! - [`RafLoop`]: the `requestAnimationFrame` frame source
//! - [`mount`]: wires the three together with window input and resizing
//!
//! From JavaScript, call the exported `start` with a mount selector and the
//! core's chassis object:
//!
//! ```js
//! import init, { start } from "./strata_backend_web.js";
//! await init();
//! const handle = start("#app", core.chassis);
//! // later: handle.stop()
//! ```
//!
//! [`Dom`]: strata_core::dom::Dom

#![no_std]

extern crate alloc;

mod assets;
mod dom;
mod input;
mod js_core;
mod listener;
mod raf;

pub use dom::WebDom;
pub use js_core::{CoreHandle, JsCore, MemorySlice, WebBatch};
pub use raf::RafLoop;

use alloc::format;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Size;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use strata_core::chassis::Chassis;
use strata_core::config::ChassisConfig;

use input::WindowInput;
use listener::{EventListener, ListenerOptions};

/// Returns the current time from `performance.now()`, in milliseconds.
#[must_use]
pub fn now() -> f64 {
    raf::performance_now()
}

/// Configuration for [`mount`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WebConfig {
    /// Chassis tuning.
    pub chassis: ChassisConfig,
    /// Maximum level logged to the console.
    pub log_level: log::Level,
}

impl WebConfig {
    /// Browser defaults, logging at `Info`.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            chassis: ChassisConfig::web(),
            log_level: log::Level::Info,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::web()
    }
}

struct State {
    chassis: Chassis<WebDom, JsCore>,
    dom: WebDom,
    mount: HtmlElement,
}

impl State {
    fn viewport(&self) -> Size {
        Size::new(
            f64::from(self.mount.client_width()),
            f64::from(self.mount.client_height()),
        )
    }
}

/// A mounted, running chassis. Dropping it stops the frame loop and removes
/// every window listener.
pub struct WebChassis {
    raf: RafLoop,
    _input: WindowInput,
    _resize: EventListener,
    state: Rc<RefCell<State>>,
}

impl core::fmt::Debug for WebChassis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebChassis")
            .field("raf", &self.raf)
            .field("initialized", &self.state.borrow().chassis.is_initialized())
            .finish_non_exhaustive()
    }
}

impl WebChassis {
    /// Whether frames are still being driven.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.raf.is_running()
    }

    /// Stops the frame loop. Input keeps flowing to the core.
    pub fn stop(&self) {
        self.raf.stop();
    }
}

fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    // A logger may already be installed by an earlier mount.
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Mounts a chassis into the element matching `selector` and starts the
/// frame loop.
///
/// # Errors
///
/// Fails if there is no window or document, nothing matches `selector`, or
/// the base layer cannot be built.
pub fn mount(selector: &str, core: JsCore, config: WebConfig) -> Result<WebChassis, JsValue> {
    init_logging(config.log_level);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let mount: HtmlElement = document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("nothing matches {selector:?}")))?
        .dyn_into()?;

    let mut dom = WebDom::new(document.clone(), core.clone());
    let root = dom.adopt(mount.clone());
    let chassis = Chassis::new(&mut dom, core.clone(), root, config.chassis)
        .map_err(|e| JsValue::from_str(&format!("could not mount chassis: {e}")))?;
    let state = Rc::new(RefCell::new(State {
        chassis,
        dom,
        mount,
    }));

    let input = WindowInput::install(&window, &document, &core);

    let resize = {
        let state = Rc::clone(&state);
        EventListener::new(&window, "resize", ListenerOptions::BUBBLE, move |_| {
            let mut state = state.borrow_mut();
            let viewport = state.viewport();
            state.chassis.resize(viewport);
        })
    };

    let raf = {
        let state = Rc::clone(&state);
        let window = window.clone();
        RafLoop::new(move |now_ms| {
            let mut state = state.borrow_mut();
            let viewport = state.viewport();
            let State { chassis, dom, .. } = &mut *state;
            match chassis.frame(dom, now_ms, window.device_pixel_ratio(), viewport) {
                Ok(report) => {
                    if report.first_frame {
                        log::info!("first frame applied {} patches", report.patches);
                    }
                    true
                }
                Err(e) => {
                    log::error!("frame aborted, stopping: {e}");
                    false
                }
            }
        })
    };
    raf.start();

    log::info!("chassis mounted at {selector}");
    Ok(WebChassis {
        raf,
        _input: input,
        _resize: resize,
        state,
    })
}

/// JavaScript handle to a mounted chassis.
#[wasm_bindgen]
#[derive(Debug)]
pub struct StrataHandle {
    inner: WebChassis,
}

#[wasm_bindgen]
impl StrataHandle {
    /// Stops the frame loop.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Whether frames are still being driven.
    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.inner.is_running()
    }
}

/// Mounts a chassis with the default configuration. Exported to JavaScript.
///
/// # Errors
///
/// See [`mount`].
#[wasm_bindgen]
pub fn start(selector: &str, core: CoreHandle) -> Result<StrataHandle, JsValue> {
    let inner = mount(selector, JsCore::from_handle(core), WebConfig::web())?;
    Ok(StrataHandle { inner })
}
