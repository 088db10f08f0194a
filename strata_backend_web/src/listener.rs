// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event listeners that unregister themselves on drop.

use alloc::boxed::Box;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// How a listener is registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListenerOptions {
    pub(crate) capture: bool,
    pub(crate) passive: bool,
}

impl ListenerOptions {
    pub(crate) const BUBBLE: Self = Self {
        capture: false,
        passive: false,
    };
    pub(crate) const CAPTURE: Self = Self {
        capture: true,
        passive: false,
    };
    pub(crate) const CAPTURE_PASSIVE: Self = Self {
        capture: true,
        passive: true,
    };
}

/// A registered listener. Dropping it removes the listener and frees the
/// closure.
pub(crate) struct EventListener {
    target: EventTarget,
    event: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    /// Registers `handler` for `event` on `target`.
    pub(crate) fn new(
        target: &EventTarget,
        event: &'static str,
        options: ListenerOptions,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let js_options = AddEventListenerOptions::new();
        js_options.set_capture(options.capture);
        js_options.set_passive(options.passive);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &js_options,
        ) {
            log::warn!("could not listen for {event}: {e:?}");
        }
        Self {
            target: target.clone(),
            event,
            capture: options.capture,
            closure,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

impl core::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventListener")
            .field("event", &self.event)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}
