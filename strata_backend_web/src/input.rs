// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window-level input.
//!
//! Pointer, wheel, touch, keyboard and file-drop events are captured on the
//! window, translated by an [`InputTranslator`], and sent to the core. The
//! default action is cancelled whenever the core asks for it.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use js_sys::Uint8Array;
use kurbo::Point;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, DragEvent, Event, KeyboardEvent, MouseEvent, TouchEvent, TouchList, WheelEvent,
    Window,
};

use strata_core::chassis::CoreLink as _;
use strata_core::events::{
    InputTranslator, KeyEventKind, Modifiers, MouseEventKind, RawTouch, mouse_button,
};
use strata_core::interrupt::{DropFileArgs, NativeInterrupt};

use crate::js_core::JsCore;
use crate::listener::{EventListener, ListenerOptions};

const MOUSE_EVENTS: [(&str, MouseEventKind); 6] = [
    ("click", MouseEventKind::Click),
    ("dblclick", MouseEventKind::DoubleClick),
    ("mousemove", MouseEventKind::MouseMove),
    ("mousedown", MouseEventKind::MouseDown),
    ("mouseup", MouseEventKind::MouseUp),
    ("contextmenu", MouseEventKind::ContextMenu),
];

const KEY_EVENTS: [(&str, KeyEventKind); 3] = [
    ("keydown", KeyEventKind::KeyDown),
    ("keyup", KeyEventKind::KeyUp),
    ("keypress", KeyEventKind::KeyPress),
];

/// The window listeners of a mounted chassis. Dropping this removes them.
#[derive(Debug)]
pub(crate) struct WindowInput {
    _listeners: Vec<EventListener>,
}

/// Sends `interrupts` in order, cancelling `event` if the core asks to and
/// the listener may.
fn deliver(
    core: &mut JsCore,
    event: &Event,
    cancellable: bool,
    interrupts: impl IntoIterator<Item = NativeInterrupt>,
) {
    for interrupt in interrupts {
        match core.send(&interrupt, None) {
            Ok(result) if result.prevent_default && cancellable => event.prevent_default(),
            Ok(_) => {}
            Err(e) => log::warn!("could not send {} interrupt: {e}", event.type_()),
        }
    }
}

fn modifiers(shift: bool, control: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        control,
        alt,
        meta,
    }
}

fn touches(list: &TouchList) -> Vec<RawTouch> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| RawTouch {
            identifier: i64::from(t.identifier()),
            x: f64::from(t.client_x()),
            y: f64::from(t.client_y()),
        })
        .collect()
}

/// Whether keyboard focus is on the page rather than a form control.
fn body_focused(document: &Document) -> bool {
    match (document.active_element(), document.body()) {
        (Some(active), Some(body)) => {
            AsRef::<JsValue>::as_ref(&active) == AsRef::<JsValue>::as_ref(&body)
        }
        _ => false,
    }
}

impl WindowInput {
    pub(crate) fn install(window: &Window, document: &Document, core: &JsCore) -> Self {
        let translator = Rc::new(RefCell::new(InputTranslator::new()));
        let mut listeners = Vec::new();

        for (name, kind) in MOUSE_EVENTS {
            let translator = Rc::clone(&translator);
            let mut core = core.clone();
            listeners.push(EventListener::new(
                window,
                name,
                ListenerOptions::CAPTURE,
                move |event: Event| {
                    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    let interrupts = translator.borrow_mut().mouse(
                        kind,
                        Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())),
                        mouse_button(mouse.button()),
                        modifiers(
                            mouse.shift_key(),
                            mouse.ctrl_key(),
                            mouse.alt_key(),
                            mouse.meta_key(),
                        ),
                    );
                    deliver(&mut core, &event, true, interrupts);
                },
            ));
        }

        {
            let translator = Rc::clone(&translator);
            let mut core = core.clone();
            listeners.push(EventListener::new(
                window,
                "wheel",
                ListenerOptions::CAPTURE,
                move |event: Event| {
                    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                        return;
                    };
                    let interrupt = translator.borrow().wheel(
                        Point::new(f64::from(wheel.client_x()), f64::from(wheel.client_y())),
                        wheel.delta_x(),
                        wheel.delta_y(),
                        modifiers(
                            wheel.shift_key(),
                            wheel.ctrl_key(),
                            wheel.alt_key(),
                            wheel.meta_key(),
                        ),
                    );
                    deliver(&mut core, &event, true, [interrupt]);
                },
            ));
        }

        listeners.extend(touch_listeners(window, &translator, core));

        for (name, kind) in KEY_EVENTS {
            let translator = Rc::clone(&translator);
            let mut core = core.clone();
            let document = document.clone();
            listeners.push(EventListener::new(
                window,
                name,
                ListenerOptions::CAPTURE,
                move |event: Event| {
                    if !body_focused(&document) {
                        return;
                    }
                    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    let interrupt = translator.borrow().key(
                        kind,
                        key.key(),
                        modifiers(key.shift_key(), key.ctrl_key(), key.alt_key(), key.meta_key()),
                        key.repeat(),
                    );
                    deliver(&mut core, &event, true, [interrupt]);
                },
            ));
        }

        listeners.push(EventListener::new(
            window,
            "dragover",
            ListenerOptions::CAPTURE,
            |event: Event| {
                event.prevent_default();
                if let Some(transfer) = event
                    .dyn_ref::<DragEvent>()
                    .and_then(DragEvent::data_transfer)
                {
                    transfer.set_drop_effect("copy");
                }
            },
        ));

        {
            let core = core.clone();
            listeners.push(EventListener::new(
                window,
                "drop",
                ListenerOptions::CAPTURE,
                move |event: Event| {
                    event.prevent_default();
                    if let Some(drag) = event.dyn_ref::<DragEvent>() {
                        drop_file(core.clone(), drag);
                    }
                },
            ));
        }

        log::debug!("installed {} window listeners", listeners.len());
        Self {
            _listeners: listeners,
        }
    }
}

fn touch_listeners(
    window: &Window,
    translator: &Rc<RefCell<InputTranslator>>,
    core: &JsCore,
) -> [EventListener; 3] {
    let on = |name: &'static str,
              translate: fn(&mut InputTranslator, &TouchEvent) -> Vec<NativeInterrupt>| {
        let translator = Rc::clone(translator);
        let mut core = core.clone();
        EventListener::new(
            window,
            name,
            ListenerOptions::CAPTURE_PASSIVE,
            move |event: Event| {
                let Some(touch) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let interrupts = translate(&mut translator.borrow_mut(), touch);
                deliver(&mut core, &event, false, interrupts);
            },
        )
    };
    [
        on("touchstart", touch_start),
        on("touchmove", touch_move),
        on("touchend", touch_end),
    ]
}

fn touch_start(translator: &mut InputTranslator, event: &TouchEvent) -> Vec<NativeInterrupt> {
    translator.touch_start(&touches(&event.touches()), &touches(&event.changed_touches()))
}

fn touch_move(translator: &mut InputTranslator, event: &TouchEvent) -> Vec<NativeInterrupt> {
    vec![translator.touch_move(&touches(&event.touches()))]
}

fn touch_end(translator: &mut InputTranslator, event: &TouchEvent) -> Vec<NativeInterrupt> {
    vec![translator.touch_end(&touches(&event.changed_touches()))]
}

/// Reads the first dropped file and sends it with its bytes.
fn drop_file(mut core: JsCore, drag: &DragEvent) {
    let Some(file) = drag
        .data_transfer()
        .and_then(|transfer| transfer.files())
        .and_then(|files| files.get(0))
    else {
        return;
    };
    let (x, y) = (f64::from(drag.client_x()), f64::from(drag.client_y()));
    spawn_local(async move {
        let buffer = match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("could not read dropped file {}: {e:?}", file.name());
                return;
            }
        };
        let bytes = Uint8Array::new(&buffer).to_vec();
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "Blob.size is a non-negative integer below 2^53"
        )]
        let size = file.size() as u64;
        let interrupt = NativeInterrupt::DropFile(DropFileArgs {
            x,
            y,
            name: file.name(),
            mime_type: file.type_(),
            size,
        });
        if let Err(e) = core.send(&interrupt, Some(&bytes)) {
            log::warn!("could not send dropped file: {e}");
        }
    });
}
