// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation of window-level input into interrupts.
//!
//! Hosts read raw values out of their DOM events and pass them to an
//! [`InputTranslator`], which produces the interrupts to send, in order.
//! The translator keeps the little state input needs across events: the
//! last pressed mouse button and the last position of every active touch.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;

use crate::interrupt::{
    ClapArgs, KeyArgs, ModifierKey, MouseArgs, MouseButton, NativeInterrupt, ResizeRequest,
    TouchArgs, TouchesArgs, WheelArgs,
};

/// Maps `MouseEvent.button` to a [`MouseButton`].
#[must_use]
pub const fn mouse_button(button: i16) -> MouseButton {
    match button {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Unknown,
    }
}

/// Modifier flags as read from a DOM event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// `shiftKey`
    pub shift: bool,
    /// `ctrlKey`
    pub control: bool,
    /// `altKey`
    pub alt: bool,
    /// `metaKey`
    pub meta: bool,
}

impl Modifiers {
    /// Held modifiers, in the order Shift, Control, Alt, Command.
    #[must_use]
    pub fn keys(self) -> Vec<ModifierKey> {
        [
            (self.shift, ModifierKey::Shift),
            (self.control, ModifierKey::Control),
            (self.alt, ModifierKey::Alt),
            (self.meta, ModifierKey::Command),
        ]
        .into_iter()
        .filter_map(|(held, key)| held.then_some(key))
        .collect()
    }
}

/// Pointer events forwarded to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[expect(missing_docs, reason = "named after the DOM events")]
pub enum MouseEventKind {
    Click,
    DoubleClick,
    MouseMove,
    MouseDown,
    MouseUp,
    MouseOver,
    MouseOut,
    ContextMenu,
}

/// Keyboard events forwarded to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[expect(missing_docs, reason = "named after the DOM events")]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
    KeyPress,
}

/// One entry of a DOM `TouchList`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawTouch {
    /// `Touch.identifier`
    pub identifier: i64,
    /// `clientX`
    pub x: f64,
    /// `clientY`
    pub y: f64,
}

/// Stateful translator from raw input to interrupts.
#[derive(Clone, Debug)]
pub struct InputTranslator {
    pressed: MouseButton,
    touches: BTreeMap<i64, Point>,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self {
            pressed: MouseButton::Left,
            touches: BTreeMap::new(),
        }
    }
}

impl InputTranslator {
    /// Creates a translator with no pressed button and no active touches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates a mouse event.
    ///
    /// Mouse moves report the most recently pressed button instead of
    /// `button`, since browsers report no button on moves. Clicks are
    /// followed by a [`NativeInterrupt::Clap`].
    pub fn mouse(
        &mut self,
        kind: MouseEventKind,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> Vec<NativeInterrupt> {
        if kind == MouseEventKind::MouseDown {
            self.pressed = button;
        }
        let args = MouseArgs {
            x: position.x,
            y: position.y,
            button: if kind == MouseEventKind::MouseMove {
                self.pressed
            } else {
                button
            },
            modifiers: modifiers.keys(),
        };
        match kind {
            MouseEventKind::Click => vec![
                NativeInterrupt::Click(args),
                NativeInterrupt::Clap(ClapArgs {
                    x: position.x,
                    y: position.y,
                }),
            ],
            MouseEventKind::DoubleClick => vec![NativeInterrupt::DoubleClick(args)],
            MouseEventKind::MouseMove => vec![NativeInterrupt::MouseMove(args)],
            MouseEventKind::MouseDown => vec![NativeInterrupt::MouseDown(args)],
            MouseEventKind::MouseUp => vec![NativeInterrupt::MouseUp(args)],
            MouseEventKind::MouseOver => vec![NativeInterrupt::MouseOver(args)],
            MouseEventKind::MouseOut => vec![NativeInterrupt::MouseOut(args)],
            MouseEventKind::ContextMenu => vec![NativeInterrupt::ContextMenu(args)],
        }
    }

    /// Translates a wheel event.
    #[must_use]
    pub fn wheel(
        &self,
        position: Point,
        delta_x: f64,
        delta_y: f64,
        modifiers: Modifiers,
    ) -> NativeInterrupt {
        NativeInterrupt::Wheel(WheelArgs {
            x: position.x,
            y: position.y,
            delta_x,
            delta_y,
            modifiers: modifiers.keys(),
        })
    }

    fn track(&mut self, touches: &[RawTouch]) -> Vec<TouchArgs> {
        touches
            .iter()
            .map(|t| {
                let now = Point::new(t.x, t.y);
                let last = self.touches.insert(t.identifier, now).unwrap_or(now);
                TouchArgs {
                    x: t.x,
                    y: t.y,
                    identifier: t.identifier,
                    delta_x: now.x - last.x,
                    delta_y: now.y - last.y,
                }
            })
            .collect()
    }

    /// Translates `touchstart`.
    ///
    /// `touches` is the full list of active touches, `changed` the touches
    /// that just began. A [`NativeInterrupt::Clap`] at the first active touch
    /// follows the touch start.
    pub fn touch_start(
        &mut self,
        touches: &[RawTouch],
        changed: &[RawTouch],
    ) -> Vec<NativeInterrupt> {
        let args = self.track(touches);
        for t in changed {
            self.touches.insert(t.identifier, Point::new(t.x, t.y));
        }
        let mut out = vec![NativeInterrupt::TouchStart(TouchesArgs { touches: args })];
        if let Some(first) = touches.first() {
            out.push(NativeInterrupt::Clap(ClapArgs {
                x: first.x,
                y: first.y,
            }));
        }
        out
    }

    /// Translates `touchmove`, with deltas since each touch was last seen.
    pub fn touch_move(&mut self, touches: &[RawTouch]) -> NativeInterrupt {
        NativeInterrupt::TouchMove(TouchesArgs {
            touches: self.track(touches),
        })
    }

    /// Translates `touchend` for the touches in `changed`, and forgets them.
    pub fn touch_end(&mut self, changed: &[RawTouch]) -> NativeInterrupt {
        let touches = self.track(changed);
        for t in changed {
            self.touches.remove(&t.identifier);
        }
        NativeInterrupt::TouchEnd(TouchesArgs { touches })
    }

    /// Number of touches currently tracked.
    #[must_use]
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    /// Translates a keyboard event.
    #[must_use]
    pub fn key(
        &self,
        kind: KeyEventKind,
        key: String,
        modifiers: Modifiers,
        is_repeat: bool,
    ) -> NativeInterrupt {
        let args = KeyArgs {
            key,
            modifiers: modifiers.keys(),
            is_repeat,
        };
        match kind {
            KeyEventKind::KeyDown => NativeInterrupt::KeyDown(args),
            KeyEventKind::KeyUp => NativeInterrupt::KeyUp(args),
            KeyEventKind::KeyPress => NativeInterrupt::KeyPress(args),
        }
    }
}

/// Parses the element id a native leaf carries.
#[must_use]
pub fn native_id(attribute: &str) -> Option<u32> {
    attribute.trim().parse().ok()
}

/// Bundles size-observer reports into one interrupt, or `None` if there are
/// none.
#[must_use]
pub fn resize_collection(requests: Vec<ResizeRequest>) -> Option<NativeInterrupt> {
    (!requests.is_empty()).then_some(NativeInterrupt::ChassisResizeRequestCollection(requests))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT_META: Modifiers = Modifiers {
        shift: true,
        control: false,
        alt: false,
        meta: true,
    };

    #[test]
    fn buttons_and_modifiers() {
        assert_eq!(mouse_button(0), MouseButton::Left);
        assert_eq!(mouse_button(2), MouseButton::Right);
        assert_eq!(mouse_button(4), MouseButton::Unknown);
        assert_eq!(SHIFT_META.keys(), [ModifierKey::Shift, ModifierKey::Command]);
        assert!(Modifiers::default().keys().is_empty());
    }

    #[test]
    fn click_is_followed_by_clap() {
        let mut input = InputTranslator::new();
        let events = input.mouse(
            MouseEventKind::Click,
            Point::new(3.0, 4.0),
            MouseButton::Left,
            Modifiers::default(),
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], NativeInterrupt::Click(_)));
        assert_eq!(events[1], NativeInterrupt::Clap(ClapArgs { x: 3.0, y: 4.0 }));
    }

    #[test]
    fn mouse_move_reports_last_pressed_button() {
        let mut input = InputTranslator::new();
        let moved = |input: &mut InputTranslator| {
            let events = input.mouse(
                MouseEventKind::MouseMove,
                Point::ORIGIN,
                MouseButton::Unknown,
                SHIFT_META,
            );
            match &events[0] {
                NativeInterrupt::MouseMove(args) => args.button,
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(moved(&mut input), MouseButton::Left);
        input.mouse(
            MouseEventKind::MouseDown,
            Point::ORIGIN,
            MouseButton::Right,
            Modifiers::default(),
        );
        assert_eq!(moved(&mut input), MouseButton::Right);
    }

    #[test]
    fn touch_deltas_are_tracked_per_identifier() {
        let mut input = InputTranslator::new();
        let a = RawTouch {
            identifier: 1,
            x: 10.0,
            y: 10.0,
        };
        let start = input.touch_start(&[a], &[a]);
        assert_eq!(start.len(), 2);
        assert_eq!(start[1], NativeInterrupt::Clap(ClapArgs { x: 10.0, y: 10.0 }));

        let moved = RawTouch { x: 14.0, y: 7.0, ..a };
        let NativeInterrupt::TouchMove(args) = input.touch_move(&[moved]) else {
            panic!("expected TouchMove");
        };
        assert_eq!((args.touches[0].delta_x, args.touches[0].delta_y), (4.0, -3.0));

        let NativeInterrupt::TouchEnd(args) = input.touch_end(&[moved]) else {
            panic!("expected TouchEnd");
        };
        assert_eq!(args.touches[0].delta_x, 0.0);
        assert_eq!(input.active_touches(), 0);
    }

    #[test]
    fn keys_carry_repeat_flag() {
        let input = InputTranslator::new();
        let event = input.key(KeyEventKind::KeyDown, "a".into(), SHIFT_META, true);
        assert_eq!(
            event,
            NativeInterrupt::KeyDown(KeyArgs {
                key: "a".into(),
                modifiers: vec![ModifierKey::Shift, ModifierKey::Command],
                is_repeat: true
            })
        );
    }

    #[test]
    fn resize_collection_skips_empty_reports() {
        assert_eq!(resize_collection(Vec::new()), None);
        assert_eq!(native_id(" 12 "), Some(12));
        assert_eq!(native_id("x"), None);
    }
}
