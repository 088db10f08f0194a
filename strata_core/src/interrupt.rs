// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events sent upstream to the core.
//!
//! Every interrupt is serialized as a JSON object with exactly one key naming
//! the variant, mirroring the patch stream in the other direction.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

use crate::markdown::sanitize_editable;

/// What the core answered to an interrupt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptResult {
    /// The host should cancel the DOM event's default action.
    pub prevent_default: bool,
}

/// Mouse button as reported to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Anything else.
    Unknown,
}

/// Keyboard modifier held during an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ModifierKey {
    /// Shift.
    Shift,
    /// Control.
    Control,
    /// Alt / Option.
    Alt,
    /// Meta / Command.
    Command,
}

/// Payload of pointer events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MouseArgs {
    /// Client x.
    pub x: f64,
    /// Client y.
    pub y: f64,
    /// Button involved.
    pub button: MouseButton,
    /// Modifiers held.
    pub modifiers: Vec<ModifierKey>,
}

/// Payload of [`NativeInterrupt::Clap`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClapArgs {
    /// Client x.
    pub x: f64,
    /// Client y.
    pub y: f64,
}

/// Payload of [`NativeInterrupt::Wheel`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WheelArgs {
    /// Client x.
    pub x: f64,
    /// Client y.
    pub y: f64,
    /// Horizontal wheel delta.
    pub delta_x: f64,
    /// Vertical wheel delta.
    pub delta_y: f64,
    /// Modifiers held.
    pub modifiers: Vec<ModifierKey>,
}

/// One touch point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TouchArgs {
    /// Client x.
    pub x: f64,
    /// Client y.
    pub y: f64,
    /// Host touch identifier.
    pub identifier: i64,
    /// Movement since this touch was last reported.
    pub delta_x: f64,
    /// Movement since this touch was last reported.
    pub delta_y: f64,
}

/// Payload of touch events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchesArgs {
    /// Touch points.
    pub touches: Vec<TouchArgs>,
}

/// Payload of keyboard events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyArgs {
    /// `KeyboardEvent.key`.
    pub key: String,
    /// Modifiers held.
    pub modifiers: Vec<ModifierKey>,
    /// Auto-repeat.
    pub is_repeat: bool,
}

/// Payload of [`NativeInterrupt::DropFile`]; the file bytes travel as the
/// binary payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DropFileArgs {
    /// Client x.
    pub x: f64,
    /// Client y.
    pub y: f64,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Payload of [`NativeInterrupt::Scroll`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollArgs {
    /// Horizontal delta.
    pub delta_x: f64,
    /// Vertical delta.
    pub delta_y: f64,
}

/// One measured content-sized element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResizeRequest {
    /// Element id.
    pub id: u32,
    /// Measured width.
    pub width: f64,
    /// Measured height.
    pub height: f64,
}

/// Payload of [`NativeInterrupt::Image`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ImageArgs {
    /// Decoded RGBA pixels are attached as the binary payload.
    Data {
        /// Element id that requested the image.
        id: u32,
        /// Path as requested.
        path: String,
        /// Pixel width.
        width: u32,
        /// Pixel height.
        height: u32,
    },
}

/// Every event the chassis sends to the core.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[expect(missing_docs, reason = "payload fields are documented on their types")]
pub enum NativeInterrupt {
    FormButtonClick { id: u32 },
    FormCheckboxToggle { id: u32, state: bool },
    FormTextboxInput { id: u32, text: String },
    FormTextboxChange { id: u32, text: String },
    FormSliderChange { id: u32, value: f64 },
    FormDropdownChange { id: u32, selected_id: u32 },
    FormRadioSetChange { id: u32, selected_id: u32 },
    TextInput { id: u32, text: String },
    Click(MouseArgs),
    DoubleClick(MouseArgs),
    MouseMove(MouseArgs),
    MouseDown(MouseArgs),
    MouseUp(MouseArgs),
    MouseOver(MouseArgs),
    MouseOut(MouseArgs),
    ContextMenu(MouseArgs),
    Clap(ClapArgs),
    Wheel(WheelArgs),
    TouchStart(TouchesArgs),
    TouchMove(TouchesArgs),
    TouchEnd(TouchesArgs),
    KeyDown(KeyArgs),
    KeyUp(KeyArgs),
    KeyPress(KeyArgs),
    DropFile(DropFileArgs),
    Scroll(ScrollArgs),
    ChassisResizeRequestCollection(Vec<ResizeRequest>),
    Image(ImageArgs),
}

impl NativeInterrupt {
    /// Encodes the interrupt as the JSON string the core expects.
    ///
    /// # Errors
    ///
    /// [`Error::Serialize`](crate::Error::Serialize) if a payload cannot be
    /// represented in JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Serialize(alloc::format!("{e}")))
    }
}

/// What a form control reported when a bound DOM event fired.
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    /// Nothing to read (clicks).
    None,
    /// `input.checked`.
    Checked(bool),
    /// `input.value`, or the `innerHTML` of an editable element.
    Text(String),
    /// A numeric control value.
    Number(f64),
    /// `selectedIndex`, or the position of the chosen radio row.
    Index(u32),
}

/// How a DOM event on a control maps onto an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputBinding {
    /// `click` → [`NativeInterrupt::FormButtonClick`].
    ButtonClick,
    /// `change` → [`NativeInterrupt::FormCheckboxToggle`].
    ///
    /// Hosts revert the control's checked state after reading it; the core
    /// answers with an update carrying the authoritative value.
    CheckboxToggle,
    /// `input` → [`NativeInterrupt::FormTextboxInput`].
    TextboxInput,
    /// `change` → [`NativeInterrupt::FormTextboxChange`].
    TextboxChange,
    /// `input` → [`NativeInterrupt::FormSliderChange`].
    SliderChange,
    /// `change` → [`NativeInterrupt::FormDropdownChange`].
    DropdownChange,
    /// `change` → [`NativeInterrupt::FormRadioSetChange`].
    RadioSetChange,
    /// `input` on an editable text → [`NativeInterrupt::TextInput`].
    TextInput,
}

impl InputBinding {
    /// The DOM event name to listen for.
    #[must_use]
    pub const fn dom_event(self) -> &'static str {
        match self {
            Self::ButtonClick => "click",
            Self::TextboxInput | Self::SliderChange | Self::TextInput => "input",
            Self::CheckboxToggle
            | Self::TextboxChange
            | Self::DropdownChange
            | Self::RadioSetChange => "change",
        }
    }

    /// Builds the interrupt for element `id`.
    ///
    /// Returns `None` when `value` is not what this binding reads.
    #[must_use]
    pub fn interrupt(self, id: u32, value: InputValue) -> Option<NativeInterrupt> {
        Some(match (self, value) {
            (Self::ButtonClick, _) => NativeInterrupt::FormButtonClick { id },
            (Self::CheckboxToggle, InputValue::Checked(state)) => {
                NativeInterrupt::FormCheckboxToggle { id, state }
            }
            (Self::TextboxInput, InputValue::Text(text)) => {
                NativeInterrupt::FormTextboxInput { id, text }
            }
            (Self::TextboxChange, InputValue::Text(text)) => {
                NativeInterrupt::FormTextboxChange { id, text }
            }
            (Self::SliderChange, InputValue::Number(value)) => {
                NativeInterrupt::FormSliderChange { id, value }
            }
            (Self::DropdownChange, InputValue::Index(selected_id)) => {
                NativeInterrupt::FormDropdownChange { id, selected_id }
            }
            (Self::RadioSetChange, InputValue::Index(selected_id)) => {
                NativeInterrupt::FormRadioSetChange { id, selected_id }
            }
            (Self::TextInput, InputValue::Text(html)) => NativeInterrupt::TextInput {
                id,
                text: sanitize_editable(&html),
            },
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString as _;
    use alloc::vec;

    use super::*;

    #[test]
    fn serializes_with_variant_key() {
        let json = NativeInterrupt::FormCheckboxToggle { id: 7, state: true }
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"FormCheckboxToggle":{"id":7,"state":true}}"#);

        let json = NativeInterrupt::Scroll(ScrollArgs {
            delta_x: 0.0,
            delta_y: 12.5,
        })
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"Scroll":{"delta_x":0.0,"delta_y":12.5}}"#);
    }

    #[test]
    fn resize_collection_is_a_bare_array() {
        let json = NativeInterrupt::ChassisResizeRequestCollection(vec![ResizeRequest {
            id: 3,
            width: 10.0,
            height: 4.0,
        }])
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"ChassisResizeRequestCollection":[{"id":3,"width":10.0,"height":4.0}]}"#
        );
    }

    #[test]
    fn image_data_nests_variant() {
        let json = NativeInterrupt::Image(ImageArgs::Data {
            id: 1,
            path: "a.png".to_string(),
            width: 2,
            height: 3,
        })
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"Image":{"Data":{"id":1,"path":"a.png","width":2,"height":3}}}"#
        );
    }

    #[test]
    fn bindings_read_matching_values_only() {
        assert_eq!(
            InputBinding::SliderChange.interrupt(4, InputValue::Number(0.5)),
            Some(NativeInterrupt::FormSliderChange { id: 4, value: 0.5 })
        );
        assert_eq!(
            InputBinding::SliderChange.interrupt(4, InputValue::Checked(true)),
            None
        );
        assert_eq!(
            InputBinding::ButtonClick.interrupt(9, InputValue::None),
            Some(NativeInterrupt::FormButtonClick { id: 9 })
        );
    }

    #[test]
    fn text_input_sanitizes_editable_html() {
        let event = InputBinding::TextInput.interrupt(2, InputValue::Text("a<br>b".into()));
        assert_eq!(
            event,
            Some(NativeInterrupt::TextInput {
                id: 2,
                text: "a\nb".into()
            })
        );
    }

    #[test]
    fn dom_events() {
        assert_eq!(InputBinding::ButtonClick.dom_event(), "click");
        assert_eq!(InputBinding::TextboxInput.dom_event(), "input");
        assert_eq!(InputBinding::TextboxChange.dom_event(), "change");
    }
}
