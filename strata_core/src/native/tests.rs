// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;

use super::*;
use crate::dom::MemoryDom;
use crate::interrupt::{InputValue, NativeInterrupt, ResizeRequest};
use crate::markdown;
use crate::patch::decode_batch;
use crate::testing::RecordingLink;

struct Fixture {
    dom: MemoryDom,
    core: RecordingLink,
    native: NativeElementPool<MemoryDom>,
}

impl Fixture {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut dom = MemoryDom::new();
        let mut core = RecordingLink::default();
        let mount = dom.create_element(ElementKind::Div);
        let native =
            NativeElementPool::attach(&mut dom, &mut core, mount, ChassisConfig::web()).unwrap();
        Self { dom, core, native }
    }

    fn apply(&mut self, batch: &str) -> Result<()> {
        for patch in decode_batch(batch.as_bytes())? {
            self.native.apply(&mut self.dom, &mut self.core, patch)?;
        }
        Ok(())
    }

    fn leaf(&self, id: u32) -> NodeId {
        self.native.leaf(id).unwrap()
    }

    fn part(&self, id: u32, index: usize) -> NodeId {
        self.native.part(id, index).unwrap()
    }

    fn overlay(&self, layer: u32) -> NodeId {
        self.native.layers().layer(layer).unwrap().overlay()
    }

    fn available(&self, kind: ElementKind) -> usize {
        self.native.pools().pool(&kind).unwrap().available()
    }

    fn created(&self, kind: ElementKind) -> usize {
        self.native.pools().pool(&kind).unwrap().created()
    }
}

#[test]
fn update_and_delete_before_create_are_rejected() {
    let mut f = Fixture::new();
    let nodes_before = f.dom.len();
    assert_eq!(
        f.apply(r#"[{"TextUpdate":{"id":5,"content":"x"}}]"#),
        Err(Error::UnknownElement(5))
    );
    assert_eq!(f.apply(r#"[{"SliderDelete":5}]"#), Err(Error::UnknownElement(5)));
    assert_eq!(
        f.apply(r#"[{"OcclusionUpdate":{"id":5,"occlusion_layer_id":1,"z_index":1}}]"#),
        Err(Error::UnknownElement(5))
    );
    assert!(f.native.is_empty());
    assert_eq!(f.dom.len(), nodes_before, "rejected patches touch nothing");
}

#[test]
fn duplicate_ids_and_kind_mismatches_are_rejected() {
    let mut f = Fixture::new();
    f.apply(r#"[{"ButtonCreate":{"id":1,"occlusion_layer_id":0}}]"#)
        .unwrap();
    assert_eq!(
        f.apply(r#"[{"TextCreate":{"id":1,"occlusion_layer_id":0}}]"#),
        Err(Error::DuplicateElement(1))
    );
    assert_eq!(
        f.apply(r#"[{"CheckboxUpdate":{"id":1,"checked":true}}]"#),
        Err(Error::KindMismatch {
            id: 1,
            expected: "checkbox",
            actual: "button",
        })
    );
    assert_eq!(f.native.kind(1), Some(NativeKind::Button), "still registered");
}

#[test]
fn text_lifecycle_recycles_nodes() {
    let mut f = Fixture::new();
    f.apply(r#"[{"TextCreate":{"id":1,"occlusion_layer_id":0}}]"#)
        .unwrap();
    let leaf = f.leaf(1);
    assert_eq!(f.dom.attribute(leaf, "class"), Some(LEAF_CLASS));
    assert_eq!(f.dom.attribute(leaf, ID_ATTRIBUTE), Some("1"));
    assert_eq!(f.dom.parent(leaf), Some(f.overlay(0)));

    f.apply(r#"[{"TextUpdate":{"id":1,"content":"**hi**","size_x":30,"size_y":10}}]"#)
        .unwrap();
    let text = f.part(1, 0);
    assert_eq!(f.dom.inner_html(text), markdown::render("**hi**"));
    assert_eq!(f.dom.style(leaf, "width"), Some("30px"));
    assert!(!f.dom.is_observed(leaf));

    let divs = f.created(ElementKind::Div);
    f.apply(r#"[{"TextDelete":1}]"#).unwrap();
    assert_eq!(f.available(ElementKind::Div), 2, "leaf and text child returned");
    assert_eq!(f.dom.parent(leaf), None);

    f.apply(r#"[{"TextCreate":{"id":2,"occlusion_layer_id":0}}]"#)
        .unwrap();
    assert_eq!(f.created(ElementKind::Div), divs, "recreated from the pool");
    assert_eq!(f.dom.attribute(f.leaf(2), ID_ATTRIBUTE), Some("2"));
}

#[test]
fn content_sized_text_reports_its_size() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextCreate":{"id":3,"occlusion_layer_id":0}},
            {"TextUpdate":{"id":3,"size_x":-1,"size_y":-1,"content":"grow"}}]"#,
    )
    .unwrap();
    let leaf = f.leaf(3);
    assert!(f.dom.is_observed(leaf));
    assert_eq!(f.dom.style(leaf, "width"), None);
    assert_eq!(
        f.dom.report_sizes(&[(leaf, 40.0, 12.0)]),
        Some(NativeInterrupt::ChassisResizeRequestCollection(vec![
            ResizeRequest {
                id: 3,
                width: 40.0,
                height: 12.0,
            }
        ]))
    );

    f.apply(r#"[{"TextDelete":3}]"#).unwrap();
    assert!(!f.dom.is_observed(leaf));
}

#[test]
fn editable_text_reports_sanitized_input() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextCreate":{"id":4,"occlusion_layer_id":0}},
            {"TextUpdate":{"id":4,"editable":true}}]"#,
    )
    .unwrap();
    let text = f.part(4, 0);
    assert_eq!(f.dom.attribute(text, "contenteditable"), Some("true"));
    assert_eq!(f.dom.style(text, "outline"), Some("none"));
    let events = f.dom.fire(text, "input", &InputValue::Text("a<br>b".into()));
    assert_eq!(
        events,
        [NativeInterrupt::TextInput {
            id: 4,
            text: "a\nb".into()
        }]
    );
}

#[test]
fn link_style_survives_content_changes() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextCreate":{"id":5,"occlusion_layer_id":0}},
            {"TextUpdate":{"id":5,"style_link":{"fill":{"Rgb":[0,0,1]},"underline":true}}}]"#,
    )
    .unwrap();
    let text = f.part(5, 0);
    assert_eq!(f.dom.link_style(text, "color"), Some("rgba(0,0,255,1)"));

    f.apply(r#"[{"TextUpdate":{"id":5,"content":"[a](b)"}}]"#)
        .unwrap();
    assert_eq!(f.dom.link_style(text, "text-decoration"), Some("underline"));
}

#[test]
fn button_click_and_empty_label() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"ButtonCreate":{"id":2,"occlusion_layer_id":0}},
            {"ButtonUpdate":{"id":2,"content":"","hover_color":{"Rgb":[1,1,1]},"border_radius":4,"size_x":80}}]"#,
    )
    .unwrap();
    let (button, container, text) = (f.part(2, 0), f.part(2, 1), f.part(2, 2));
    assert_eq!(f.dom.parent(text), Some(container));
    assert_eq!(f.dom.attribute(button, "class"), Some("button-styles"));
    assert_eq!(f.dom.inner_html(text), " ");
    assert_eq!(f.dom.style(button, "--hover-color"), Some("rgba(255,255,255,1)"));
    assert_eq!(f.dom.style(button, "border-radius"), Some("4px"));
    assert_eq!(f.dom.style(button, "width"), Some("80px"));
    assert_eq!(
        f.dom.fire(button, "click", &InputValue::None),
        [NativeInterrupt::FormButtonClick { id: 2 }]
    );
}

#[test]
fn checkbox_state_follows_the_core() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"CheckboxCreate":{"id":6,"occlusion_layer_id":0}},
            {"CheckboxUpdate":{"id":6,"checked":true,"background_checked":{"Rgb":[0,1,0]}}}]"#,
    )
    .unwrap();
    let input = f.part(6, 0);
    assert_eq!(f.dom.form(input).input_type.as_deref(), Some("checkbox"));
    assert!(f.dom.form(input).checked);
    assert_eq!(f.dom.style(input, "--checked-color"), Some("rgba(0,255,0,1)"));

    let events = f.dom.fire(input, "change", &InputValue::Checked(false));
    assert_eq!(events, [NativeInterrupt::FormCheckboxToggle { id: 6, state: false }]);
    assert!(f.dom.form(input).checked, "reverted until the core answers");
}

#[test]
fn textbox_value_padding_and_focus() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextboxCreate":{"id":7,"occlusion_layer_id":0}},
            {"TextboxUpdate":{"id":7,"text":"abc","size_x":100,"focus_on_mount":true}}]"#,
    )
    .unwrap();
    let input = f.part(7, 0);
    assert_eq!(f.dom.form(input).value, "abc");
    assert_eq!(f.dom.style(input, "width"), Some("90px"));
    assert_eq!(f.dom.focused(), Some(input));
    assert_eq!(
        f.dom.fire(input, "input", &InputValue::Text("abcd".into())),
        [NativeInterrupt::FormTextboxInput {
            id: 7,
            text: "abcd".into()
        }]
    );
    assert_eq!(
        f.dom.fire(input, "change", &InputValue::Text("abcd".into())),
        [NativeInterrupt::FormTextboxChange {
            id: 7,
            text: "abcd".into()
        }]
    );
}

#[test]
fn slider_writes_bounds_and_value() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"SliderCreate":{"id":8,"occlusion_layer_id":0}},
            {"SliderUpdate":{"id":8,"min":0,"max":10,"step":0.5,"value":5,"accent":{"Rgb":[1,0,0]}}}]"#,
    )
    .unwrap();
    let input = f.part(8, 0);
    let form = f.dom.form(input);
    assert_eq!(form.input_type.as_deref(), Some("range"));
    assert_eq!((form.min, form.max, form.step), (Some(0.0), Some(10.0), Some(0.5)));
    assert_eq!(form.value, "5");
    assert_eq!(f.dom.style(input, "accent-color"), Some("rgba(255,0,0,1)"));
    assert_eq!(
        f.dom.fire(input, "input", &InputValue::Number(6.5)),
        [NativeInterrupt::FormSliderChange { id: 8, value: 6.5 }]
    );
}

#[test]
fn dropdown_options_rebuild_through_the_pool() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"DropdownCreate":{"id":9,"occlusion_layer_id":0}},
            {"DropdownUpdate":{"id":9,"options":["a","b","c"],"selected_id":1}}]"#,
    )
    .unwrap();
    let select = f.part(9, 0);
    let options = f.native.options(9);
    assert_eq!(f.dom.children(select), options.as_slice());
    assert_eq!(f.dom.attribute(options[2], "value"), Some("2"));
    assert_eq!(f.dom.inner_html(options[2]), "c");
    assert_eq!(f.dom.form(select).selected_index, Some(1));

    f.apply(r#"[{"DropdownUpdate":{"id":9,"options":["x"],"selected_id":0}}]"#)
        .unwrap();
    assert_eq!(f.dom.children(select).len(), 1);
    assert_eq!(f.created(ElementKind::Option), 3);
    assert_eq!(f.available(ElementKind::Option), 2);
    assert_eq!(f.dom.form(select).selected_index, Some(0));
    assert_eq!(
        f.dom.fire(select, "change", &InputValue::Index(0)),
        [NativeInterrupt::FormDropdownChange {
            id: 9,
            selected_id: 0
        }]
    );
}

#[test]
fn text_content_is_rewritten_only_when_it_changes() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextCreate":{"id":4,"occlusion_layer_id":0}},
            {"TextUpdate":{"id":4,"content":"line"}}]"#,
    )
    .unwrap();
    let text = f.part(4, 0);
    // The host may serialize markup differently from how it was written.
    f.dom.set_inner_html(text, "<p>normalized</p>");
    f.apply(r#"[{"TextUpdate":{"id":4,"content":"line"}}]"#)
        .unwrap();
    assert_eq!(f.dom.inner_html(text), "<p>normalized</p>");

    f.apply(r#"[{"TextUpdate":{"id":4,"content":"other"}}]"#)
        .unwrap();
    assert_eq!(f.dom.inner_html(text), markdown::render("other"));
}

#[test]
fn text_switching_to_content_size_drops_explicit_size() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"TextCreate":{"id":6,"occlusion_layer_id":0}},
            {"TextUpdate":{"id":6,"size_x":30,"size_y":10}}]"#,
    )
    .unwrap();
    let leaf = f.leaf(6);
    assert_eq!(f.dom.style(leaf, "width"), Some("30px"));

    f.apply(r#"[{"TextUpdate":{"id":6,"size_x":-1}}]"#).unwrap();
    assert_eq!(f.dom.style(leaf, "width"), None);
    assert_eq!(f.dom.style(leaf, "height"), Some("10px"), "absent size is unchanged");
    assert!(f.dom.is_observed(leaf));
}

#[test]
fn radio_selection_out_of_range_is_ignored() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"RadioSetCreate":{"id":12,"occlusion_layer_id":0}},
            {"RadioSetUpdate":{"id":12,"options":["a","b"],"selected_id":4294967295}}]"#,
    )
    .unwrap();
    for [_, input, _] in widgets::radio_rows(&f.native.options(12)) {
        assert!(!f.dom.form(input).checked);
    }

    f.apply(r#"[{"RadioSetUpdate":{"id":12,"selected_id":2}}]"#)
        .unwrap();
    f.apply(r#"[{"RadioSetUpdate":{"id":12,"selected_id":0}}]"#)
        .unwrap();
    let rows = widgets::radio_rows(&f.native.options(12));
    assert!(f.dom.form(rows[0][1]).checked);
}

#[test]
fn radio_set_rows_and_selection() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"RadioSetCreate":{"id":10,"occlusion_layer_id":0}},
            {"RadioSetUpdate":{"id":10,"options":["one","two"],"selected_id":1,"background_checked":{"Rgb":[0,0,0]}}}]"#,
    )
    .unwrap();
    let fieldset = f.part(10, 0);
    let rows = widgets::radio_rows(&f.native.options(10));
    assert_eq!(rows.len(), 2);
    let [row, input, label] = rows[1];
    assert_eq!(f.dom.parent(row), Some(fieldset));
    assert_eq!(f.dom.parent(input), Some(row));
    assert_eq!(f.dom.attribute(input, "name"), Some("radio-10"));
    assert_eq!(f.dom.inner_html(label), "two");
    assert!(f.dom.form(input).checked);
    assert!(!f.dom.form(rows[0][1]).checked);
    assert_eq!(f.dom.style(fieldset, "--selected-color"), Some("rgba(0,0,0,1)"));
    assert_eq!(
        f.dom.fire(fieldset, "change", &InputValue::Index(0)),
        [NativeInterrupt::FormRadioSetChange {
            id: 10,
            selected_id: 0
        }]
    );

    f.apply(r#"[{"RadioSetDelete":10}]"#).unwrap();
    assert_eq!(f.available(ElementKind::Label), 2);
}

#[test]
fn scroller_overflow_and_sampler_lifetime() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"ScrollerCreate":{"id":11,"occlusion_layer_id":0}},
            {"ScrollerUpdate":{"id":11,"size_x":100,"size_y":100,"size_inner_pane_x":300,"size_inner_pane_y":50,"scroll_y":20}}]"#,
    )
    .unwrap();
    let leaf = f.leaf(11);
    let pane = f.part(11, 0);
    assert_eq!(f.dom.live_samplers(), 1);
    assert_eq!(f.dom.sampler_interval(leaf), Some(0));
    assert_eq!(f.dom.style(leaf, "overflow-x"), Some("auto"));
    assert_eq!(f.dom.style(leaf, "overflow-y"), Some("hidden"));
    assert_eq!(f.dom.style(pane, "width"), Some("300px"));
    assert_eq!(f.dom.form(leaf).scroll_top, 20.0);
    assert!(f.native.scroll_region(11).is_some());

    f.apply(r#"[{"ScrollerDelete":11}]"#).unwrap();
    assert_eq!(f.dom.live_samplers(), 0, "sampler cancelled with its region");
    assert!(f.native.scroll_deltas(0.0).is_empty());
}

#[test]
fn frames_hold_their_members() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"FrameCreate":{"id":20,"occlusion_layer_id":0}},
            {"FrameUpdate":{"id":20,"size_x":50,"size_y":40}},
            {"EventBlockerCreate":{"id":21,"parent_frame":20,"occlusion_layer_id":0}},
            {"EventBlockerUpdate":{"id":21,"size_x":10,"size_y":5}}]"#,
    )
    .unwrap();
    let leaf = f.leaf(21);
    let instance = f.native.layers().container_instance(20, 0).unwrap();
    assert_eq!(f.dom.parent(leaf), Some(instance));
    assert_eq!(f.dom.style(leaf, "width"), Some("10px"));
    assert!(f.dom.root_property("--container-20-clip-path").is_some());

    assert!(matches!(
        f.apply(r#"[{"FrameDelete":20}]"#),
        Err(Error::ContainerInUse { id: 20, .. })
    ));
    f.apply(r#"[{"EventBlockerDelete":21},{"FrameDelete":20}]"#)
        .unwrap();
    assert!(f.native.layers().container(20).is_none());
    assert_eq!(f.dom.root_property("--container-20-clip-path"), None);
}

#[test]
fn occlusion_update_moves_leaf_and_orders_focus() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"CheckboxCreate":{"id":30,"occlusion_layer_id":0}},
            {"OcclusionUpdate":{"id":30,"occlusion_layer_id":2,"z_index":5}}]"#,
    )
    .unwrap();
    let leaf = f.leaf(30);
    assert_eq!(f.native.layers().layer_count(), 3);
    assert_eq!(f.dom.parent(leaf), Some(f.overlay(2)));
    assert_eq!(f.native.layer_of(30), Some(2));
    assert_eq!(f.dom.style(leaf, "z-index"), Some("5"));
    assert_eq!(f.dom.attribute(f.part(30, 0), "tabindex"), Some("999995"));
    assert_eq!(f.core.added.len(), 3, "one surface per layer");
}

#[test]
fn late_radio_rows_inherit_tab_order() {
    let mut f = Fixture::new();
    f.apply(
        r#"[{"RadioSetCreate":{"id":31,"occlusion_layer_id":0}},
            {"OcclusionUpdate":{"id":31,"occlusion_layer_id":0,"z_index":10}},
            {"RadioSetUpdate":{"id":31,"options":["a"]}}]"#,
    )
    .unwrap();
    let [_, input, label] = widgets::radio_rows(&f.native.options(31))[0];
    assert_eq!(f.dom.attribute(input, "tabindex"), Some("999990"));
    assert_eq!(f.dom.attribute(label, "tabindex"), None);
}

#[test]
fn font_faces_load_once_across_elements() {
    let mut f = Fixture::new();
    let style = r#"{"font":{"Web":{"family":"Inter","url":"https://example.com/inter.woff2"}}}"#;
    let batch = alloc::format!(
        r#"[{{"TextCreate":{{"id":1,"occlusion_layer_id":0}}}},
            {{"ButtonCreate":{{"id":2,"occlusion_layer_id":0}}}},
            {{"TextUpdate":{{"id":1,"style":{style}}}}},
            {{"ButtonUpdate":{{"id":2,"style":{style}}}}}]"#
    );
    f.apply(&batch).unwrap();
    assert_eq!(f.dom.fonts().len(), 1);
    assert_eq!(f.dom.style(f.leaf(1), "font-family"), Some("\"Inter\""));
    assert_eq!(f.dom.style(f.part(2, 1), "font-family"), Some("\"Inter\""));
}

#[test]
fn image_loads_skip_cached_images() {
    let mut f = Fixture::new();
    f.core.loaded_images.insert("a.png".into());
    f.apply(
        r#"[{"ImageLoad":{"id":1,"path":"a.png"}},
            {"ImageLoad":{"id":2,"path":"b.png"}}]"#,
    )
    .unwrap();
    let images = f.dom.images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].path, "b.png");
    assert_eq!(images[0].retry, ChassisConfig::web().image_retry);
}
