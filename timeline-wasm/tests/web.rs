#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Reflect};
use timeline_wasm::{init_all_widgets, init_timeline_animation, timeline_state, watch_timelines};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const TIMELINE_HTML: &str = r#"
<div class="timeline-wrapper" style="position: relative; height: 1200px;">
  <div class="timeline-line-animation" style="position: absolute; top: 0; width: 2px; height: 100%;"></div>
  <ul class="timeline">
    <li class="timeline-item" style="height: 300px;"><div class="tl-trigger"></div><div class="tl-circ"></div></li>
    <li class="timeline-item" style="height: 300px;"><div class="tl-trigger"></div><div class="tl-circ"></div></li>
    <li class="timeline-item" style="height: 300px;"><div class="tl-trigger"></div><div class="tl-circ"></div></li>
  </ul>
</div>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn fixture(html: &str) -> Element {
    let document = document();
    let host = document.create_element("section").unwrap();
    host.set_inner_html(html);
    document.body().unwrap().append_child(&host).unwrap();
    host
}

fn wrapper_of(host: &Element) -> Element {
    host.query_selector(".timeline-wrapper").unwrap().unwrap()
}

fn line_of(host: &Element) -> HtmlElement {
    host.query_selector(".timeline-line-animation")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn state_field(element: &Element, field: &str) -> JsValue {
    let state = timeline_state(element.clone().into());
    assert!(!state.is_null(), "no live instance for element");
    Reflect::get(&state, &JsValue::from_str(field)).unwrap()
}

fn state_str(element: &Element, field: &str) -> String {
    state_field(element, field).as_string().unwrap_or_default()
}

fn line_scale(host: &Element) -> f64 {
    let transform = line_of(host).style().get_property_value("transform").unwrap();
    transform
        .trim_start_matches("scaleY(")
        .trim_end_matches(')')
        .parse()
        .unwrap_or_else(|_| panic!("unexpected transform {transform}"))
}

async fn dispatch_scroll_and_resize() {
    let window = web_sys::window().unwrap();
    window.dispatch_event(&Event::new("scroll").unwrap()).unwrap();
    window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
    TimeoutFuture::new(100).await;
}

fn call(teardown: &JsValue) {
    teardown
        .dyn_ref::<Function>()
        .expect("teardown is a function")
        .call0(&JsValue::NULL)
        .unwrap();
}

#[wasm_bindgen_test]
async fn init_is_idempotent_for_scope_and_wrapper() {
    let host = fixture(TIMELINE_HTML);
    let wrapper = wrapper_of(&host);
    let first = init_timeline_animation(host.clone().into(), None);
    let second = init_timeline_animation(host.clone().into(), None);
    let via_wrapper = init_timeline_animation(wrapper.clone().into(), None);

    assert!(first.is_function());
    assert_eq!(first, second);
    assert_eq!(first, via_wrapper);

    dispatch_scroll_and_resize().await;
    assert_eq!(state_field(&wrapper, "running").as_bool(), Some(true));
    let target = state_field(&wrapper, "target").as_f64().unwrap();
    assert!((0.0..=1.0).contains(&target));

    // Một lần gỡ phải tắt mọi listener: nếu lần gọi lặp gắn thêm bộ thứ hai,
    // line vẫn sẽ bị ghi.
    call(&first);
    line_of(&host)
        .style()
        .set_property("transform", "scaleY(0.42)")
        .unwrap();
    dispatch_scroll_and_resize().await;
    assert_eq!(
        line_of(&host).style().get_property_value("transform").unwrap(),
        "scaleY(0.42)"
    );
    assert!(timeline_state(host.clone().into()).is_null());
    assert!(timeline_state(wrapper.into()).is_null());
    host.remove();
}

#[wasm_bindgen_test]
fn jquery_scope_resolves_to_first_element() {
    let host = fixture(TIMELINE_HTML);
    let jquery_like = Object::new();
    Reflect::set(&jquery_like, &JsValue::from_str("jquery"), &JsValue::from_str("3.7.1")).unwrap();
    Reflect::set(&jquery_like, &JsValue::from_f64(0.0), &host).unwrap();

    let from_jquery = init_timeline_animation(jquery_like.into(), None);
    let direct = init_timeline_animation(host.clone().into(), None);
    assert!(from_jquery.is_function());
    assert_eq!(from_jquery, direct);

    call(&direct);
    host.remove();
}

#[wasm_bindgen_test]
fn missing_contract_returns_null() {
    let no_wrapper = fixture("<div class=\"something-else\"></div>");
    assert!(init_timeline_animation(no_wrapper.clone().into(), None).is_null());

    let no_line = fixture("<div class=\"timeline-wrapper\"><ul class=\"timeline\"></ul></div>");
    assert!(init_timeline_animation(no_line.clone().into(), None).is_null());
    assert!(timeline_state(wrapper_of(&no_line).into()).is_null());

    assert!(init_timeline_animation(JsValue::from_str("#not-an-element"), None).is_null());

    no_wrapper.remove();
    no_line.remove();
}

#[wasm_bindgen_test]
fn init_all_without_wrappers_is_a_no_op() {
    let host = fixture("<p>plain content</p>");
    let teardown = init_all_widgets(host.clone().into(), None);
    teardown.call0(&JsValue::NULL).unwrap();
    teardown.call0(&JsValue::NULL).unwrap();
    host.remove();
}

#[wasm_bindgen_test]
fn init_all_binds_the_outer_wrapper_only() {
    let host = fixture(TIMELINE_HTML);
    let teardown = init_all_widgets(host.clone().into(), None);

    let wrapper = wrapper_of(&host);
    let list = host.query_selector("ul.timeline").unwrap().unwrap();
    assert_eq!(state_field(&wrapper, "items").as_f64(), Some(3.0));
    assert!(timeline_state(list.into()).is_null());

    teardown.call0(&JsValue::NULL).unwrap();
    assert!(timeline_state(wrapper.into()).is_null());
    host.remove();
}

#[wasm_bindgen_test]
fn options_select_line_style() {
    let host = fixture(TIMELINE_HTML);
    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("lineStyle"),
        &JsValue::from_str("height_percent"),
    )
    .unwrap();

    let teardown = init_timeline_animation(host.clone().into(), Some(options.into()));
    assert!(teardown.is_function());
    let height = line_of(&host).style().get_property_value("height").unwrap();
    assert!(height.ends_with('%'), "unexpected height {height}");

    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
async fn teardown_stops_all_updates() {
    let host = fixture(TIMELINE_HTML);
    let teardown = init_timeline_animation(host.clone().into(), None);
    assert!(teardown.is_function());
    TimeoutFuture::new(50).await;

    call(&teardown);
    assert!(timeline_state(host.clone().into()).is_null());

    let line = line_of(&host);
    line.style().set_property("transform", "scaleY(0.42)").unwrap();

    let items = host.query_selector_all("li.timeline-item").unwrap();
    for index in 0..items.length() {
        let item: Element = items.item(index).unwrap().dyn_into().unwrap();
        item.class_list().remove_1("is-stuck").unwrap();
    }
    let list = host.query_selector("ul.timeline").unwrap().unwrap();
    let second: Element = items.item(1).unwrap().dyn_into().unwrap();
    second.remove();
    let fresh = document().create_element("li").unwrap();
    fresh.set_class_name("timeline-item");
    fresh.set_inner_html("<div class=\"tl-trigger\"></div><div class=\"tl-circ\"></div>");
    list.append_child(&fresh).unwrap();

    dispatch_scroll_and_resize().await;

    assert_eq!(
        line.style().get_property_value("transform").unwrap(),
        "scaleY(0.42)"
    );
    assert!(host.query_selector(".is-stuck").unwrap().is_none());
    assert!(timeline_state(host.clone().into()).is_null());
    assert!(timeline_state(wrapper_of(&host).into()).is_null());

    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
async fn re_rendered_items_are_picked_up() {
    let host = fixture(TIMELINE_HTML);
    let teardown = init_timeline_animation(host.clone().into(), None);
    let wrapper = wrapper_of(&host);
    assert_eq!(state_field(&wrapper, "items").as_f64(), Some(3.0));

    let list = host.query_selector("ul.timeline").unwrap().unwrap();
    let items = host.query_selector_all("li.timeline-item").unwrap();
    let second: Element = items.item(1).unwrap().dyn_into().unwrap();
    second.remove();
    let fresh = document().create_element("li").unwrap();
    fresh.set_class_name("timeline-item");
    fresh.set_inner_html("<div class=\"tl-trigger\"></div><div class=\"tl-circ\"></div>");
    list.append_child(&fresh).unwrap();

    TimeoutFuture::new(50).await;
    assert_eq!(state_field(&wrapper, "items").as_f64(), Some(3.0));
    assert_eq!(state_field(&wrapper, "triggers").as_f64(), Some(3.0));

    let items = host.query_selector_all("li.timeline-item").unwrap();
    let last: Element = items.item(2).unwrap().dyn_into().unwrap();
    assert_eq!(last, fresh);

    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
async fn watcher_binds_widgets_inserted_later() {
    let host = fixture("<div class=\"placeholder\"></div>");
    let stop = watch_timelines(host.clone().into(), None);

    let late = document().create_element("div").unwrap();
    late.set_inner_html(TIMELINE_HTML);
    host.append_child(&late).unwrap();
    TimeoutFuture::new(250).await;

    let wrapper = wrapper_of(&host);
    assert_eq!(state_field(&wrapper, "items").as_f64(), Some(3.0));

    stop.call0(&JsValue::NULL).unwrap();
    assert!(timeline_state(wrapper.into()).is_null());
    stop.call0(&JsValue::NULL).unwrap();
    host.remove();
}

#[wasm_bindgen_test]
fn wrapper_scope_is_detected_from_class_list() {
    let host = fixture(TIMELINE_HTML);
    let wrapper = wrapper_of(&host);
    wrapper.class_list().add_1("wp-block").unwrap();

    let teardown = init_timeline_animation(wrapper.clone().into(), None);
    assert!(teardown.is_function());
    assert_eq!(state_field(&wrapper, "items").as_f64(), Some(3.0));

    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
fn svg_scope_does_not_throw() {
    let host = fixture("");
    let svg = document()
        .create_element_ns(Some("http://www.w3.org/2000/svg"), "svg")
        .unwrap();
    svg.set_attribute("class", "timeline-wrapper").unwrap();
    host.append_child(&svg).unwrap();

    assert!(init_timeline_animation(svg.clone().into(), None).is_null());
    assert!(timeline_state(svg.into()).is_null());
    host.remove();
}

#[wasm_bindgen_test]
fn window_drives_an_unscrolled_page() {
    let host = fixture(TIMELINE_HTML);
    let teardown = init_timeline_animation(host.clone().into(), None);
    assert_eq!(state_str(&wrapper_of(&host), "frameMode"), "window");
    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
async fn scrollable_ancestor_drives_progress() {
    let host = fixture(&format!(
        "<div class=\"scroller\" style=\"height: 300px; overflow-y: auto;\">{TIMELINE_HTML}</div>"
    ));
    let scroller = host.query_selector(".scroller").unwrap().unwrap();
    let teardown = init_timeline_animation(host.clone().into(), None);
    let wrapper = wrapper_of(&host);
    assert_eq!(state_str(&wrapper, "frameMode"), "element");

    // Tâm container 300px nằm cách mép trên wrapper 1200px đúng 150px.
    TimeoutFuture::new(50).await;
    let before = state_field(&wrapper, "target").as_f64().unwrap();
    assert!((before - 0.125).abs() < 0.02, "target {before}");

    scroller.set_scroll_top(600);
    TimeoutFuture::new(300).await;

    let target = state_field(&wrapper, "target").as_f64().unwrap();
    assert!((target - 0.625).abs() < 0.02, "target {target}");
    let scale = line_scale(&host);
    assert!(scale > 0.2, "line did not follow the container: {scale}");
    assert!(scale <= target + 1e-6);

    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
fn collapsed_container_falls_back_to_window() {
    let host = fixture(&format!(
        "<div style=\"height: 1px; overflow-y: auto;\">{TIMELINE_HTML}</div>"
    ));
    let teardown = init_timeline_animation(host.clone().into(), None);
    assert_eq!(state_str(&wrapper_of(&host), "frameMode"), "window");
    call(&teardown);
    host.remove();
}

#[wasm_bindgen_test]
fn scrolling_body_falls_back_to_window() {
    let body = document().body().unwrap();
    body.style().set_property("overflow-y", "auto").unwrap();

    let host = fixture(TIMELINE_HTML);
    let teardown = init_timeline_animation(host.clone().into(), None);
    let mode = state_str(&wrapper_of(&host), "frameMode");

    call(&teardown);
    host.remove();
    body.style().remove_property("overflow-y").unwrap();
    assert_eq!(mode, "window");
}
