//! Thành phần giao diện timeline cho môi trường WebAssembly.
//!
//! Component dựng markup đúng hợp đồng class mà runtime `timeline-wasm` đọc,
//! gắn animation sau khi mount và gỡ khi unmount.

use serde::{Deserialize, Serialize};

/// Vị trí của panel so với đường timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPosition {
    Left,
    Right,
}

impl EntryPosition {
    /// Lớp CSS tương ứng; `timeline-inverted` đặt panel sang phải.
    pub fn class(self) -> &'static str {
        match self {
            EntryPosition::Left => "timeline-left",
            EntryPosition::Right => "timeline-inverted",
        }
    }

    /// Khi không chỉ định, các mục xen kẽ trái/phải bắt đầu từ trái.
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            EntryPosition::Left
        } else {
            EntryPosition::Right
        }
    }
}

/// Một mục trong timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub title: String,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Option<EntryPosition>,
}

impl TimelineEntry {
    pub fn resolved_position(&self, index: usize) -> EntryPosition {
        self.position
            .unwrap_or_else(|| EntryPosition::alternating(index))
    }
}

fn default_true() -> bool {
    true
}

/// Dữ liệu đầu vào của `mount_timeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
    #[serde(default)]
    pub items: Vec<TimelineEntry>,
    /// Tắt thì không render đường animation, runtime bỏ qua widget.
    #[serde(default = "default_true")]
    pub animate_line: bool,
    #[serde(default)]
    pub animate_marker: bool,
    #[serde(default)]
    pub debug: bool,
}

impl Default for TimelineData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            animate_line: true,
            animate_marker: false,
            debug: false,
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use super::{TimelineData, TimelineEntry};
    use serde::Serialize;
    use serde_wasm_bindgen::{from_value, to_value};
    use timeline_core::contract::{ITEM_CLASS, LINE_CLASS, TRIGGER_CLASS, WRAPPER_CLASS};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, Element, Window};
    use yew::prelude::*;

    #[derive(Serialize)]
    struct BindOptions {
        debug: bool,
    }

    #[derive(Properties, PartialEq)]
    pub struct TimelineViewProps {
        pub data: TimelineData,
    }

    #[function_component(TimelineView)]
    fn timeline_view(props: &TimelineViewProps) -> Html {
        let data = &props.data;
        let wrapper = use_node_ref();

        {
            let wrapper = wrapper.clone();
            let debug = data.debug;
            use_effect_with((), move |_| {
                let teardown = wrapper.cast::<Element>().and_then(|element| {
                    let options = to_value(&BindOptions { debug }).ok();
                    timeline_wasm::init_timeline_animation(element.into(), options)
                        .dyn_into::<js_sys::Function>()
                        .ok()
                });
                move || {
                    if let Some(teardown) = teardown {
                        let _ = teardown.call0(&JsValue::NULL);
                    }
                }
            });
        }

        html! {
            <div class={WRAPPER_CLASS} ref={wrapper}>
                if data.animate_line {
                    <div class={LINE_CLASS}></div>
                }
                <ul class="timeline">
                    if data.animate_marker {
                        <div class="timeline-animation-marker"></div>
                    }
                    { for data.items.iter().enumerate().map(|(index, entry)| render_entry(index, entry)) }
                </ul>
            </div>
        }
    }

    fn render_entry(index: usize, entry: &TimelineEntry) -> Html {
        let position = entry.resolved_position(index);
        html! {
            <li class={classes!(ITEM_CLASS, position.class())}>
                <div class="timeline-side">
                    { entry.side.clone().unwrap_or_default() }
                </div>
                <div class={TRIGGER_CLASS}></div>
                <div class="tl-circ"></div>
                <div class="timeline-panel">
                    <div class="tl-content">
                        <h3 class="tl-title">{ entry.title.clone() }</h3>
                        { entry.description.as_ref().map(render_description).unwrap_or_default() }
                    </div>
                </div>
            </li>
        }
    }

    fn render_description(text: &String) -> Html {
        html! { <p class="tl-desc-short">{ text.clone() }</p> }
    }

    #[wasm_bindgen]
    pub fn mount_timeline(selector: &str, data: JsValue) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let data: TimelineData = from_value(data)?;

        yew::Renderer::<TimelineView>::with_root_and_props(target, TimelineViewProps { data })
            .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_timeline;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_timeline(_: &str, _: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "timeline-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
