//! Bridge WASM <-> JavaScript: đồng bộ thanh timeline theo cuộn trên DOM thật.
//!
//! Các entry point không phụ thuộc framework: Elementor, Gutenberg hay editor
//! cổ điển chỉ cần render đúng hợp đồng class rồi gọi `initTimelineAnimation`
//! / `initAllWidgets` đúng lúc.

mod error;
mod frame;
mod instance;
pub mod logging;
mod registry;
mod resolver;
mod roots;
mod watch;
mod wiring;

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use timeline_core::contract::{WRAPPER_ALT_SELECTOR, WRAPPER_SELECTOR};
use timeline_core::{AnimationConfig, LineStyle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::registry::Binding;

pub use error::WidgetError;
pub use instance::InstanceSnapshot;
pub use watch::{boot_timelines, watch_timelines};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsAnimationOptions {
    #[serde(default)]
    lerp: Option<f64>,
    #[serde(default)]
    add_epsilon_px: Option<f64>,
    #[serde(default)]
    remove_epsilon_px: Option<f64>,
    #[serde(default)]
    idle_stop_ms: Option<u32>,
    #[serde(default)]
    line_style: Option<LineStyle>,
    #[serde(default)]
    debug: Option<bool>,
}

impl From<JsAnimationOptions> for AnimationConfig {
    fn from(options: JsAnimationOptions) -> Self {
        let mut base = AnimationConfig::default();
        if let Some(lerp) = options.lerp {
            base.lerp = lerp;
        }
        if let Some(px) = options.add_epsilon_px {
            base.add_epsilon_px = px;
        }
        if let Some(px) = options.remove_epsilon_px {
            base.remove_epsilon_px = px;
        }
        if let Some(ms) = options.idle_stop_ms {
            base.idle_stop_ms = ms;
        }
        if let Some(style) = options.line_style {
            base.line_style = style;
        }
        if let Some(debug) = options.debug {
            base.debug = debug;
        }
        base.normalized()
    }
}

pub(crate) fn read_options(options: Option<JsValue>) -> AnimationConfig {
    let Some(options) = options.filter(|value| !value.is_undefined() && !value.is_null()) else {
        return AnimationConfig::default();
    };
    match from_value::<JsAnimationOptions>(options) {
        Ok(options) => AnimationConfig::from(options),
        Err(err) => {
            log::warn!("Bỏ qua options không đọc được: {err}");
            AnimationConfig::default()
        }
    }
}

fn prepare(options: Option<JsValue>) -> AnimationConfig {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let config = read_options(options);
    logging::init(config.debug);
    config
}

/// Gắn một widget. Trả về hàm gỡ, hoặc `null` khi scope không chứa timeline
/// có animation.
#[wasm_bindgen(js_name = initTimelineAnimation)]
pub fn init_timeline_animation(scope: JsValue, options: Option<JsValue>) -> JsValue {
    let config = prepare(options);
    match mount(&scope, config) {
        Ok(binding) => binding.teardown.into(),
        Err(err) if err.is_missing_contract() => {
            log::debug!("initTimelineAnimation bỏ qua: {err}");
            JsValue::NULL
        }
        Err(err) => {
            log::error!("initTimelineAnimation thất bại: {err}");
            JsValue::NULL
        }
    }
}

pub(crate) fn mount(scope: &JsValue, config: AnimationConfig) -> Result<Binding, WidgetError> {
    let scope = resolver::scope_element(scope).ok_or(WidgetError::NotAnElement)?;
    if let Some(existing) = registry::binding_for(&scope) {
        return Ok(existing);
    }
    if !scope.is_connected() {
        return Err(WidgetError::Detached);
    }

    let wrapper = resolver::find_wrapper(&scope).ok_or(WidgetError::MissingWrapper)?;
    if let Some(existing) = registry::alias(&scope, &wrapper) {
        return Ok(existing);
    }

    let instance = instance::Instance::attach(registry::next_id(), scope, wrapper, config)?;
    Ok(registry::register(instance))
}

/// Gắn mọi timeline dưới `root` (document hoặc element; mặc định là document
/// hiện tại). Hàm trả về gỡ tất cả.
#[wasm_bindgen(js_name = initAllWidgets)]
pub fn init_all_widgets(root: JsValue, options: Option<JsValue>) -> js_sys::Function {
    let config = prepare(options);
    let teardowns = init_all(&root, &config)
        .into_iter()
        .map(|binding| binding.teardown)
        .collect();
    teardown_all(teardowns)
}

pub(crate) fn init_all(root: &JsValue, config: &AnimationConfig) -> Vec<Binding> {
    let candidates = match SearchRoot::resolve(root) {
        Some(search) => search.wrapper_candidates(),
        None => {
            log::warn!("initAllWidgets: root không phải document hay element");
            Vec::new()
        }
    };
    log::debug!("initAllWidgets: {} wrapper ứng viên", candidates.len());

    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, wrapper)| match mount(wrapper.as_ref(), config.clone()) {
            Ok(binding) => Some(binding),
            Err(err) if err.is_missing_contract() => {
                log::debug!("wrapper #{index} bỏ qua: {err}");
                None
            }
            Err(err) => {
                log::error!("wrapper #{index} khởi tạo thất bại: {err}");
                None
            }
        })
        .collect()
}

pub(crate) fn teardown_all(teardowns: Vec<js_sys::Function>) -> js_sys::Function {
    let mut pending = teardowns;
    Closure::<dyn FnMut()>::new(move || {
        for teardown in std::mem::take(&mut pending) {
            if let Err(err) = teardown.call0(&JsValue::NULL) {
                log::error!("gỡ thất bại: {}", WidgetError::from(err));
            }
        }
    })
    .into_js_value()
    .unchecked_into()
}

/// Ảnh chụp của instance gắn với `element`, hoặc `null`.
#[wasm_bindgen(js_name = timelineState)]
pub fn timeline_state(element: JsValue) -> JsValue {
    let Some(element) = resolver::scope_element(&element) else {
        return JsValue::NULL;
    };
    let Some(instance) = registry::lookup(&element) else {
        return JsValue::NULL;
    };
    to_value(&instance.snapshot()).unwrap_or(JsValue::NULL)
}

enum SearchRoot {
    Document(Document),
    Element(Element),
}

impl SearchRoot {
    fn resolve(value: &JsValue) -> Option<Self> {
        if value.is_undefined() || value.is_null() {
            return web_sys::window()
                .and_then(|window| window.document())
                .map(SearchRoot::Document);
        }
        if let Some(document) = value.dyn_ref::<Document>() {
            return Some(SearchRoot::Document(document.clone()));
        }
        resolver::scope_element(value).map(SearchRoot::Element)
    }

    /// Mọi `.timeline-wrapper`, cùng các `.timeline` không nằm trong ứng viên
    /// khác.
    fn wrapper_candidates(&self) -> Vec<Element> {
        let selector = format!("{WRAPPER_SELECTOR}, {WRAPPER_ALT_SELECTOR}");
        let mut found = match self {
            SearchRoot::Document(document) => document
                .query_selector_all(&selector)
                .map(|list| {
                    (0..list.length())
                        .filter_map(|index| list.item(index))
                        .filter_map(|node| node.dyn_into::<Element>().ok())
                        .collect()
                })
                .unwrap_or_default(),
            SearchRoot::Element(element) => {
                let mut found = Vec::new();
                if element.matches(&selector).unwrap_or(false) {
                    found.push(element.clone());
                }
                found.extend(resolver::query_all(element, &selector));
                found
            }
        };

        found.retain(|candidate| {
            let nested = candidate
                .parent_element()
                .and_then(|parent| parent.closest(&selector).ok().flatten())
                .is_some();
            !nested
        });
        found
    }
}
