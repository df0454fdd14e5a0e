//! Tìm wrapper, line, trigger, item và container cuộn trong markup do các
//! editor sinh ra.

use js_sys::Reflect;
use timeline_core::contract::{
    is_scrollable_overflow, ITEM_SELECTOR, LINE_SELECTOR, MARK_SELECTORS, TRIGGER_SELECTOR,
    WRAPPER_ALT_CLASS, WRAPPER_ALT_SELECTOR, WRAPPER_CLASS, WRAPPER_SELECTOR,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use crate::roots::dom_rect;

/// Container thấp hơn mức này không dùng làm vùng nhìn được.
const MIN_CONTAINER_HEIGHT: f64 = 2.0;

/// Một mục timeline và phần tử được đo tâm thay cho nó.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNodes {
    pub item: Element,
    pub mark: Element,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineNodes {
    pub triggers: Vec<Element>,
    pub items: Vec<ItemNodes>,
}

/// Nhận một element, hoặc một collection jQuery (Elementor truyền loại này vào
/// hook `element_ready`) và lấy phần tử đầu tiên.
pub fn scope_element(value: &JsValue) -> Option<Element> {
    if let Some(element) = value.dyn_ref::<Element>() {
        return Some(element.clone());
    }
    if !value.is_object() {
        return None;
    }
    let is_jquery = Reflect::get(value, &JsValue::from_str("jquery"))
        .map(|marker| !marker.is_undefined())
        .unwrap_or(false);
    if !is_jquery {
        return None;
    }
    Reflect::get_u32(value, 0)
        .ok()
        .and_then(|first| first.dyn_into::<Element>().ok())
}

/// Scope tự là wrapper, hoặc `.timeline-wrapper` rồi `.timeline` bên trong.
///
/// Đọc `classList` chứ không đọc `className`: trên SVG, `className` là
/// `SVGAnimatedString`.
pub fn find_wrapper(scope: &Element) -> Option<Element> {
    let classes = scope.class_list();
    if classes.contains(WRAPPER_CLASS) || classes.contains(WRAPPER_ALT_CLASS) {
        return Some(scope.clone());
    }
    query_first(scope, WRAPPER_SELECTOR).or_else(|| query_first(scope, WRAPPER_ALT_SELECTOR))
}

/// Tìm line trong wrapper trước, rồi trong scope được truyền vào (một số
/// layout đặt line ngang hàng với wrapper).
pub fn find_line(wrapper: &Element, scope: &Element) -> Option<HtmlElement> {
    let line = query_first(wrapper, LINE_SELECTOR).or_else(|| {
        if scope == wrapper {
            None
        } else {
            query_first(scope, LINE_SELECTOR)
        }
    })?;
    line.dyn_into::<HtmlElement>().ok()
}

/// Tổ tiên gần nhất có `overflow-y` đã tính cho phép cuộn. `None` nghĩa là
/// window cuộn.
pub fn scroll_parent(window: &Window, node: &Element) -> Option<Element> {
    let mut current = node.parent_element();
    while let Some(candidate) = current {
        let overflow = window
            .get_computed_style(&candidate)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("overflow-y").ok());
        if overflow.as_deref().is_some_and(is_scrollable_overflow) {
            return Some(candidate);
        }
        current = candidate.parent_element();
    }
    None
}

/// Theme đôi khi đặt `overflow: auto` lên `html`/`body` dù chúng không phải
/// vùng nhìn thật; container bị co lại cũng không dùng được.
pub fn should_fallback_to_window(document: Option<&Document>, container: &Element) -> bool {
    if dom_rect(container).height < MIN_CONTAINER_HEIGHT {
        return true;
    }
    let Some(document) = document else {
        return false;
    };
    let is_body = document
        .body()
        .is_some_and(|body| AsRef::<Element>::as_ref(&body) == container);
    let is_root = document
        .document_element()
        .is_some_and(|root| &root == container);
    is_body || is_root
}

/// Container cuộn thực tế của `wrapper`; `None` nghĩa là dùng window.
pub fn scroll_container(window: &Window, wrapper: &Element) -> Option<Element> {
    let container = scroll_parent(window, wrapper)?;
    if should_fallback_to_window(window.document().as_ref(), &container) {
        log::debug!(
            "container cuộn <{}> không dùng được, chuyển sang window",
            container.tag_name().to_lowercase()
        );
        return None;
    }
    Some(container)
}

pub fn collect_nodes(wrapper: &Element) -> TimelineNodes {
    let triggers = query_all(wrapper, TRIGGER_SELECTOR);
    let items = query_all(wrapper, ITEM_SELECTOR)
        .into_iter()
        .map(|item| {
            let mark = MARK_SELECTORS
                .iter()
                .find_map(|selector| query_first(&item, selector))
                .unwrap_or_else(|| item.clone());
            ItemNodes { item, mark }
        })
        .collect();
    TimelineNodes { triggers, items }
}

pub(crate) fn query_first(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
