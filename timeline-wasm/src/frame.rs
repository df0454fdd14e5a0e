//! Nhận biết iframe cùng origin trong màn hình preview của editor.

use js_sys::{Object, Reflect};
use wasm_bindgen::JsValue;
use web_sys::{Element, Window};

/// Những gì document này thấy được từ window nhúng nó.
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    in_iframe: bool,
    parent: Option<Window>,
    frame_element: Option<Element>,
}

impl FrameContext {
    pub fn detect(window: &Window) -> Self {
        if !is_nested(window) {
            return Self::default();
        }

        let parent = match window.parent() {
            Ok(Some(parent)) => parent,
            _ => {
                log::debug!("đang trong iframe, không lấy được window cha");
                return Self::nested_only();
            }
        };

        // Window cha khác origin ném lỗi khi đọc `document`.
        match Reflect::get(&parent, &JsValue::from_str("document")) {
            Ok(document) if !document.is_undefined() && !document.is_null() => {}
            Ok(_) => return Self::nested_only(),
            Err(_) => {
                log::warn!("đang trong iframe, window cha khác origin, không truy cập được");
                return Self::nested_only();
            }
        }

        let frame_element = window.frame_element().ok().flatten();
        log::debug!(
            "đang trong iframe, truy cập được window cha, frame element: {}",
            if frame_element.is_some() { "có" } else { "bị ẩn" }
        );

        Self {
            in_iframe: true,
            parent: Some(parent),
            frame_element,
        }
    }

    fn nested_only() -> Self {
        Self {
            in_iframe: true,
            ..Self::default()
        }
    }

    pub fn in_iframe(&self) -> bool {
        self.in_iframe
    }

    /// Window cha, chỉ khi cùng origin.
    pub fn parent(&self) -> Option<&Window> {
        self.parent.as_ref()
    }

    /// Window cha cùng element iframe chứa trang này; cần cả hai để đổi rect
    /// sang tọa độ của window cha.
    pub fn parent_coordinates(&self) -> Option<(&Window, &Element)> {
        Some((self.parent.as_ref()?, self.frame_element.as_ref()?))
    }
}

fn is_nested(window: &Window) -> bool {
    match window.top() {
        Ok(Some(top)) => !Object::is(window.as_ref(), top.as_ref()),
        Ok(None) => false,
        Err(_) => true,
    }
}
