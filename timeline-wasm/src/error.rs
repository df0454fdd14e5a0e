use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Lý do không gắn được widget, hoặc một callback thất bại.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Scope không phải phần tử DOM")]
    NotAnElement,
    #[error("Scope chưa nằm trong document")]
    Detached,
    #[error("Không tìm thấy .timeline-wrapper hoặc .timeline trong scope")]
    MissingWrapper,
    #[error("Wrapper không có phần tử .timeline-line-animation")]
    MissingLine,
    #[error("Không có window")]
    NoWindow,
    #[error("Lỗi JavaScript: {0}")]
    Js(String),
}

impl WidgetError {
    /// Markup không chứa timeline có animation; không cần cảnh báo.
    pub fn is_missing_contract(&self) -> bool {
        matches!(
            self,
            WidgetError::NotAnElement
                | WidgetError::Detached
                | WidgetError::MissingWrapper
                | WidgetError::MissingLine
        )
    }
}

impl From<JsValue> for WidgetError {
    fn from(value: JsValue) -> Self {
        WidgetError::Js(describe_js(&value))
    }
}

pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Ranh giới callback: lỗi được ghi log, không ném ngược vào trang.
pub(crate) fn report(context: &str, result: Result<(), WidgetError>) {
    if let Err(err) = result {
        log::error!("{context}: {err}");
    }
}
