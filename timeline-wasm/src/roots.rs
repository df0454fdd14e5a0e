//! Ba loại root cuộn: window, element cuộn được và frame cha.

use timeline_core::{Rect, RootKind, ScrollRoot, Viewport};
use web_sys::{Element, Window};

use crate::frame::FrameContext;

pub type DomRoot = Box<dyn ScrollRoot<Node = Element>>;

pub(crate) fn dom_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect {
        top: rect.top(),
        bottom: rect.bottom(),
        left: rect.left(),
        right: rect.right(),
        width: rect.width(),
        height: rect.height(),
    }
}

/// `innerHeight`, nếu không có thì dùng `clientHeight` của phần tử gốc.
pub(crate) fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .filter(|height| *height > 0.0)
        .or_else(|| {
            window
                .document()
                .and_then(|document| document.document_element())
                .map(|root| f64::from(root.client_height()))
        })
        .unwrap_or_default()
}

pub struct WindowRoot {
    window: Window,
}

impl WindowRoot {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ScrollRoot for WindowRoot {
    type Node = Element;

    fn kind(&self) -> RootKind {
        RootKind::Window
    }

    fn viewport(&self) -> Viewport {
        Viewport::window(viewport_height(&self.window))
    }

    fn rect(&self, node: &Element) -> Rect {
        dom_rect(node)
    }
}

/// Tổ tiên cuộn được đóng vai vùng nhìn.
pub struct ElementRoot {
    container: Element,
}

impl ElementRoot {
    pub fn new(container: Element) -> Self {
        Self { container }
    }
}

impl ScrollRoot for ElementRoot {
    type Node = Element;

    fn kind(&self) -> RootKind {
        RootKind::Element
    }

    fn viewport(&self) -> Viewport {
        Viewport::of_rect(&dom_rect(&self.container))
    }

    fn rect(&self, node: &Element) -> Rect {
        dom_rect(node)
    }
}

/// Hình học tính theo vùng nhìn của window nhúng: tiến trình bám theo những gì
/// người dùng thấy ở trang editor bên ngoài, không theo vị trí cuộn của iframe.
pub struct ParentFrameRoot {
    parent: Window,
    frame: Element,
}

impl ParentFrameRoot {
    pub fn new(parent: Window, frame: Element) -> Self {
        Self { parent, frame }
    }
}

impl ScrollRoot for ParentFrameRoot {
    type Node = Element;

    fn kind(&self) -> RootKind {
        RootKind::ParentFrame
    }

    fn viewport(&self) -> Viewport {
        Viewport::window(viewport_height(&self.parent))
    }

    fn rect(&self, node: &Element) -> Rect {
        dom_rect(node).offset_by(&dom_rect(&self.frame))
    }
}

/// Chọn root một lần cho mỗi instance. Có tọa độ frame cha thì luôn ưu tiên.
pub fn select(window: &Window, container: Option<&Element>, frame: &FrameContext) -> DomRoot {
    if let Some((parent, frame_element)) = frame.parent_coordinates() {
        return Box::new(ParentFrameRoot::new(parent.clone(), frame_element.clone()));
    }
    match container {
        Some(container) => Box::new(ElementRoot::new(container.clone())),
        None => Box::new(WindowRoot::new(window.clone())),
    }
}
