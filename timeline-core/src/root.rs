//! Trừu tượng "scroll root" và phép tính tiến trình thô.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Viewport};

/// Loại scroll root, chọn một lần lúc khởi tạo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootKind {
    Window,
    Element,
    ParentFrame,
}

/// Nguồn đo hình học cho engine và bộ phân loại.
///
/// Mỗi cài đặt quyết định hệ tọa độ: window, một phần tử cuộn riêng,
/// hoặc cửa sổ cha khi chạy trong iframe cùng origin. Engine không bao giờ
/// tự rẽ nhánh theo loại root.
pub trait ScrollRoot {
    type Node: ?Sized;

    fn kind(&self) -> RootKind;

    /// Vùng nhìn hiện tại trong hệ tọa độ của root.
    fn viewport(&self) -> Viewport;

    /// Hình chữ nhật bao của `node`, đã quy đổi về hệ tọa độ của root.
    fn rect(&self, node: &Self::Node) -> Rect;
}

/// Tiến trình thô 0..1 của wrapper so với điểm giữa vùng nhìn.
pub fn raw_progress(viewport: Viewport, wrapper: Rect) -> f64 {
    let middle = viewport.middle();
    if wrapper.top < middle && wrapper.bottom > viewport.top {
        if wrapper.height <= 0.0 {
            return 1.0;
        }
        ((middle - wrapper.top) / wrapper.height).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn target_progress<R>(root: &R, wrapper: &R::Node) -> f64
where
    R: ScrollRoot + ?Sized,
{
    raw_progress(root.viewport(), root.rect(wrapper))
}

/// Wrapper đang nằm trong vùng nhìn của root.
pub fn in_view<R>(root: &R, wrapper: &R::Node) -> bool
where
    R: ScrollRoot + ?Sized,
{
    root.viewport().intersects(&root.rect(wrapper))
}
