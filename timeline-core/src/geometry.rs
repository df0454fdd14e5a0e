//! Hình học tối thiểu: hình chữ nhật bao và vùng nhìn theo trục dọc.

use serde::{Deserialize, Serialize};

/// Tương đương `DOMRect`, tọa độ theo viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            left,
            right: left + width,
            width,
            height,
        }
    }

    /// Hình chữ nhật chỉ quan tâm trục dọc.
    pub fn vertical(top: f64, height: f64) -> Self {
        Self::new(top, 0.0, 0.0, height)
    }

    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Dịch sang hệ tọa độ của `origin` (ví dụ: iframe nhìn từ cửa sổ cha).
    /// Chiều rộng và chiều cao giữ nguyên.
    pub fn offset_by(&self, origin: &Rect) -> Self {
        Self {
            top: origin.top + self.top,
            bottom: origin.top + self.bottom,
            left: origin.left + self.left,
            right: origin.left + self.right,
            width: self.width,
            height: self.height,
        }
    }
}

/// Vùng nhìn của scroll root theo trục dọc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub bottom: f64,
}

impl Viewport {
    /// Vùng nhìn của window: từ 0 tới `innerHeight`.
    pub fn window(inner_height: f64) -> Self {
        Self {
            top: 0.0,
            bottom: inner_height,
        }
    }

    pub fn of_rect(rect: &Rect) -> Self {
        Self {
            top: rect.top,
            bottom: rect.top + rect.height,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn middle(&self) -> f64 {
        self.top + self.height() / 2.0
    }

    /// Phần tử giao với vùng nhìn (không tính chạm mép).
    pub fn intersects(&self, rect: &Rect) -> bool {
        rect.bottom > self.top && rect.top < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_translates_edges_only() {
        let local = Rect::new(10.0, 5.0, 100.0, 40.0);
        let frame = Rect::new(200.0, 30.0, 800.0, 600.0);
        let moved = local.offset_by(&frame);

        assert_eq!(moved.top, 210.0);
        assert_eq!(moved.bottom, 250.0);
        assert_eq!(moved.left, 35.0);
        assert_eq!(moved.right, 135.0);
        assert_eq!(moved.width, 100.0);
        assert_eq!(moved.height, 40.0);
    }

    #[test]
    fn element_viewport_middle() {
        let viewport = Viewport::of_rect(&Rect::vertical(100.0, 400.0));
        assert_eq!(viewport.middle(), 300.0);
        assert_eq!(Viewport::window(800.0).middle(), 400.0);
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let viewport = Viewport::window(800.0);
        assert!(!viewport.intersects(&Rect::vertical(800.0, 50.0)));
        assert!(!viewport.intersects(&Rect::vertical(-50.0, 50.0)));
        assert!(viewport.intersects(&Rect::vertical(-50.0, 51.0)));
    }
}
