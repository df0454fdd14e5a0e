//! Hợp đồng class DOM mà các lớp render (Elementor, Gutenberg, Classic) tạo ra.

/// Class của phần tử gốc một widget.
pub const WRAPPER_CLASS: &str = "timeline-wrapper";
/// Class gốc thay thế (danh sách `ul.timeline`).
pub const WRAPPER_ALT_CLASS: &str = "timeline";
/// Thanh tiến trình được animate.
pub const LINE_CLASS: &str = "timeline-line-animation";
pub const TRIGGER_CLASS: &str = "tl-trigger";
pub const ITEM_CLASS: &str = "timeline-item";
pub const STUCK_CLASS: &str = "is-stuck";

pub const WRAPPER_SELECTOR: &str = ".timeline-wrapper";
pub const WRAPPER_ALT_SELECTOR: &str = ".timeline";
pub const LINE_SELECTOR: &str = ".timeline-line-animation";
pub const TRIGGER_SELECTOR: &str = ".tl-trigger";

/// Item: `li.timeline-item`, `.timeline-item` và block item của Gutenberg.
pub const ITEM_SELECTOR: &str = "li.timeline-item, .timeline-item, .wp-block-za-timeline-item";

/// Thứ tự tìm phần tử mark trong một item; không có thì dùng chính item.
pub const MARK_SELECTORS: [&str; 3] = [".tl-mark", ".tl-circ", ".tl-trigger"];

/// Tổ tiên dùng để log trigger ở chế độ debug.
pub const DEBUG_BLOCK_SELECTORS: [&str; 4] = ["li", ".timeline-item", ".wp-block", ".elementor-widget"];

/// Giá trị `overflow-y` biến một phần tử thành vùng cuộn.
pub const SCROLLABLE_OVERFLOW: [&str; 3] = ["auto", "scroll", "overlay"];

/// Kiểm tra một giá trị `overflow-y` đã tính.
pub fn is_scrollable_overflow(value: &str) -> bool {
    let value = value.trim();
    SCROLLABLE_OVERFLOW.iter().any(|candidate| *candidate == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_values() {
        assert!(is_scrollable_overflow("auto"));
        assert!(is_scrollable_overflow(" overlay "));
        assert!(!is_scrollable_overflow("hidden"));
        assert!(!is_scrollable_overflow("visible"));
    }
}
