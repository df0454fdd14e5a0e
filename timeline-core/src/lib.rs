//! Logic lõi đồng bộ thanh tiến trình timeline theo vị trí cuộn.
//!
//! Crate này không phụ thuộc DOM: mọi phép đo được đưa vào qua trait
//! [`ScrollRoot`], nên có thể kiểm thử trên host và tái sử dụng cho
//! bridge WebAssembly lẫn công cụ mô phỏng.

pub mod config;
pub mod contract;
pub mod driver;
pub mod geometry;
pub mod root;
pub mod sim;
pub mod stuck;

pub use config::{AnimationConfig, LineStyle};
pub use driver::{AnimationDriver, Tick};
pub use geometry::{Rect, Viewport};
pub use root::{in_view, raw_progress, target_progress, RootKind, ScrollRoot};
pub use stuck::{Classification, ItemProbe, StuckChange, StuckClassifier};

/// Lỗi chung của lõi timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Cấu hình không hợp lệ: {0}")]
    InvalidConfig(String),
    #[error("Kịch bản mô phỏng không hợp lệ: {0}")]
    InvalidScenario(String),
}
