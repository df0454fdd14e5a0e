//! Cấu hình animation và cách ghi tiến trình lên thanh line.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::TimelineError;

/// Hệ số nội suy mặc định cho mỗi frame.
pub const DEFAULT_LERP: f64 = 0.12;
/// Khoảng hệ số nội suy được chấp nhận.
pub const LERP_RANGE: RangeInclusive<f64> = 0.08..=0.16;
/// Dưới ngưỡng này giá trị hiện tại được gán thẳng bằng đích.
pub const SNAP_EPSILON: f64 = 0.001;
/// Ngưỡng coi animation đã ổn định để dừng vòng lặp.
pub const SETTLE_EPSILON: f64 = 0.0005;
pub const DEFAULT_ADD_EPSILON_PX: f64 = 6.0;
pub const DEFAULT_REMOVE_EPSILON_PX: f64 = 10.0;
/// Thời gian không có scroll/resize trước khi dừng vòng lặp.
pub const DEFAULT_IDLE_STOP_MS: u32 = 700;

/// Cách biểu diễn tiến trình trên phần tử line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// `transform: scaleY(p)` với `transform-origin: top`.
    #[default]
    ScaleY,
    /// `height: p * 100%`.
    HeightPercent,
}

impl LineStyle {
    /// Thuộc tính CSS và giá trị tương ứng với tiến trình `progress`.
    pub fn render(self, progress: f64) -> (&'static str, String) {
        match self {
            LineStyle::ScaleY => ("transform", format!("scaleY({progress:.4})")),
            LineStyle::HeightPercent => ("height", format!("{:.2}%", progress * 100.0)),
        }
    }

    /// Các thuộc tính đặt một lần lúc khởi tạo.
    pub fn initial_properties(self) -> &'static [(&'static str, &'static str)] {
        match self {
            LineStyle::ScaleY => &[("transform-origin", "top"), ("transform", "scaleY(0)")],
            LineStyle::HeightPercent => &[("height", "0%")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub lerp: f64,
    /// Mark được coi là đã vượt qua khi tâm nằm trên đáy line cộng ngưỡng này.
    pub add_epsilon_px: f64,
    /// Chỉ gỡ trạng thái khi tâm mark vượt đáy line cộng ngưỡng này.
    pub remove_epsilon_px: f64,
    pub idle_stop_ms: u32,
    pub line_style: LineStyle,
    pub debug: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            lerp: DEFAULT_LERP,
            add_epsilon_px: DEFAULT_ADD_EPSILON_PX,
            remove_epsilon_px: DEFAULT_REMOVE_EPSILON_PX,
            idle_stop_ms: DEFAULT_IDLE_STOP_MS,
            line_style: LineStyle::default(),
            debug: false,
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), TimelineError> {
        if !self.lerp.is_finite() || !LERP_RANGE.contains(&self.lerp) {
            return Err(TimelineError::InvalidConfig(format!(
                "lerp = {} nằm ngoài khoảng {:?}",
                self.lerp, LERP_RANGE
            )));
        }
        if !self.add_epsilon_px.is_finite() || self.add_epsilon_px < 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "add_epsilon_px = {} phải là số không âm",
                self.add_epsilon_px
            )));
        }
        if !self.remove_epsilon_px.is_finite() || self.remove_epsilon_px < self.add_epsilon_px {
            return Err(TimelineError::InvalidConfig(format!(
                "remove_epsilon_px = {} phải lớn hơn hoặc bằng add_epsilon_px = {}",
                self.remove_epsilon_px, self.add_epsilon_px
            )));
        }
        Ok(())
    }

    /// Bản sao đã kẹp về các giá trị hợp lệ, dùng cho input từ JS.
    pub fn normalized(mut self) -> Self {
        let lerp = if self.lerp.is_finite() {
            self.lerp.clamp(*LERP_RANGE.start(), *LERP_RANGE.end())
        } else {
            DEFAULT_LERP
        };
        if lerp != self.lerp {
            log::debug!("lerp = {} ngoài khoảng cho phép, dùng {lerp}", self.lerp);
            self.lerp = lerp;
        }
        if !self.add_epsilon_px.is_finite() || self.add_epsilon_px < 0.0 {
            log::debug!(
                "add_epsilon_px = {} không hợp lệ, dùng {DEFAULT_ADD_EPSILON_PX}",
                self.add_epsilon_px
            );
            self.add_epsilon_px = DEFAULT_ADD_EPSILON_PX;
        }
        if !self.remove_epsilon_px.is_finite() || self.remove_epsilon_px < self.add_epsilon_px {
            let remove =
                self.add_epsilon_px + (DEFAULT_REMOVE_EPSILON_PX - DEFAULT_ADD_EPSILON_PX);
            log::debug!(
                "remove_epsilon_px = {} nhỏ hơn add_epsilon_px, dùng {remove}",
                self.remove_epsilon_px
            );
            self.remove_epsilon_px = remove;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AnimationConfig::default().validate().expect("mặc định phải hợp lệ");
    }

    #[test]
    fn lerp_outside_range_is_rejected_and_clamped() {
        let cfg = AnimationConfig {
            lerp: 0.5,
            ..AnimationConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(TimelineError::InvalidConfig(_))));
        assert_eq!(cfg.normalized().lerp, 0.16);
    }

    #[test]
    fn remove_epsilon_never_below_add_epsilon() {
        let cfg = AnimationConfig {
            add_epsilon_px: 12.0,
            remove_epsilon_px: 3.0,
            ..AnimationConfig::default()
        }
        .normalized();
        assert!(cfg.remove_epsilon_px >= cfg.add_epsilon_px);
        cfg.validate().expect("đã chuẩn hóa");
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let cfg = AnimationConfig {
            lerp: f64::NAN,
            add_epsilon_px: -1.0,
            remove_epsilon_px: f64::INFINITY,
            ..AnimationConfig::default()
        }
        .normalized();
        assert_eq!(cfg.lerp, DEFAULT_LERP);
        assert_eq!(cfg.add_epsilon_px, DEFAULT_ADD_EPSILON_PX);
        assert_eq!(cfg.remove_epsilon_px, DEFAULT_REMOVE_EPSILON_PX);
        assert_eq!(cfg.clone().normalized(), cfg);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: AnimationConfig =
            serde_json::from_str(r#"{ "lerp": 0.1, "line_style": "height_percent" }"#)
                .expect("json hợp lệ");
        assert_eq!(cfg.lerp, 0.1);
        assert_eq!(cfg.line_style, LineStyle::HeightPercent);
        assert_eq!(cfg.idle_stop_ms, DEFAULT_IDLE_STOP_MS);
    }

    #[test]
    fn line_style_rendering() {
        assert_eq!(
            LineStyle::ScaleY.render(0.3),
            ("transform", "scaleY(0.3000)".to_string())
        );
        assert_eq!(
            LineStyle::HeightPercent.render(1.0),
            ("height", "100.00%".to_string())
        );
    }
}
