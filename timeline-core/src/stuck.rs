//! Phân loại item "đã bị line vượt qua" và item gần tâm vùng nhìn nhất.

use crate::config::AnimationConfig;

/// Số đo của một item trong frame hiện tại.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemProbe {
    /// Tâm theo trục dọc của mark, cùng hệ tọa độ với đáy line.
    pub mark_center: f64,
    /// Item đang mang class trạng thái.
    pub stuck: bool,
}

/// Thay đổi tối thiểu cần áp lên DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckChange {
    Add,
    Remove,
    Keep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Chỉ số item gần tâm nhất.
    pub current: Option<usize>,
    pub changes: Vec<StuckChange>,
}

impl Classification {
    /// Trạng thái sau khi áp `changes` lên `probes`.
    pub fn resolved(&self, probes: &[ItemProbe]) -> Vec<bool> {
        probes
            .iter()
            .zip(&self.changes)
            .map(|(probe, change)| match change {
                StuckChange::Add => true,
                StuckChange::Remove => false,
                StuckChange::Keep => probe.stuck,
            })
            .collect()
    }
}

/// Bộ phân loại có trễ: ngưỡng thêm nhỏ hơn ngưỡng gỡ để tránh nhấp nháy
/// khi đáy line dừng ngay mép một mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StuckClassifier {
    add_epsilon: f64,
    remove_epsilon: f64,
}

impl StuckClassifier {
    pub fn new(add_epsilon: f64, remove_epsilon: f64) -> Self {
        Self {
            add_epsilon,
            remove_epsilon: remove_epsilon.max(add_epsilon),
        }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.add_epsilon_px, config.remove_epsilon_px)
    }

    pub fn classify(&self, line_bottom: f64, middle: f64, probes: &[ItemProbe]) -> Classification {
        let current = nearest(middle, probes);

        let changes = probes
            .iter()
            .enumerate()
            .map(|(index, probe)| {
                let is_current = current == Some(index);
                let passed = probe.mark_center <= line_bottom + self.add_epsilon;

                if (passed || is_current) && !probe.stuck {
                    StuckChange::Add
                } else if probe.stuck
                    && !passed
                    && !is_current
                    && probe.mark_center > line_bottom + self.remove_epsilon
                {
                    StuckChange::Remove
                } else {
                    StuckChange::Keep
                }
            })
            .collect();

        Classification { current, changes }
    }
}

impl Default for StuckClassifier {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

/// Item có tâm mark gần `middle` nhất; hòa thì lấy item đứng trước.
pub fn nearest(middle: f64, probes: &[ItemProbe]) -> Option<usize> {
    let mut best = None;
    let mut best_distance = f64::INFINITY;
    for (index, probe) in probes.iter().enumerate() {
        let distance = (probe.mark_center - middle).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Some(index);
        }
    }
    best
}
