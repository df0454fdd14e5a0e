//! Trạng thái vòng lặp animation: làm mượt tiến trình và quyết định
//! có cần xin thêm frame hay không.

use crate::config::{AnimationConfig, SETTLE_EPSILON, SNAP_EPSILON};

/// Kết quả của một frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Giá trị cần ghi lên line.
    pub progress: f64,
    /// Cần xin thêm một frame nữa.
    pub reschedule: bool,
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    lerp: f64,
    current: f64,
    last_target: Option<f64>,
    running: bool,
}

impl AnimationDriver {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            lerp: config.lerp,
            current: 0.0,
            last_target: None,
            running: false,
        }
    }

    pub fn progress(&self) -> f64 {
        self.current
    }

    pub fn last_target(&self) -> Option<f64> {
        self.last_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Bật vòng lặp. Trả về `true` nếu trước đó đang dừng, khi đó bên gọi
    /// phải xin một frame (trừ khi đã có frame đang chờ).
    ///
    /// Đích cũ bị quên để frame đầu tiên không bị coi là đã ổn định.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_target = None;
        true
    }

    /// Dừng vòng lặp; `current` được giữ nguyên để lần bật sau nối tiếp mượt.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self, target: f64) -> Tick {
        if self.last_target == Some(target) && (self.current - target).abs() < SETTLE_EPSILON {
            self.current = target;
            self.running = false;
            return Tick {
                progress: self.current,
                reschedule: false,
            };
        }
        self.last_target = Some(target);

        self.current += (target - self.current) * self.lerp;
        if (self.current - target).abs() < SNAP_EPSILON {
            self.current = target;
        }

        Tick {
            progress: self.current,
            reschedule: self.running || (self.current - target).abs() > SETTLE_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> AnimationDriver {
        AnimationDriver::new(&AnimationConfig::default())
    }

    #[test]
    fn start_is_edge_triggered() {
        let mut driver = driver();
        assert!(driver.start());
        assert!(!driver.start());
        driver.stop();
        assert!(driver.start());
    }

    #[test]
    fn first_tick_moves_by_lerp_fraction() {
        let mut driver = driver();
        driver.start();
        let tick = driver.tick(1.0);
        assert!((tick.progress - 0.12).abs() < 1e-12);
        assert!(tick.reschedule);
    }

    #[test]
    fn converges_then_stops_requesting_frames() {
        let mut driver = driver();
        driver.start();
        let mut frames = 0;
        loop {
            let tick = driver.tick(0.5);
            frames += 1;
            if !tick.reschedule {
                break;
            }
            assert!(frames < 500, "vòng lặp không hội tụ");
        }
        assert_eq!(driver.progress(), 0.5);
        assert!(!driver.is_running());
    }

    #[test]
    fn stop_keeps_current_progress() {
        let mut driver = driver();
        driver.start();
        for _ in 0..10 {
            driver.tick(1.0);
        }
        let before = driver.progress();
        driver.stop();
        assert_eq!(driver.progress(), before);
        assert!(driver.start());
        let tick = driver.tick(1.0);
        assert!(tick.progress > before);
    }

    #[test]
    fn snaps_when_close_enough() {
        let mut driver = driver();
        driver.start();
        driver.tick(0.0005);
        assert_eq!(driver.progress(), 0.0005);
    }
}
