//! Mô phỏng một trang cuộn bằng window để chạy engine ngoài trình duyệt.
//!
//! Dùng cho CLI và kiểm thử: cùng trait [`ScrollRoot`], cùng driver và bộ
//! phân loại như bản chạy trên DOM.

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::driver::AnimationDriver;
use crate::geometry::{Rect, Viewport};
use crate::root::{in_view, target_progress, RootKind, ScrollRoot};
use crate::stuck::{ItemProbe, StuckClassifier};
use crate::TimelineError;

/// Số frame tối đa cho mỗi bước cuộn.
const MAX_FRAMES_PER_STEP: usize = 600;

/// Mô tả trang, tọa độ tính theo document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub viewport_height: f64,
    pub wrapper_top: f64,
    pub wrapper_height: f64,
    /// Tâm của từng mark, tính từ mép trên wrapper.
    pub mark_offsets: Vec<f64>,
    pub scroll_step: f64,
    #[serde(default)]
    pub scroll_end: Option<f64>,
    #[serde(default)]
    pub config: AnimationConfig,
}

impl Scenario {
    /// Wrapper cách đều `items` mark, bắt đầu ở giữa màn hình đầu tiên.
    pub fn evenly_spaced(
        viewport_height: f64,
        wrapper_height: f64,
        items: usize,
        scroll_step: f64,
    ) -> Self {
        let gap = wrapper_height / (items as f64 + 1.0);
        Self {
            viewport_height,
            wrapper_top: viewport_height / 2.0,
            wrapper_height,
            mark_offsets: (1..=items).map(|index| gap * index as f64).collect(),
            scroll_step,
            scroll_end: None,
            config: AnimationConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if !is_positive(self.viewport_height) {
            return Err(TimelineError::InvalidScenario(
                "viewport_height phải lớn hơn 0".to_string(),
            ));
        }
        if !is_positive(self.wrapper_height) {
            return Err(TimelineError::InvalidScenario(
                "wrapper_height phải lớn hơn 0".to_string(),
            ));
        }
        if !is_positive(self.scroll_step) {
            return Err(TimelineError::InvalidScenario(
                "scroll_step phải lớn hơn 0".to_string(),
            ));
        }
        if let Some(offset) = self
            .mark_offsets
            .iter()
            .find(|offset| !(0.0..=self.wrapper_height).contains(*offset))
        {
            return Err(TimelineError::InvalidScenario(format!(
                "mark ở vị trí {offset} nằm ngoài wrapper"
            )));
        }
        self.config.validate()
    }

    /// Vị trí cuộn cuối: mặc định là khi đáy wrapper rời mép trên màn hình.
    pub fn scroll_limit(&self) -> f64 {
        self.scroll_end
            .unwrap_or(self.wrapper_top + self.wrapper_height)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Nút trong trang mô phỏng.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimNode {
    Wrapper,
    Line,
    Mark(usize),
}

#[derive(Debug, Clone)]
pub struct SimulatedPage {
    scenario: Scenario,
    scroll_y: f64,
    line_progress: f64,
}

impl SimulatedPage {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            scroll_y: 0.0,
            line_progress: 0.0,
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.max(0.0);
    }

    pub fn set_line_progress(&mut self, progress: f64) {
        self.line_progress = progress;
    }

    pub fn marks(&self) -> usize {
        self.scenario.mark_offsets.len()
    }

    fn wrapper_rect(&self) -> Rect {
        Rect::vertical(
            self.scenario.wrapper_top - self.scroll_y,
            self.scenario.wrapper_height,
        )
    }
}

impl ScrollRoot for SimulatedPage {
    type Node = SimNode;

    fn kind(&self) -> RootKind {
        RootKind::Window
    }

    fn viewport(&self) -> Viewport {
        Viewport::window(self.scenario.viewport_height)
    }

    fn rect(&self, node: &SimNode) -> Rect {
        let wrapper = self.wrapper_rect();
        match node {
            SimNode::Wrapper => wrapper,
            SimNode::Line => Rect::vertical(wrapper.top, wrapper.height * self.line_progress),
            SimNode::Mark(index) => {
                let center = wrapper.top
                    + self
                        .scenario
                        .mark_offsets
                        .get(*index)
                        .copied()
                        .unwrap_or_default();
                Rect::vertical(center - 1.0, 2.0)
            }
        }
    }
}

/// Trạng thái sau khi chạy hết các frame của một bước cuộn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub scroll_y: f64,
    pub visible: bool,
    pub target: f64,
    pub progress: f64,
    pub frames: usize,
    pub current: Option<usize>,
    pub stuck: Vec<usize>,
}

/// Trang mô phỏng + driver + bộ phân loại, chạy như một instance thật.
#[derive(Debug, Clone)]
pub struct Simulation {
    page: SimulatedPage,
    driver: AnimationDriver,
    classifier: StuckClassifier,
    stuck: Vec<bool>,
    current: Option<usize>,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self, TimelineError> {
        scenario.validate()?;
        let driver = AnimationDriver::new(&scenario.config);
        let classifier = StuckClassifier::from_config(&scenario.config);
        let stuck = vec![false; scenario.mark_offsets.len()];
        Ok(Self {
            page: SimulatedPage::new(scenario),
            driver,
            classifier,
            stuck,
            current: None,
        })
    }

    pub fn page(&self) -> &SimulatedPage {
        &self.page
    }

    pub fn stuck(&self) -> &[bool] {
        &self.stuck
    }

    /// Cuộn tới `scroll_y` rồi chạy frame cho tới khi driver ngừng xin frame.
    pub fn scroll_to(&mut self, scroll_y: f64) -> StepReport {
        self.page.scroll_to(scroll_y);

        let visible = in_view(&self.page, &SimNode::Wrapper);
        let mut frames = 0;
        if visible && self.driver.start() {
            while frames < MAX_FRAMES_PER_STEP {
                let target = target_progress(&self.page, &SimNode::Wrapper);
                let tick = self.driver.tick(target);
                self.page.set_line_progress(tick.progress);
                self.classify();
                frames += 1;
                if !tick.reschedule {
                    break;
                }
            }
            self.driver.stop();
        }

        StepReport {
            scroll_y: self.page.scroll_y(),
            visible,
            target: target_progress(&self.page, &SimNode::Wrapper),
            progress: self.driver.progress(),
            frames,
            current: self.current,
            stuck: self
                .stuck
                .iter()
                .enumerate()
                .filter_map(|(index, stuck)| stuck.then_some(index))
                .collect(),
        }
    }

    /// Chạy toàn bộ kịch bản từ vị trí 0 tới giới hạn cuộn.
    pub fn run(&mut self) -> Vec<StepReport> {
        let limit = self.page.scenario.scroll_limit();
        let step = self.page.scenario.scroll_step;
        let mut reports = Vec::new();
        let mut scroll_y = 0.0;
        while scroll_y <= limit {
            reports.push(self.scroll_to(scroll_y));
            scroll_y += step;
        }
        reports
    }

    fn classify(&mut self) {
        if self.stuck.is_empty() {
            return;
        }
        let line_bottom = self.page.rect(&SimNode::Line).bottom;
        let middle = self.page.viewport().middle();
        let probes: Vec<ItemProbe> = (0..self.page.marks())
            .map(|index| ItemProbe {
                mark_center: self.page.rect(&SimNode::Mark(index)).center_y(),
                stuck: self.stuck[index],
            })
            .collect();
        let classification = self.classifier.classify(line_bottom, middle, &probes);
        self.stuck = classification.resolved(&probes);
        self.current = classification.current;
    }
}
