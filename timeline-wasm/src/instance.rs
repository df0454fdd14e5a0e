//! Một widget timeline đang sống: vòng lặp animation, phân loại is-stuck và
//! trạng thái dùng chung giữa các callback.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use js_sys::Array;
use serde::Serialize;
use timeline_core::contract::STUCK_CLASS;
use timeline_core::{
    in_view, target_progress, AnimationConfig, AnimationDriver, ItemProbe, RootKind,
    StuckChange, StuckClassifier,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, IntersectionObserverEntry, MutationRecord, Window};

use crate::error::{report, WidgetError};
use crate::frame::FrameContext;
use crate::resolver::{self, TimelineNodes};
use crate::roots::{self, DomRoot, WindowRoot};
use crate::wiring::Wiring;

/// Ảnh chụp chỉ đọc của một instance, trả cho JS qua `timelineState`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSnapshot {
    pub progress: f64,
    pub target: Option<f64>,
    pub running: bool,
    pub triggers: usize,
    pub items: usize,
    pub stuck: Vec<usize>,
    pub frame_mode: RootKind,
}

pub struct Instance {
    id: u32,
    scope: Element,
    wrapper: Element,
    line: HtmlElement,
    window: Window,
    frame: FrameContext,
    container: RefCell<Option<Element>>,
    root: RefCell<DomRoot>,
    config: AnimationConfig,
    classifier: StuckClassifier,
    driver: RefCell<AnimationDriver>,
    nodes: RefCell<TimelineNodes>,
    frame_handle: Cell<Option<i32>>,
    idle_timer: RefCell<Option<Timeout>>,
    wiring: RefCell<Option<Wiring>>,
    disposed: Cell<bool>,
}

impl Instance {
    pub(crate) fn attach(
        id: u32,
        scope: Element,
        wrapper: Element,
        config: AnimationConfig,
    ) -> Result<Rc<Self>, WidgetError> {
        let window = web_sys::window().ok_or(WidgetError::NoWindow)?;
        let line = resolver::find_line(&wrapper, &scope).ok_or(WidgetError::MissingLine)?;

        let container = resolver::scroll_container(&window, &wrapper);
        let frame = FrameContext::detect(&window);
        let root = roots::select(&window, container.as_ref(), &frame);

        let style = line.style();
        for (property, value) in config.line_style.initial_properties() {
            style.set_property(property, value)?;
        }

        let instance = Rc::new(Self {
            id,
            nodes: RefCell::new(resolver::collect_nodes(&wrapper)),
            scope,
            wrapper,
            line,
            window,
            frame,
            container: RefCell::new(container),
            root: RefCell::new(root),
            classifier: StuckClassifier::from_config(&config),
            driver: RefCell::new(AnimationDriver::new(&config)),
            config,
            frame_handle: Cell::new(None),
            idle_timer: RefCell::new(None),
            wiring: RefCell::new(None),
            disposed: Cell::new(false),
        });

        let wiring = Wiring::install(&instance);
        *instance.wiring.borrow_mut() = Some(wiring);

        log::debug!(
            "instance {} đã gắn (root {:?}, iframe: {}, {} item)",
            instance.id,
            instance.root.borrow().kind(),
            instance.frame.in_iframe(),
            instance.nodes.borrow().items.len()
        );

        report("lượt đầu", instance.start_if_visible());
        Ok(instance)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn scope(&self) -> &Element {
        &self.scope
    }

    pub fn wrapper(&self) -> &Element {
        &self.wrapper
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    pub(crate) fn frame(&self) -> &FrameContext {
        &self.frame
    }

    pub(crate) fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub(crate) fn container(&self) -> Option<Element> {
        self.container.borrow().clone()
    }

    pub(crate) fn triggers(&self) -> Vec<Element> {
        self.nodes.borrow().triggers.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn is_connected(&self) -> bool {
        self.wrapper.is_connected()
    }

    /// Không gắn được listener lên container; chuyển sang điều khiển bằng window.
    pub(crate) fn fall_back_to_window(&self) {
        self.container.borrow_mut().take();
        let mut root = self.root.borrow_mut();
        if root.kind() == RootKind::Element {
            *root = Box::new(WindowRoot::new(self.window.clone()));
        }
    }

    pub fn snapshot(&self) -> InstanceSnapshot {
        let driver = self.driver.borrow();
        let nodes = self.nodes.borrow();
        InstanceSnapshot {
            progress: driver.progress(),
            target: driver.last_target(),
            running: driver.is_running(),
            triggers: nodes.triggers.len(),
            items: nodes.items.len(),
            stuck: nodes
                .items
                .iter()
                .enumerate()
                .filter(|(_, nodes)| nodes.item.class_list().contains(STUCK_CLASS))
                .map(|(index, _)| index)
                .collect(),
            frame_mode: self.root.borrow().kind(),
        }
    }

    fn start_if_visible(&self) -> Result<(), WidgetError> {
        let visible = {
            let root = self.root.borrow();
            in_view(&**root, &self.wrapper)
        };
        if visible {
            self.classify()?;
            self.start_loop();
        }
        Ok(())
    }

    pub(crate) fn start_loop(&self) {
        if self.disposed.get() {
            return;
        }
        let started = self.driver.borrow_mut().start();
        if started && self.frame_handle.get().is_none() {
            self.request_frame();
        }
    }

    pub(crate) fn stop_loop(&self) {
        self.driver.borrow_mut().stop();
        self.cancel_frame();
    }

    fn request_frame(&self) {
        let wiring = self.wiring.borrow();
        let Some(wiring) = wiring.as_ref() else {
            return;
        };
        match self.window.request_animation_frame(wiring.frame_callback()) {
            Ok(handle) => self.frame_handle.set(Some(handle)),
            Err(err) => log::warn!("requestAnimationFrame thất bại: {}", WidgetError::from(err)),
        }
    }

    fn cancel_frame(&self) {
        if let Some(handle) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }

    pub(crate) fn on_frame(&self) -> Result<(), WidgetError> {
        self.frame_handle.set(None);
        if self.disposed.get() {
            return Ok(());
        }

        let target = {
            let root = self.root.borrow();
            target_progress(&**root, &self.wrapper)
        };
        let tick = self.driver.borrow_mut().tick(target);
        self.write_progress(tick.progress)?;
        self.classify()?;

        if tick.reschedule {
            self.request_frame();
        }
        Ok(())
    }

    fn write_progress(&self, progress: f64) -> Result<(), WidgetError> {
        let (property, value) = self.config.line_style.render(progress);
        self.line.style().set_property(property, &value)?;
        Ok(())
    }

    /// Một lượt đọc line và các mark, sau đó chỉ ghi những class cần đổi.
    pub(crate) fn classify(&self) -> Result<(), WidgetError> {
        let nodes = self.nodes.borrow();
        if nodes.items.is_empty() {
            return Ok(());
        }

        let root = self.root.borrow();
        let line_bottom = root.rect(&self.line).bottom;
        let middle = root.viewport().middle();
        let probes: Vec<ItemProbe> = nodes
            .items
            .iter()
            .map(|nodes| ItemProbe {
                mark_center: root.rect(&nodes.mark).center_y(),
                stuck: nodes.item.class_list().contains(STUCK_CLASS),
            })
            .collect();

        let classification = self.classifier.classify(line_bottom, middle, &probes);
        for (nodes, change) in nodes.items.iter().zip(&classification.changes) {
            match change {
                StuckChange::Add => nodes.item.class_list().add_1(STUCK_CLASS)?,
                StuckChange::Remove => nodes.item.class_list().remove_1(STUCK_CLASS)?,
                StuckChange::Keep => {}
            }
        }
        Ok(())
    }

    /// Có cuộn hoặc đổi kích thước ảnh hưởng tới widget này.
    pub(crate) fn on_activity(self: &Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        self.start_loop();

        let weak = Rc::downgrade(self);
        let timer = Timeout::new(self.config.idle_stop_ms, move || {
            if let Some(instance) = weak.upgrade() {
                if !instance.is_disposed() {
                    instance.stop_loop();
                }
            }
        });
        // Thay timer cũ là hủy nó.
        *self.idle_timer.borrow_mut() = Some(timer);
    }

    pub(crate) fn on_visibility(&self, entries: &Array) -> Result<(), WidgetError> {
        if self.disposed.get() {
            return Ok(());
        }
        for entry in entries.iter() {
            let entry: IntersectionObserverEntry = entry.dyn_into()?;
            if entry.target() != self.wrapper {
                continue;
            }
            if entry.is_intersecting() {
                self.start_loop();
            } else {
                self.stop_loop();
            }
        }
        Ok(())
    }

    pub(crate) fn on_mutations(&self, records: &Array) -> Result<(), WidgetError> {
        if self.disposed.get() {
            return Ok(());
        }
        let changed = records.iter().any(|record| {
            record
                .dyn_into::<MutationRecord>()
                .map(|record| {
                    record.type_() == "childList"
                        && (record.added_nodes().length() > 0 || record.removed_nodes().length() > 0)
                })
                .unwrap_or(false)
        });
        if !changed {
            return Ok(());
        }

        self.refresh_nodes();
        self.classify()?;
        self.start_loop();
        Ok(())
    }

    /// Đọc lại trigger và item sau khi editor render lại con của wrapper.
    pub(crate) fn refresh_nodes(&self) {
        let wiring = self.wiring.borrow();
        if let Some(wiring) = wiring.as_ref() {
            wiring.unobserve_triggers(&self.nodes.borrow().triggers);
        }

        let fresh = resolver::collect_nodes(&self.wrapper);
        log::debug!(
            "instance {} gắn lại: {} trigger, {} item",
            self.id,
            fresh.triggers.len(),
            fresh.items.len()
        );
        *self.nodes.borrow_mut() = fresh;

        if let Some(wiring) = wiring.as_ref() {
            wiring.observe_triggers(&self.nodes.borrow().triggers);
        }
    }

    /// Dừng mọi thứ instance này đã bật. Các lần gọi sau không làm gì.
    pub(crate) fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.stop_loop();
        self.idle_timer.borrow_mut().take();
        if let Some(wiring) = self.wiring.borrow_mut().take() {
            wiring.release();
        }
        log::debug!("instance {} đã gỡ", self.id);
    }
}

/// Chạy `callback` trên instance còn sống; lỗi được ghi log thay vì ném ra.
pub(crate) fn with_instance(
    weak: &Weak<Instance>,
    context: &str,
    callback: impl FnOnce(&Rc<Instance>) -> Result<(), WidgetError>,
) {
    if let Some(instance) = weak.upgrade() {
        if !instance.is_disposed() {
            report(context, callback(&instance));
        }
    }
}
