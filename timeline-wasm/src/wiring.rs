//! Observer và event listener thuộc về một instance.

use std::rc::{Rc, Weak};

use js_sys::{Array, Function};
use timeline_core::contract::DEBUG_BLOCK_SELECTORS;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MutationObserver, MutationObserverInit,
};

use crate::error::WidgetError;
use crate::instance::{with_instance, Instance};

/// Dải trigger của observer debug: một phần năm ở giữa vùng nhìn.
const DEBUG_ROOT_MARGIN: &str = "-40% 0px -40% 0px";

struct Listener {
    target: EventTarget,
    kind: &'static str,
}

struct IntersectionSlot {
    observer: IntersectionObserver,
    callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

struct MutationSlot {
    observer: MutationObserver,
    callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

pub(crate) struct Wiring {
    on_frame: Closure<dyn FnMut()>,
    on_activity: Closure<dyn FnMut(Event)>,
    listeners: Vec<Listener>,
    visibility: Option<IntersectionSlot>,
    trigger_debug: Option<IntersectionSlot>,
    mutations: Option<MutationSlot>,
}

impl Wiring {
    /// Nối mọi thứ. Observer nào không tạo được thì bỏ qua; animation theo
    /// cuộn vẫn chạy không cần chúng.
    pub(crate) fn install(instance: &Rc<Instance>) -> Self {
        let weak = Rc::downgrade(instance);

        let on_frame = Closure::<dyn FnMut()>::new({
            let weak = weak.clone();
            move || with_instance(&weak, "frame animation", |instance| instance.on_frame())
        });
        let on_activity = Closure::<dyn FnMut(Event)>::new({
            let weak = weak.clone();
            move |_event: Event| {
                with_instance(&weak, "cuộn/đổi kích thước", |instance| {
                    instance.on_activity();
                    Ok(())
                })
            }
        });

        let listeners = bind_activity(instance, on_activity.as_ref().unchecked_ref());
        let visibility = observe_visibility(instance, &weak);
        let trigger_debug = if instance.config().debug {
            observe_trigger_crossings(instance)
        } else {
            None
        };
        let mutations = observe_mutations(instance, &weak);

        let wiring = Self {
            on_frame,
            on_activity,
            listeners,
            visibility,
            trigger_debug,
            mutations,
        };
        wiring.observe_triggers(&instance.triggers());
        wiring
    }

    pub(crate) fn frame_callback(&self) -> &Function {
        self.on_frame.as_ref().unchecked_ref()
    }

    pub(crate) fn observe_triggers(&self, triggers: &[web_sys::Element]) {
        if let Some(slot) = &self.trigger_debug {
            for trigger in triggers {
                slot.observer.observe(trigger);
            }
        }
    }

    pub(crate) fn unobserve_triggers(&self, triggers: &[web_sys::Element]) {
        if let Some(slot) = &self.trigger_debug {
            for trigger in triggers {
                slot.observer.unobserve(trigger);
            }
        }
    }

    pub(crate) fn release(self) {
        if let Some(slot) = &self.visibility {
            slot.observer.disconnect();
        }
        if let Some(slot) = &self.trigger_debug {
            slot.observer.disconnect();
        }
        if let Some(slot) = &self.mutations {
            slot.observer.disconnect();
        }

        let handler: &Function = self.on_activity.as_ref().unchecked_ref();
        for listener in &self.listeners {
            if let Err(err) = listener
                .target
                .remove_event_listener_with_callback(listener.kind, handler)
            {
                log::debug!(
                    "gỡ listener {} thất bại: {}",
                    listener.kind,
                    WidgetError::from(err)
                );
            }
        }

        // Record trình duyệt đã xếp hàng vẫn có thể tới; callback còn hợp lệ
        // đến khi phía JS bỏ chúng.
        let _ = self.on_frame.into_js_value();
        let _ = self.on_activity.into_js_value();
        for slot in [self.visibility, self.trigger_debug].into_iter().flatten() {
            let _ = slot.callback.into_js_value();
        }
        if let Some(slot) = self.mutations {
            let _ = slot.callback.into_js_value();
        }
    }
}

fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: &Function,
    passive: bool,
) -> Result<Listener, WidgetError> {
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(kind, handler, &options)?;
    Ok(Listener {
        target: target.clone(),
        kind,
    })
}

/// Cuộn trên container (hoặc window), đổi kích thước trên window, và cả hai
/// trên window cha khi chạy trong preview của editor và truy cập được.
fn bind_activity(instance: &Instance, handler: &Function) -> Vec<Listener> {
    let mut listeners = Vec::new();
    let mut bind = |target: &EventTarget, kind: &'static str, passive: bool| -> bool {
        match listen(target, kind, handler, passive) {
            Ok(listener) => {
                listeners.push(listener);
                true
            }
            Err(err) => {
                log::warn!("không lắng nghe được {kind}: {err}");
                false
            }
        }
    };

    let window: &EventTarget = instance.window().as_ref();
    match instance.container() {
        Some(container) => {
            if !bind(container.as_ref(), "scroll", true) {
                log::warn!("không gắn được listener lên container, chuyển sang window");
                instance.fall_back_to_window();
                bind(window, "scroll", true);
            }
        }
        None => {
            bind(window, "scroll", true);
        }
    }
    bind(window, "resize", false);

    if let Some(parent) = instance.frame().parent() {
        log::debug!("thêm listener cuộn/đổi kích thước vào window cha");
        bind(parent.as_ref(), "scroll", true);
        bind(parent.as_ref(), "resize", false);
    }

    listeners
}

fn intersection_options(instance: &Instance) -> IntersectionObserverInit {
    let options = IntersectionObserverInit::new();
    let container = instance.container();
    options.set_root(container.as_ref());
    options.set_threshold(&JsValue::from_f64(0.0));
    options
}

fn observe_visibility(instance: &Instance, weak: &Weak<Instance>) -> Option<IntersectionSlot> {
    let weak = weak.clone();
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            with_instance(&weak, "observer hiển thị", |instance| {
                instance.on_visibility(&entries)
            })
        },
    );

    let options = intersection_options(instance);
    match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
        Ok(observer) => {
            observer.observe(instance.wrapper());
            Some(IntersectionSlot { observer, callback })
        }
        Err(err) => {
            log::warn!("không có observer hiển thị: {}", WidgetError::from(err));
            None
        }
    }
}

fn observe_trigger_crossings(instance: &Instance) -> Option<IntersectionSlot> {
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    log_trigger(&entry);
                }
            }
        },
    );

    let options = intersection_options(instance);
    options.set_root_margin(DEBUG_ROOT_MARGIN);
    match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
        Ok(observer) => Some(IntersectionSlot { observer, callback }),
        Err(err) => {
            log::warn!("không có observer trigger: {}", WidgetError::from(err));
            None
        }
    }
}

fn log_trigger(entry: &IntersectionObserverEntry) {
    let trigger = entry.target();
    let Some(block) = DEBUG_BLOCK_SELECTORS
        .iter()
        .find_map(|selector| trigger.closest(selector).ok().flatten())
    else {
        return;
    };
    log::debug!(
        "trigger trong <{} class=\"{}\">: intersecting={} ratio={:.2} top={:.1}",
        block.tag_name().to_lowercase(),
        block.class_name(),
        entry.is_intersecting(),
        entry.intersection_ratio(),
        entry.bounding_client_rect().top()
    );
}

fn observe_mutations(instance: &Instance, weak: &Weak<Instance>) -> Option<MutationSlot> {
    let weak = weak.clone();
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            with_instance(&weak, "observer DOM", |instance| {
                instance.on_mutations(&records)
            })
        },
    );

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(err) => {
            log::warn!("không có observer DOM: {}", WidgetError::from(err));
            return None;
        }
    };

    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    match observer.observe_with_options(instance.wrapper(), &options) {
        Ok(()) => Some(MutationSlot { observer, callback }),
        Err(err) => {
            log::warn!("không có observer DOM: {}", WidgetError::from(err));
            None
        }
    }
}
