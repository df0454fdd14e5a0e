//! Tiện ích cấp trang: khởi động khi DOM sẵn sàng, và tiếp tục gắn các
//! timeline mà page builder chèn vào sau đó.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Function};
use timeline_core::AnimationConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, MutationObserver, MutationObserverInit, Node};

use crate::error::WidgetError;
use crate::{init_all, prepare, registry, teardown_all};

/// Khoảng lặng trước khi quét lại sau khi DOM được chèn thêm.
const RESCAN_DEBOUNCE_MS: u32 = 80;

/// Chạy `initAllWidgets(document)` ngay, hoặc khi `DOMContentLoaded` nếu
/// document còn đang tải.
#[wasm_bindgen(js_name = bootTimelines)]
pub fn boot_timelines(document: JsValue, options: Option<JsValue>) {
    let config = prepare(options);
    let document = match document.dyn_into::<Document>() {
        Ok(document) => document,
        Err(_) => match web_sys::window().and_then(|window| window.document()) {
            Some(document) => document,
            None => {
                log::warn!("bootTimelines: {}", WidgetError::NoWindow);
                return;
            }
        },
    };

    if document.ready_state() != "loading" {
        let bound = init_all(document.as_ref(), &config);
        log::debug!("bootTimelines: đã gắn {} timeline", bound.len());
        return;
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || {
        let bound = init_all(target.as_ref(), &config);
        log::debug!("bootTimelines: đã gắn {} timeline sau DOMContentLoaded", bound.len());
    });
    let listen_options = AddEventListenerOptions::new();
    listen_options.set_once(true);
    if let Err(err) = document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        on_ready.unchecked_ref(),
        &listen_options,
    ) {
        log::error!("bootTimelines: {}", WidgetError::from(err));
    }
}

type InsertionObserver = (MutationObserver, Closure<dyn FnMut(Array, MutationObserver)>);

struct Watcher {
    root: JsValue,
    config: AnimationConfig,
    pending: RefCell<Option<Timeout>>,
    /// Hàm gỡ theo id instance; chỉ giữ instance còn sống.
    bindings: RefCell<HashMap<u32, Function>>,
    observer: RefCell<Option<InsertionObserver>>,
}

impl Watcher {
    fn new(root: JsValue, config: AnimationConfig) -> Rc<Self> {
        let watcher = Rc::new(Self {
            root,
            config,
            pending: RefCell::new(None),
            bindings: RefCell::new(HashMap::new()),
            observer: RefCell::new(None),
        });
        watcher.rescan();
        watcher
    }

    fn schedule(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let timer = Timeout::new(RESCAN_DEBOUNCE_MS, move || {
            if let Some(watcher) = weak.upgrade() {
                watcher.rescan();
            }
        });
        *self.pending.borrow_mut() = Some(timer);
    }

    fn rescan(&self) {
        let pruned = registry::prune_detached();
        let fresh = init_all(&self.root, &self.config);

        let mut bindings = self.bindings.borrow_mut();
        bindings.retain(|id, _| registry::is_live(*id));
        for binding in fresh {
            bindings.entry(binding.id).or_insert(binding.teardown);
        }
        log::debug!(
            "watchTimelines: gỡ {pruned}, đang theo dõi {}, {} đang sống",
            bindings.len(),
            registry::live_count()
        );
    }

    fn tracked(&self) -> usize {
        self.bindings.borrow().len()
    }

    fn stop(&self) {
        if let Some((observer, callback)) = self.observer.borrow_mut().take() {
            observer.disconnect();
            let _ = callback.into_js_value();
        }
        self.pending.borrow_mut().take();

        let teardowns = self.bindings.take().into_values().collect();
        let teardown = teardown_all(teardowns);
        if let Err(err) = teardown.call0(&JsValue::NULL) {
            log::error!("watchTimelines: gỡ thất bại: {}", WidgetError::from(err));
        }
    }
}

/// Gắn mọi timeline dưới `root` và tiếp tục gắn các timeline được chèn sau.
/// Hàm trả về dừng theo dõi và gỡ tất cả.
#[wasm_bindgen(js_name = watchTimelines)]
pub fn watch_timelines(root: JsValue, options: Option<JsValue>) -> Function {
    let config = prepare(options);
    let root = if root.is_undefined() || root.is_null() {
        web_sys::window()
            .and_then(|window| window.document())
            .map(JsValue::from)
            .unwrap_or(JsValue::NULL)
    } else {
        root
    };

    let watcher = Watcher::new(root, config);
    *watcher.observer.borrow_mut() = observe_insertions(&watcher);
    log::debug!("watchTimelines: bắt đầu với {} timeline", watcher.tracked());

    Closure::<dyn FnMut()>::new(move || watcher.stop())
        .into_js_value()
        .unchecked_into()
}

fn observe_insertions(watcher: &Rc<Watcher>) -> Option<InsertionObserver> {
    let node = watcher.root.dyn_ref::<Node>()?.clone();
    let weak = Rc::downgrade(watcher);
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |_records: Array, _observer: MutationObserver| {
            if let Some(watcher) = weak.upgrade() {
                watcher.schedule();
            }
        },
    );

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(err) => {
            log::warn!("watchTimelines: {}", WidgetError::from(err));
            return None;
        }
    };
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    match observer.observe_with_options(&node, &options) {
        Ok(()) => Some((observer, callback)),
        Err(err) => {
            log::warn!("watchTimelines: {}", WidgetError::from(err));
            None
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::Element;

    wasm_bindgen_test_configure!(run_in_browser);

    const WIDGET_HTML: &str = r#"
        <div class="timeline-wrapper" style="height: 600px;">
          <div class="timeline-line-animation"></div>
          <ul class="timeline">
            <li class="timeline-item"><div class="tl-trigger"></div><div class="tl-circ"></div></li>
          </ul>
        </div>
    "#;

    fn host() -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let host = document.create_element("section").unwrap();
        host.set_inner_html(WIDGET_HTML);
        document.body().unwrap().append_child(&host).unwrap();
        host
    }

    #[wasm_bindgen_test]
    fn rescan_forgets_released_instances() {
        let host = host();
        let watcher = Watcher::new(host.clone().into(), AnimationConfig::default());
        assert_eq!(watcher.tracked(), 1);

        // Editor render lại: wrapper cũ rời DOM, wrapper mới thế chỗ.
        for _ in 0..5 {
            host.set_inner_html(WIDGET_HTML);
            watcher.rescan();
            assert_eq!(watcher.tracked(), 1);
        }

        host.set_inner_html("");
        watcher.rescan();
        assert_eq!(watcher.tracked(), 0);

        host.set_inner_html(WIDGET_HTML);
        watcher.rescan();
        let wrapper = host.query_selector(".timeline-wrapper").unwrap().unwrap();
        let id = registry::binding_for(&wrapper).unwrap().id;
        registry::release(id);
        watcher.rescan();
        // Quét lại gắn lại wrapper vừa gỡ; id cũ không còn được giữ.
        assert_eq!(watcher.tracked(), 1);
        assert!(!watcher.bindings.borrow().contains_key(&id));

        watcher.stop();
        assert_eq!(watcher.tracked(), 0);
        assert!(registry::binding_for(&wrapper).is_none());
        host.remove();
    }
}
