//! Tra cứu element → instance đang sống. Không ghi thuộc tính nào lên node
//! DOM của trang; một `WeakMap` ánh xạ element sang id, còn module này giữ
//! chính các instance.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, WeakMap};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::instance::Instance;

/// Một lần gắn thành công: id của instance và hàm gỡ của nó.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub id: u32,
    pub teardown: Function,
}

struct Entry {
    instance: Rc<Instance>,
    teardown: Function,
    keys: Vec<Element>,
}

impl Entry {
    fn binding(&self, id: u32) -> Binding {
        Binding {
            id,
            teardown: self.teardown.clone(),
        }
    }
}

thread_local! {
    static KEYS: WeakMap = WeakMap::new();
    static LIVE: RefCell<HashMap<u32, Entry>> = RefCell::new(HashMap::new());
    static NEXT_ID: Cell<u32> = const { Cell::new(1) };
}

pub(crate) fn next_id() -> u32 {
    NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1).max(1));
        id
    })
}

fn id_for(element: &Element) -> Option<u32> {
    KEYS.with(|keys| keys.get(element.as_ref()).as_f64())
        .map(|id| id as u32)
}

pub(crate) fn lookup(element: &Element) -> Option<Rc<Instance>> {
    let id = id_for(element)?;
    LIVE.with(|live| live.borrow().get(&id).map(|entry| entry.instance.clone()))
}

pub(crate) fn binding_for(element: &Element) -> Option<Binding> {
    let id = id_for(element)?;
    LIVE.with(|live| live.borrow().get(&id).map(|entry| entry.binding(id)))
}

/// Cho `element` trỏ tới instance đã gắn qua `bound`.
pub(crate) fn alias(element: &Element, bound: &Element) -> Option<Binding> {
    let id = id_for(bound)?;
    LIVE.with(|live| {
        let mut live = live.borrow_mut();
        let entry = live.get_mut(&id)?;
        KEYS.with(|keys| keys.set(element.as_ref(), &JsValue::from(id)));
        entry.keys.push(element.clone());
        Some(entry.binding(id))
    })
}

/// Lưu instance vừa gắn và trả về hàm gỡ. Hàm chỉ mang id, nên gọi lại sau
/// khi đã gỡ thì không làm gì.
pub(crate) fn register(instance: Rc<Instance>) -> Binding {
    let id = instance.id();
    let teardown: Function = Closure::<dyn FnMut()>::new(move || release(id))
        .into_js_value()
        .unchecked_into();

    let mut keys = vec![instance.scope().clone()];
    if instance.wrapper() != instance.scope() {
        keys.push(instance.wrapper().clone());
    }
    KEYS.with(|map| {
        for key in &keys {
            map.set(key.as_ref(), &JsValue::from(id));
        }
    });

    let binding = Binding {
        id,
        teardown: teardown.clone(),
    };
    LIVE.with(|live| {
        live.borrow_mut().insert(
            id,
            Entry {
                instance,
                teardown,
                keys,
            },
        )
    });
    binding
}

pub(crate) fn release(id: u32) {
    let Some(entry) = LIVE.with(|live| live.borrow_mut().remove(&id)) else {
        return;
    };
    entry.instance.dispose();
    KEYS.with(|map| {
        for key in &entry.keys {
            if map.get(key.as_ref()).as_f64() == Some(f64::from(id)) {
                map.delete(key.as_ref());
            }
        }
    });
}

pub(crate) fn is_live(id: u32) -> bool {
    LIVE.with(|live| live.borrow().contains_key(&id))
}

/// Gỡ các instance có wrapper đã rời khỏi document.
pub(crate) fn prune_detached() -> usize {
    let detached: Vec<u32> = LIVE.with(|live| {
        live.borrow()
            .iter()
            .filter(|(_, entry)| !entry.instance.is_connected())
            .map(|(id, _)| *id)
            .collect()
    });
    for id in &detached {
        release(*id);
    }
    detached.len()
}

pub(crate) fn live_count() -> usize {
    LIVE.with(|live| live.borrow().len())
}
