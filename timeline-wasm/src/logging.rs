//! Backend `log` ghi ra console của trình duyệt.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

const PREFIX: &str = "[za-timeline]";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("{PREFIX} {}", record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Cài logger console nếu trang chưa cài logger khác, và nâng mức lên `Debug`
/// khi có instance yêu cầu. Không bao giờ hạ mức.
pub fn init(debug: bool) {
    let _ = log::set_logger(&LOGGER);
    let wanted = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if wanted > log::max_level() {
        log::set_max_level(wanted);
    }
}
