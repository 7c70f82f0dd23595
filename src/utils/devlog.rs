//! `dev6!` timing lines, with per-thread capture for tests.

use std::cell::RefCell;

/// Log target for developer lines; `logger` routes it to its own appender.
pub const DEV_TARGET: &str = "arrayquery::dev6";

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Collects the `dev6!` lines emitted on the current thread until dropped.
#[derive(Debug)]
pub struct Capture(());

impl Capture {
    #[must_use]
    pub fn start() -> Self {
        CAPTURED.with_borrow_mut(|c| *c = Some(Vec::new()));
        Self(())
    }

    /// Lines collected since the previous call.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        CAPTURED.with_borrow_mut(|c| c.as_mut().map(std::mem::take).unwrap_or_default())
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURED.with_borrow_mut(|c| *c = None);
    }
}

#[doc(hidden)]
pub fn emit(line: String) {
    log::trace!(target: DEV_TARGET, "{line}");
    CAPTURED.with_borrow_mut(|c| {
        if let Some(lines) = c {
            lines.push(line);
        }
    });
}

#[macro_export]
macro_rules! dev6 {
    ($($arg:tt)*) => {
        $crate::utils::devlog::emit(format!($($arg)*))
    };
}
