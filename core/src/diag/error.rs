//! Pass-level failure signals and internal error capture.
//!
//! Structured failures travel through the recursive passes as
//! `PassResult<T>` values and are converted into diagnostics at statement
//! boundaries. Panics are caught once per pass entry point and degrade into a
//! single error diagnostic carrying a best-effort location.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use super::Diagnostic;
use crate::text::SourceBuffer;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PassFailure {
    /// A failure whose diagnostic still has to be recorded.
    #[error("{0}")]
    Reported(Box<Diagnostic>),
    /// The diagnostic was already recorded deeper in the walk.
    #[error("pass aborted after reporting its diagnostics")]
    Silent,
}

impl From<Diagnostic> for PassFailure {
    fn from(diagnostic: Diagnostic) -> Self {
        PassFailure::Reported(Box::new(diagnostic))
    }
}

pub type PassResult<T> = Result<T, PassFailure>;

/// Source location captured when a panic unwinds through a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

thread_local! {
    static LAST_PANIC: RefCell<Option<StackFrame>> = const { RefCell::new(None) };
}

static LOCATION_HOOK: Once = Once::new();

fn install_location_hook() {
    LOCATION_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Some(location) = info.location() {
                let frame = StackFrame {
                    file: location.file().to_string(),
                    line: location.line(),
                    column: location.column(),
                };
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(frame));
            }
            previous(info);
        }));
    });
}

/// Run `body`, converting a panic into an error diagnostic for `pass`.
pub fn catch_internal<T>(
    pass: &str,
    source: &Arc<SourceBuffer>,
    body: impl FnOnce() -> T,
) -> Result<T, Diagnostic> {
    install_location_hook();
    LAST_PANIC.with(|slot| slot.borrow_mut().take());

    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            let location = LAST_PANIC
                .with(|slot| slot.borrow_mut().take())
                .map_or_else(|| "unknown location".to_string(), |frame| frame.to_string());
            let message = panic_message(payload.as_ref());

            tracing::warn!(pass, %location, %message, "internal failure caught");

            Err(Diagnostic::unanchored(
                source,
                format!("{pass} failed with panic at {location}:\n\t{message}"),
            ))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_values_through() {
        let source = Arc::new(SourceBuffer::raw(""));
        let value = catch_internal("Parser", &source, || 7);

        assert_eq!(value.ok(), Some(7));
    }

    #[test]
    fn panics_become_diagnostics() {
        let source = Arc::new(SourceBuffer::raw("mod demo"));
        let result: Result<(), Diagnostic> =
            catch_internal("Collector", &source, || panic!("scope vanished"));

        let diagnostic = result.expect_err("panic should be caught");
        assert!(diagnostic.is_error());
        assert!(
            diagnostic
                .message
                .starts_with("Collector failed with panic at "),
            "unexpected message: {}",
            diagnostic.message
        );
        assert!(diagnostic.message.contains("error.rs"));
        assert!(diagnostic.message.ends_with("scope vanished"));
    }
}
