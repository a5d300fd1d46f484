//! Deduplicated warnings for recoverable problems.
//!
//! Markup that is malformed but still usable should not flood the log, so each
//! unique `(component, message)` pair is reported only once until
//! [`clear_warnings`] is called. Output goes through `tracing`; installing a
//! subscriber is left to the application.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A poisoned set is still usable.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records the pair and reports whether it was new.
fn first_occurrence(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    warned().get_or_insert_with(HashSet::new).insert(key)
}

/// Warn about a recovered problem (emitted once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("Markup", "unexpected end tag </span>");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_occurrence(component, message) {
        tracing::warn!(target: "dominic", component, message);
    }
}

/// Clear all recorded warnings (call before processing a new document).
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single test so clear_warnings cannot race with other assertions.
    #[test]
    fn test_warn_once_deduplicates_until_cleared() {
        assert!(first_occurrence("Test", "repeated message"));
        assert!(!first_occurrence("Test", "repeated message"));
        assert!(first_occurrence("Other", "repeated message"));

        warn_once("Test", "emitted through tracing");
        assert!(!first_occurrence("Test", "emitted through tracing"));

        clear_warnings();
        assert!(first_occurrence("Test", "repeated message"));
    }
}
