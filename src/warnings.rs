//! Run-scoped warning log.
//!
//! Structural problems in a source tend to repeat for every entity that hits
//! them, so each distinct message is emitted once.

use std::cell::RefCell;
use std::collections::HashSet;

use tracing::warn;

#[derive(Debug, Default)]
pub struct Warnings {
    inner: RefCell<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl Warnings {
    /// Logs `message` unless the exact same text was logged before.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.inner.borrow_mut();
        if inner.seen.insert(message.clone()) {
            warn!("{message}");
            inner.ordered.push(message);
        }
    }

    /// Distinct messages in the order they were first raised.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.inner.borrow().ordered.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Warnings;

    #[test]
    fn repeated_messages_are_kept_once() {
        let warnings = Warnings::default();
        warnings.warn("Nonexistent entity 'Ghost' referenced by 'Thing1' and property 'ex:p'");
        warnings.warn("field \"field_x\" does not exist in \"article\".");
        warnings.warn("Nonexistent entity 'Ghost' referenced by 'Thing1' and property 'ex:p'");

        assert_eq!(warnings.len(), 2);
        assert!(warnings.messages()[0].starts_with("Nonexistent entity 'Ghost'"));
    }
}
