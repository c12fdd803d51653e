//! Backend session binding.
//!
//! The backend correlates sequential questions through an opaque session
//! identifier. The binder decides which identifier outgoing requests carry
//! and keeps it stable across repeated evaluations.

use crate::ident;

/// Tracks the session identifier outgoing requests must carry.
///
/// State machine:
/// - **Unbound**: no identifier yet. The first [`resolve`](Self::resolve)
///   generates one and transitions to Bound.
/// - **Bound**: the held identifier is reused as long as the externally
///   supplied one (the selected conversation) is absent or unchanged.
/// - **Rebound**: when the external identifier changes to a different
///   non-empty value, it is adopted as-is; a server-assigned session takes
///   precedence over a locally generated one.
///
/// Resolution is idempotent for a given external value, so re-evaluating on
/// every send never regenerates needlessly. Callers hold the returned owned
/// id across an in-flight request; a later rebind cannot invalidate it.
#[derive(Debug, Default)]
pub struct SessionBinder {
    current: Option<String>,
}

impl SessionBinder {
    /// Creates an unbound binder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session id to use for the given external conversation id.
    pub fn resolve(&mut self, external: Option<&str>) -> String {
        if let Some(external) = external.filter(|e| !e.is_empty()) {
            if self.current.as_deref() != Some(external) {
                self.current = Some(external.to_string());
            }
        }

        match &self.current {
            Some(id) => id.clone(),
            None => {
                let id = ident::session_id();
                self.current = Some(id.clone());
                id
            }
        }
    }

    /// Returns the currently bound session id, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_generates_exactly_once() {
        let mut binder = SessionBinder::new();
        assert!(binder.current().is_none());

        let first = binder.resolve(None);
        let second = binder.resolve(None);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn adopts_each_external_change_exactly_once() {
        let mut binder = SessionBinder::new();

        let generated = binder.resolve(None);
        let a1 = binder.resolve(Some("A"));
        let a2 = binder.resolve(Some("A"));
        let b = binder.resolve(Some("B"));

        assert_ne!(generated, "A");
        assert_eq!(a1, "A");
        assert_eq!(a2, "A");
        assert_eq!(b, "B");
    }

    #[test]
    fn empty_external_id_is_treated_as_absent() {
        let mut binder = SessionBinder::new();
        let generated = binder.resolve(Some(""));
        assert_ne!(generated, "");
        assert_eq!(binder.resolve(Some("")), generated);
    }

    #[test]
    fn external_going_absent_keeps_current_binding() {
        let mut binder = SessionBinder::new();
        binder.resolve(Some("A"));
        assert_eq!(binder.resolve(None), "A");
    }
}
