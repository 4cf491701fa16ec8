//! Interning for token lexemes.
//!
//! Identifiers, operators, and comment text repeat heavily across a source
//! file; interning keeps one shared allocation per distinct lexeme.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

lazy_static! {
    static ref INTERNER: Mutex<HashMap<Arc<str>, Arc<str>>> = Mutex::new(HashMap::new());
}

/// A reference-counted, interned string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InternedString(Arc<str>);

impl InternedString {
    /// Interns `s`, returning a handle to the shared allocation.
    pub fn new(s: &str) -> Self {
        let mut map = INTERNER.lock().unwrap();
        if let Some(existing) = map.get(s) {
            return InternedString(Arc::clone(existing));
        }
        let arc: Arc<str> = Arc::from(s);
        map.insert(Arc::clone(&arc), Arc::clone(&arc));
        InternedString(arc)
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the interned text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the interned text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InternedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<&String> for InternedString {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<&str> for InternedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<str> for InternedString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl std::ops::Deref for InternedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InternedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_shares_storage() {
        let s1 = InternedString::new("loop_var");
        let s2 = InternedString::new("loop_var");
        assert!(Arc::ptr_eq(&s1.0, &s2.0));

        let s3 = InternedString::new("loop_expr");
        assert!(!Arc::ptr_eq(&s1.0, &s3.0));
    }

    #[test]
    fn compares_against_plain_strs() {
        let s = InternedString::new("matrix");
        assert_eq!(s, "matrix");
        assert_eq!(s.len(), 6);
    }
}
