use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Immutable, reference-counted string used for attachment, timeline and
/// dependency ids.
///
/// Layout results key maps by id and hand the same ids back in paths and
/// edge lists, so cloning has to be a refcount bump rather than a copy.
/// An empty id is how a missing id arrives from the host's JSON.
///
/// Equality, ordering and hashing are by content, so lookups through
/// `Borrow<str>` agree with the derived `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SharedStr {
    fn default() -> Self {
        SharedStr(Arc::from(""))
    }
}

impl PartialEq<&str> for SharedStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::ops::Deref for SharedStr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<SharedStr, _>` be queried with a plain `&str`.
impl std::borrow::Borrow<str> for SharedStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        SharedStr(s.into())
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        SharedStr(s.into())
    }
}

// Used by `tracing` fields (`id = %dep.id`).
impl std::fmt::Display for SharedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Hand-rolled so serde's `rc` feature stays off.
impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Owned `String` so escaped JSON ids deserialize too.
        String::deserialize(deserializer).map(SharedStr::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_compare_equal() {
        let a = SharedStr::from("att-1");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a, "att-1");
    }

    #[test]
    fn default_is_empty() {
        assert!(SharedStr::default().is_empty());
    }

    #[test]
    fn map_lookup_by_str() {
        let mut lanes = std::collections::HashMap::new();
        lanes.insert(SharedStr::from("att-1"), 3usize);
        assert_eq!(lanes.get("att-1"), Some(&3));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SharedStr::from("dep\"7");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, r#""dep\"7""#);
        let back: SharedStr = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back, "dep\"7");
    }

    #[test]
    fn displays_the_raw_id() {
        assert_eq!(SharedStr::from(String::from("tl-9")).to_string(), "tl-9");
    }

    #[test]
    fn orders_lexically() {
        assert!(SharedStr::from("a") < SharedStr::from("b"));
    }
}
