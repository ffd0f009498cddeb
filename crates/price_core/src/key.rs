use std::fmt;

/// Identifies what to fetch: a coin symbol taken from the route.
///
/// Symbols are trimmed and upper-cased, so `" btc"` and `"BTC"` compare equal.
/// A blank input produces the empty key, which resolves to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_ascii_uppercase())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RequestKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Option<&str>> for RequestKey {
    fn from(value: Option<&str>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generation number of an issued fetch. Only the newest one may commit state.
pub type RequestId = u64;

/// Remembers the last key handed to the controller and reports real changes.
///
/// Mirrors a dependency-gated re-run: callers only forward a key to
/// `Msg::KeyChanged` when [`KeyGate::changed`] says it differs.
#[derive(Debug, Clone, Default)]
pub struct KeyGate {
    last: Option<RequestKey>,
}

impl KeyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` and returns true if it differs from the previous one.
    /// The first key seen always counts as a change.
    pub fn changed(&mut self, key: &RequestKey) -> bool {
        if self.last.as_ref() == Some(key) {
            return false;
        }
        self.last = Some(key.clone());
        true
    }

    pub fn last(&self) -> Option<&RequestKey> {
        self.last.as_ref()
    }
}
