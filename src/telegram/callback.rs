//! Compact callback payload codec.
//!
//! Button payloads are `action` or `action:key=value[:key=value]`, kept
//! well under the platform's 64-byte payload limit. Callers treat the
//! encoding as an opaque token addressed by action name plus one to
//! three scalar fields.

/// Decoded callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    /// Action name routing the press to a handler.
    pub action: String,
    /// Ordered scalar fields.
    pub args: Vec<(String, String)>,
}

impl CallbackData {
    /// Start a payload for an action.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Vec::new(),
        }
    }

    /// Append one scalar field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((key.into(), value.into()));
        self
    }

    /// Encode to the wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = self.action.clone();
        for (key, value) in &self.args {
            out.push(':');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }

    /// Decode a wire payload.
    ///
    /// Returns `None` for payloads that do not follow the
    /// `action[:key=value]*` grammar.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let action = parts.next()?;
        if action.is_empty() {
            return None;
        }
        let mut args = Vec::new();
        for part in parts {
            let (key, value) = part.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            args.push((key.to_owned(), value.to_owned()));
        }
        Some(Self {
            action: action.to_owned(),
            args,
        })
    }

    /// Look up a field by key.
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
