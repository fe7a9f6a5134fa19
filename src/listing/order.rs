use std::fmt;

const DESCENDING_MARKER: char = '-';

/// A column the listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Size,
    Date,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::Date => "date",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "name" => Some(SortKey::Name),
            "size" => Some(SortKey::Size),
            "date" => Some(SortKey::Date),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which keys may be ordered by, and which of them show largest/newest first.
#[derive(Debug, Clone)]
pub struct OrderPolicy {
    /// Valid keys; the first one is the fallback.
    pub keys: Vec<SortKey>,
    pub descending_by_default: Vec<SortKey>,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            keys: vec![SortKey::Name, SortKey::Size, SortKey::Date],
            descending_by_default: vec![SortKey::Size, SortKey::Date],
        }
    }
}

/// Sort state derived from the `order` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderState {
    pub active_key: SortKey,
    /// The token exactly as requested, empty if absent.
    pub raw_token: String,
    /// Direction the token asked for, before the per-key default applies.
    pub requested_ascending: bool,
    /// Direction actually displayed.
    pub reversed: bool,
    pub next_tokens: Vec<(SortKey, String)>,
}

impl OrderState {
    pub fn from_token(token: Option<&str>, policy: &OrderPolicy) -> Self {
        let raw_token = token.unwrap_or_default().to_string();
        let fallback = policy.keys.first().copied().unwrap_or(SortKey::Name);

        let (requested_ascending, key_token) = match raw_token.strip_prefix(DESCENDING_MARKER) {
            Some(rest) => (false, rest),
            None => (true, raw_token.as_str()),
        };

        let (active_key, requested_ascending) = match SortKey::parse(key_token) {
            Some(key) if policy.keys.contains(&key) => (key, requested_ascending),
            _ => (fallback, true),
        };

        let next_tokens = policy
            .keys
            .iter()
            .map(|&key| {
                let token = if key == active_key && requested_ascending {
                    format!("{}{}", DESCENDING_MARKER, key)
                } else {
                    key.to_string()
                };
                (key, token)
            })
            .collect();

        let reversed = (!requested_ascending) ^ policy.descending_by_default.contains(&active_key);

        Self {
            active_key,
            raw_token,
            requested_ascending,
            reversed,
            next_tokens,
        }
    }

    /// Token a click on `key`'s column header should request.
    pub fn next_token(&self, key: SortKey) -> &str {
        self.next_tokens
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, token)| token.as_str())
            .unwrap_or(key.as_str())
    }

    pub fn is_active(&self, key: SortKey) -> bool {
        self.active_key == key
    }

    /// CSS class marking the active column and its displayed direction.
    pub fn css_class(&self, key: SortKey) -> &'static str {
        match (self.is_active(key), self.reversed) {
            (false, _) => "",
            (true, false) => "order-asc",
            (true, true) => "order-desc",
        }
    }
}
