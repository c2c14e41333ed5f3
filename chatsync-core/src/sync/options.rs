//! Sync behaviour switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether `load` also applies messages already stored remotely.
///
/// Hydrated messages go through the same deduplication as incoming ones.
///
/// Parsed from `none`, `all` or `last:N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Hydration {
    /// Conversations start empty; only incoming messages populate them.
    #[default]
    None,
    /// Apply every stored message.
    All,
    /// Apply the last N stored messages of each conversation. Entries that
    /// don't decode as messages are dropped before counting.
    Last(usize),
}

impl Hydration {
    /// Selects the part of `messages` to hydrate.
    pub fn select<'a, T>(&self, messages: &'a [T]) -> &'a [T] {
        match self {
            Hydration::None => &[],
            Hydration::All => messages,
            Hydration::Last(n) => &messages[messages.len().saturating_sub(*n)..],
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid hydration '{0}': expected none, all or last:N")]
pub struct HydrationParseError(String);

impl FromStr for Hydration {
    type Err = HydrationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "none" => Ok(Hydration::None),
            "all" => Ok(Hydration::All),
            _ => s
                .strip_prefix("last:")
                .and_then(|n| n.trim().parse().ok())
                .map(Hydration::Last)
                .ok_or_else(|| HydrationParseError(s.clone())),
        }
    }
}

impl TryFrom<String> for Hydration {
    type Error = HydrationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Hydration> for String {
    fn from(value: Hydration) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Hydration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hydration::None => write!(f, "none"),
            Hydration::All => write!(f, "all"),
            Hydration::Last(n) => write!(f, "last:{}", n),
        }
    }
}

/// Options for [`ConversationSync`](super::ConversationSync).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub hydration: Hydration,
}

impl SyncOptions {
    pub fn with_hydration(mut self, hydration: Hydration) -> Self {
        self.hydration = hydration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hydration() {
        assert_eq!("none".parse(), Ok(Hydration::None));
        assert_eq!("ALL".parse(), Ok(Hydration::All));
        assert_eq!("last:20".parse(), Ok(Hydration::Last(20)));
        assert_eq!("last: 3".parse(), Ok(Hydration::Last(3)));
        assert!("last:".parse::<Hydration>().is_err());
        assert!("some".parse::<Hydration>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for h in [Hydration::None, Hydration::All, Hydration::Last(7)] {
            assert_eq!(h.to_string().parse(), Ok(h));
        }
    }

    #[test]
    fn test_select() {
        let items = [1, 2, 3, 4];
        assert!(Hydration::None.select(&items).is_empty());
        assert_eq!(Hydration::All.select(&items), &[1, 2, 3, 4]);
        assert_eq!(Hydration::Last(2).select(&items), &[3, 4]);
        assert_eq!(Hydration::Last(10).select(&items), &[1, 2, 3, 4]);
        assert!(Hydration::Last(0).select(&items).is_empty());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Hydration::Last(5)).unwrap();
        assert_eq!(json, "\"last:5\"");
        let parsed: Hydration = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, Hydration::All);
        assert!(serde_json::from_str::<Hydration>("\"bogus\"").is_err());
    }
}
