//! Strongly-typed identifiers for ledger entities
//!
//! Accounts and journal entries are keyed by plain integers in storage and on
//! the wire. Newtype wrappers keep the two key spaces from being mixed up in
//! code while serializing transparently as numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $repr:ty, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            /// Wraps a raw key
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Returns the raw key
            pub const fn value(&self) -> $repr {
                self.0
            }

            /// Returns the identifier prefix accepted when parsing
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.trim().parse()?))
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $repr {
            fn from(id: $name) -> $repr {
                id.0
            }
        }
    };
}

define_id!(AccountId, i32, "ACC");
define_id!(JournalEntryId, i64, "JNL");
