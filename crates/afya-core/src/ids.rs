//! Branded ID newtypes.
//!
//! Sessions, connections, and claims each get a distinct `String` newtype so
//! one cannot be passed where another is expected. Generated IDs are UUID v7
//! (time-ordered); client-supplied session IDs are accepted as-is after
//! validation at the request boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// View the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id! {
    /// Identifier for one logical streaming interaction.
    SessionId
}

branded_id! {
    /// Identifier for a live WebSocket connection.
    ConnectionId
}

branded_id! {
    /// Identifier assigned to an accepted claim submission.
    ClaimId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuid_v7() {
        let id = SessionId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn from_client_supplied_string() {
        let id = SessionId::from("mobile-session-42");
        assert_eq!(id.as_str(), "mobile-session-42");
    }

    #[test]
    fn display_matches_inner() {
        let id = ClaimId::from("claim-1");
        assert_eq!(format!("{id}"), "claim-1");
    }

    #[test]
    fn serde_is_transparent() {
        let id = SessionId::from("s-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"s-1\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn into_inner_round_trips() {
        let id = ConnectionId::from("c-9");
        assert_eq!(id.into_inner(), "c-9");
    }
}
