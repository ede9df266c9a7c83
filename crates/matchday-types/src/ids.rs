//! Type-safe numeric identifiers.
//!
//! Every entity in the simulation carries a strongly-typed ID so a team id
//! can never be passed where a player id is expected. IDs are plain `u32`
//! sequence numbers handed out in creation order, which keeps "first" and
//! "earliest" well defined wherever they are stored in ordered maps.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw sequence number.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner sequence number.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// The identifier immediately after this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a team.
    TeamId
}

define_id! {
    /// Unique identifier for a player.
    PlayerId
}

define_id! {
    /// Unique identifier for a match activated from a fixture.
    MatchId
}

define_id! {
    /// Unique identifier for a fixture within a season schedule.
    FixtureId
}

define_id! {
    /// Unique identifier for a commentary entry.
    CommentaryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_sequence() {
        let a = MatchId::new(3);
        let b = a.next();
        assert!(a < b);
        assert_eq!(b.into_inner(), 4);
    }

    #[test]
    fn next_saturates() {
        assert_eq!(PlayerId::new(u32::MAX).next(), PlayerId::new(u32::MAX));
    }

    #[test]
    fn display_is_raw_number() {
        assert_eq!(TeamId::new(21).to_string(), "21");
    }
}
