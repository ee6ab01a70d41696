//! Camera arbiter types

use crate::error::DispatchError;
use crate::spatial_resolver::{FLOOR_COUNT, ZONES_PER_FLOOR};
use serde::{Deserialize, Serialize};

/// Number of addressable camera feeds (one per floor/zone)
pub const FEED_COUNT: u8 = FLOOR_COUNT * ZONES_PER_FLOOR;

/// Validated feed index in `[0, FEED_COUNT)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CameraFeedIndex(u8);

impl CameraFeedIndex {
    pub fn new(index: u8) -> Result<Self, DispatchError> {
        if index < FEED_COUNT {
            Ok(Self(index))
        } else {
            Err(DispatchError::OutOfRange {
                kind: "feed index",
                value: index as u32,
            })
        }
    }

    /// `floor_index * 7 + zone_index`
    pub fn from_location(floor_index: u8, zone_index: u8) -> Result<Self, DispatchError> {
        if floor_index >= FLOOR_COUNT {
            return Err(DispatchError::OutOfRange {
                kind: "floor index",
                value: floor_index as u32,
            });
        }
        if zone_index >= ZONES_PER_FLOOR {
            return Err(DispatchError::OutOfRange {
                kind: "zone index",
                value: zone_index as u32,
            });
        }
        Ok(Self(floor_index * ZONES_PER_FLOOR + zone_index))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn floor_index(self) -> u8 {
        self.0 / ZONES_PER_FLOOR
    }

    pub fn zone_index(self) -> u8 {
        self.0 % ZONES_PER_FLOOR
    }
}

impl TryFrom<u8> for CameraFeedIndex {
    type Error = DispatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CameraFeedIndex> for u8 {
    fn from(feed: CameraFeedIndex) -> Self {
        feed.0
    }
}

/// Lock state of the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked,
}

/// Arbiter state: at most one active feed plus the manual-override lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraArbiterState {
    pub active_feed: Option<CameraFeedIndex>,
    pub locked: bool,
}

impl CameraArbiterState {
    pub fn lock_state(&self) -> LockState {
        if self.locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }
}

/// Result of a `select` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectOutcome {
    /// Active feed was (re)targeted
    Switched {
        previous: Option<CameraFeedIndex>,
        feed: CameraFeedIndex,
        locked: bool,
    },
    /// Automated request ignored while locked
    Suppressed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_index_formula() {
        // floor 4 is index 3
        let feed = CameraFeedIndex::from_location(3, 2).unwrap();
        assert_eq!(feed.value(), 23);
        assert_eq!(feed.floor_index(), 3);
        assert_eq!(feed.zone_index(), 2);

        assert_eq!(CameraFeedIndex::from_location(0, 0).unwrap().value(), 0);
        assert_eq!(CameraFeedIndex::from_location(5, 6).unwrap().value(), 41);
    }

    #[test]
    fn test_feed_index_bounds() {
        assert!(CameraFeedIndex::new(41).is_ok());
        assert_eq!(
            CameraFeedIndex::new(42),
            Err(DispatchError::OutOfRange {
                kind: "feed index",
                value: 42
            })
        );
        assert!(CameraFeedIndex::from_location(6, 0).is_err());
        assert!(CameraFeedIndex::from_location(0, 7).is_err());
    }

    #[test]
    fn test_feed_index_serde_rejects_out_of_range() {
        let feed: CameraFeedIndex = serde_json::from_str("17").unwrap();
        assert_eq!(feed.value(), 17);
        assert!(serde_json::from_str::<CameraFeedIndex>("42").is_err());
    }
}
