use serde::{Deserialize, Serialize};

/// A node's self-declared preference for being chosen as an MPR.
///
/// Ordered by value, so `Willingness::High > Willingness::Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Willingness {
    Never = 0,
    Low = 1,
    Default = 3,
    High = 7,
    Always = 255,
}

impl Willingness {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// `Never` nodes must not be picked as relays.
    pub fn is_eligible(self) -> bool {
        self != Willingness::Never
    }
}

impl Default for Willingness {
    fn default() -> Self {
        Willingness::Default
    }
}
