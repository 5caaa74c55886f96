//! App icon badge setting.

/// What a notification does to the app icon badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Badge {
    /// Leave the current badge as is; no `badge` key is sent.
    #[default]
    Preserve,
    /// Remove the badge (sent as `0`).
    Clear,
    /// Show this number.
    Count(u32),
}

impl Badge {
    /// Value for the `badge` key, or `None` when the key is omitted.
    pub fn number(self) -> Option<u32> {
        match self {
            Badge::Preserve => None,
            Badge::Clear => Some(0),
            Badge::Count(n) => Some(n),
        }
    }
}
