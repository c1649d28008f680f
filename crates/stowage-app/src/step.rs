//! Named stages of a backup cycle.

use std::fmt;

/// Stage a backup cycle is executing; failures are attributed to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleStep {
    /// Running the database dump tool.
    Dumping,
    /// Zipping the dump directory.
    Compressing,
    /// Loading credentials and obtaining an access token.
    Authenticating,
    /// Looking up the destination folder by name.
    ResolvingDestination,
    /// Uploading the archive.
    Uploading,
    /// Removing the dump directory and archive.
    CleaningUp,
}

impl CycleStep {
    /// Every step in execution order.
    pub const ALL: [Self; 6] = [
        Self::Dumping,
        Self::Compressing,
        Self::Authenticating,
        Self::ResolvingDestination,
        Self::Uploading,
        Self::CleaningUp,
    ];

    /// Stable label used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dumping => "dumping",
            Self::Compressing => "compressing",
            Self::Authenticating => "authenticating",
            Self::ResolvingDestination => "resolving_destination",
            Self::Uploading => "uploading",
            Self::CleaningUp => "cleaning_up",
        }
    }
}

impl fmt::Display for CycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
