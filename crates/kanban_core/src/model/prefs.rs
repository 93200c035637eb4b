//! UI preferences persisted next to the workspace.

/// Main view selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Board,
    Notes,
}

impl ViewMode {
    /// Parses the stored flag; anything but `notes` is the board.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("notes") => Self::Notes,
            _ => Self::Board,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Notes => "notes",
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// Parses the stored flag, deferring to the OS preference when absent.
    pub fn from_stored(value: Option<&str>, os_prefers_dark: bool) -> Self {
        match value.map(str::trim) {
            Some("dark") => Self::Dark,
            Some("light") => Self::Light,
            _ if os_prefers_dark => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn as_key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}
