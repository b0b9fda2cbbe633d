//! Rich-text editor mode switch.
//!
//! The embedded editor exposes two flags, read-only and "is suggesting". The mode
//! dropdown picks one of four modes, and every transition sets both flags from the
//! target mode alone, whatever the previous mode was.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum EditorMode {
    /// Authoring.
    #[default]
    Editing,
    /// Admin read-only view with comments and history.
    Viewing,
    /// Public, minimal read-only view.
    ViewClient,
    /// Track-changes editing.
    Suggestion,
}

/// Flags pushed to the embedded editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct EditorFlags {
    pub read_only: bool,
    pub suggesting: bool,
}

impl EditorMode {
    pub const ALL: [EditorMode; 4] = [
        EditorMode::Editing,
        EditorMode::Viewing,
        EditorMode::ViewClient,
        EditorMode::Suggestion,
    ];

    pub fn flags(self) -> EditorFlags {
        match self {
            EditorMode::Editing => EditorFlags {
                read_only: false,
                suggesting: false,
            },
            EditorMode::Viewing | EditorMode::ViewClient => EditorFlags {
                read_only: true,
                suggesting: false,
            },
            EditorMode::Suggestion => EditorFlags {
                read_only: false,
                suggesting: true,
            },
        }
    }

    /// Wire name, as used by the frontend dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            EditorMode::Editing => "editing",
            EditorMode::Viewing => "viewing",
            EditorMode::ViewClient => "viewClient",
            EditorMode::Suggestion => "suggestion",
        }
    }

    /// Dropdown label.
    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Editing => "Editing",
            EditorMode::Viewing => "Viewing",
            EditorMode::ViewClient => "Reader view",
            EditorMode::Suggestion => "Suggesting",
        }
    }

    /// Admin modes that load the collaboration features (comments, track changes).
    pub fn collaborative(self) -> bool {
        matches!(self, EditorMode::Viewing | EditorMode::Suggestion)
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEditorMode(pub String);

impl fmt::Display for UnknownEditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown editor mode: {}", self.0)
    }
}

impl std::error::Error for UnknownEditorMode {}

impl FromStr for EditorMode {
    type Err = UnknownEditorMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditorMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownEditorMode(s.to_string()))
    }
}

/// Current mode plus the flags last pushed to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorModeSwitch {
    mode: EditorMode,
    flags: EditorFlags,
}

impl Default for EditorModeSwitch {
    fn default() -> Self {
        Self::new(EditorMode::default())
    }
}

impl EditorModeSwitch {
    pub fn new(mode: EditorMode) -> Self {
        Self {
            mode,
            flags: mode.flags(),
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn flags(&self) -> EditorFlags {
        self.flags
    }

    pub fn read_only(&self) -> bool {
        self.flags.read_only
    }

    pub fn suggesting(&self) -> bool {
        self.flags.suggesting
    }

    /// Switches mode and returns the flags to push to the editor.
    pub fn set_mode(&mut self, mode: EditorMode) -> EditorFlags {
        self.mode = mode;
        self.flags = mode.flags();
        self.flags
    }
}
