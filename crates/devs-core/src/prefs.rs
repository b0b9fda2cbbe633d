//! UI preferences with explicit load/save boundaries.
//!
//! `PreferenceStore` is constructed once at startup from a JSON file and writes
//! through on every change. A missing file yields defaults; an unreadable or corrupt
//! file is logged and also yields defaults. Writes go to a temp file in the same
//! directory and are renamed over the target, so readers never see partial JSON.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::editor::EditorMode;

/// Upper bound for the glass-surface blur radius (px).
pub const MAX_GLASS_BLUR: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Decorative surface settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct VisualEffects {
    /// Backdrop blur radius in pixels, `0..=MAX_GLASS_BLUR`.
    pub glass_blur: u8,
    /// Surface opacity, `0.0..=1.0`.
    pub glass_opacity: f32,
    pub shader_animation: bool,
    pub reduced_motion: bool,
}

impl Default for VisualEffects {
    fn default() -> Self {
        Self {
            glass_blur: 12,
            glass_opacity: 0.6,
            shader_animation: true,
            reduced_motion: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Preferences {
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub editor_mode: EditorMode,
    pub effects: VisualEffects,
}

impl Preferences {
    /// Clamps values into their valid ranges. Reduced motion turns shaders off.
    pub fn normalized(mut self) -> Self {
        self.effects.glass_blur = self.effects.glass_blur.min(MAX_GLASS_BLUR);
        self.effects.glass_opacity = if self.effects.glass_opacity.is_finite() {
            self.effects.glass_opacity.clamp(0.0, 1.0)
        } else {
            VisualEffects::default().glass_opacity
        };
        if self.effects.reduced_motion {
            self.effects.shader_animation = false;
        }
        self
    }
}

/// Error type for preference persistence.
#[derive(Debug)]
pub enum PrefsError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefsError::Io(e) => write!(f, "preferences I/O error: {}", e),
            PrefsError::Serialize(e) => write!(f, "preferences encoding error: {}", e),
        }
    }
}

impl std::error::Error for PrefsError {}

impl From<io::Error> for PrefsError {
    fn from(e: io::Error) -> Self {
        PrefsError::Io(e)
    }
}

impl From<serde_json::Error> for PrefsError {
    fn from(e: serde_json::Error) -> Self {
        PrefsError::Serialize(e)
    }
}

/// File-backed preference state.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Loads preferences from `path`, falling back to defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Preferences>(&bytes) {
                Ok(p) => {
                    info!(path = %path.display(), "preferences loaded");
                    p.normalized()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt preferences, using defaults");
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no preferences file, using defaults");
                Preferences::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable preferences, using defaults");
                Preferences::default()
            }
        };
        Self { path, prefs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    /// Applies `f` to a copy, persists it, then commits it in memory.
    /// On a failed write the in-memory state is left untouched.
    pub fn update<F>(&mut self, f: F) -> Result<&Preferences, PrefsError>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut next = self.prefs.clone();
        f(&mut next);
        self.replace(next)
    }

    /// Replaces all preferences (write-through).
    pub fn replace(&mut self, prefs: Preferences) -> Result<&Preferences, PrefsError> {
        let prefs = prefs.normalized();
        if prefs != self.prefs || !self.path.exists() {
            save(&self.path, &prefs)?;
            debug!(path = %self.path.display(), "preferences saved");
        }
        self.prefs = prefs;
        Ok(&self.prefs)
    }
}

fn save(path: &Path, prefs: &Preferences) -> Result<(), PrefsError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, prefs)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PrefsError::Io(e.error))?;
    Ok(())
}
