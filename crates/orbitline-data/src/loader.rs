//! Format detection (RON/JSON/TOML), file discovery and deserialization
//! helpers used by the campaign loading pipeline.

use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Why a campaign directory failed to load.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The campaign directory has no file with this base name.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// Not a `.ron`, `.toml` or `.json` file.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same campaign or flow file was authored in two formats.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file does not match the campaign or flow schema.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A loop, day or event name was used twice in the same scope.
    #[error("duplicate {scope} name '{name}' in {file}")]
    DuplicateName {
        file: PathBuf,
        name: String,
        scope: &'static str,
    },

    /// An event definition cannot be run.
    #[error("invalid event '{event}' in {file}: {detail}")]
    InvalidEvent {
        file: PathBuf,
        event: String,
        detail: String,
    },

    /// A controller tuning file holds values the controller cannot use.
    #[error("invalid flow config in {file}: {detail}")]
    InvalidConfig { file: PathBuf, detail: String },

    /// Reading the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Authoring formats a campaign directory may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Pick the parser for a campaign or flow file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate `campaign`, `flow` or another base name inside a campaign
/// directory, in whichever of the three formats it was authored.
///
/// Absent is `Ok(None)`. Authoring the same file twice in different
/// formats is `ConflictingFormats`.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// [`find_data_file`] for files a campaign cannot do without.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a campaign or flow file with the parser its extension calls for.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize already-read `content`; `path` is only used in errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

// ===========================================================================
// Name helpers
// ===========================================================================

/// Record `name` in `seen`, returning a `DuplicateName` error if it was
/// already there.
pub fn check_duplicate(
    seen: &mut HashSet<String>,
    name: &str,
    scope: &'static str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if seen.insert(name.to_string()) {
        Ok(())
    } else {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
            scope,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
