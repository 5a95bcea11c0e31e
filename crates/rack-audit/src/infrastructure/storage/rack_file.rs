//! Rack snapshot files.
//!
//! A rack file holds one [`Rack`] in TOML or JSON; the format is picked from
//! the file extension (`.json` for JSON, anything else for TOML):
//!
//! ```toml
//! name = "row-b-07"
//! height_units = 42
//!
//! [[devices]]
//! name = "core-sw-01"
//! type = "switch"
//! start_unit = 40
//! unit_span = 1
//! ```
//!
//! A devices file, used by `rack-audit import`, has the same `[[devices]]`
//! tables and nothing else.  JSON devices files may also be a bare array.
//!
//! Malformed fields (U0, zero spans, negative numbers) are rejected while the
//! file is parsed, so a loaded rack always holds well-formed devices.  Whether
//! they fit together is still up to the placement validator.

use std::path::{Path, PathBuf};

use rack_core::{Device, Rack, RackId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::application::edit_rack::{RackStore, StoreError};

/// Error type for rack file operations.
#[derive(Debug, Error)]
pub enum RackFileError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize rack: {0}")]
    SerializeToml(#[from] toml::ser::Error),

    #[error("failed to serialize rack: {0}")]
    SerializeJson(#[from] serde_json::Error),
}

impl RackFileError {
    fn is_not_found(&self) -> bool {
        matches!(self, RackFileError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

#[derive(Deserialize)]
struct DevicesFile {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDevices {
    Table(DevicesFile),
    Bare(Vec<Device>),
}

// ── Loading and saving ────────────────────────────────────────────────────────

/// Loads a rack snapshot from `path`.
///
/// # Errors
///
/// Returns [`RackFileError::Io`] if the file cannot be read, or a parse error
/// if its contents are not a valid rack.
pub fn load_rack_file(path: &Path) -> Result<Rack, RackFileError> {
    let content = read(path)?;
    let rack = parse(path, &content)?;
    debug!("loaded rack {} from {}", rack_label(&rack), path.display());
    Ok(rack)
}

/// Writes `rack` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`RackFileError::Io`] for file-system failures or a serialize
/// error if the rack cannot be encoded.
pub fn save_rack_file(path: &Path, rack: &Rack) -> Result<(), RackFileError> {
    let content = match Format::of(path) {
        Format::Toml => toml::to_string_pretty(rack)?,
        Format::Json => serde_json::to_string_pretty(rack)?,
    };
    write(path, &content)
}

/// Loads the device list of a devices file.
///
/// # Errors
///
/// Returns [`RackFileError::Io`] if the file cannot be read, or a parse error
/// if any device is malformed.
pub fn load_devices_file(path: &Path) -> Result<Vec<Device>, RackFileError> {
    let content = read(path)?;
    let devices = match Format::of(path) {
        Format::Toml => parse::<DevicesFile>(path, &content)?.devices,
        Format::Json => match parse::<JsonDevices>(path, &content)? {
            JsonDevices::Table(file) => file.devices,
            JsonDevices::Bare(devices) => devices,
        },
    };
    debug!("loaded {} devices from {}", devices.len(), path.display());
    Ok(devices)
}

// ── FileRackStore ─────────────────────────────────────────────────────────────

/// [`RackStore`] over a directory of `<rack-id>.toml` files.
#[derive(Debug, Clone)]
pub struct FileRackStore {
    dir: PathBuf,
}

impl FileRackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding rack `id`.
    pub fn path_for(&self, id: RackId) -> PathBuf {
        self.dir.join(format!("{id}.toml"))
    }
}

impl RackStore for FileRackStore {
    fn load(&self, id: RackId) -> Result<Rack, StoreError> {
        load_rack_file(&self.path_for(id)).map_err(|e| {
            if e.is_not_found() {
                StoreError::NotFound(id)
            } else {
                StoreError::Backend(e.to_string())
            }
        })
    }

    fn save(&self, rack: &Rack) -> Result<(), StoreError> {
        save_rack_file(&self.path_for(rack.id()), rack)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn read(path: &Path) -> Result<String, RackFileError> {
    std::fs::read_to_string(path).map_err(|source| RackFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), RackFileError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| RackFileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| RackFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, RackFileError> {
    match Format::of(path) {
        Format::Toml => toml::from_str(content).map_err(|source| RackFileError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        Format::Json => serde_json::from_str(content).map_err(|source| RackFileError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn rack_label(rack: &Rack) -> String {
    format!("{} ({}U, {} devices)", rack.name(), rack.height_units(), rack.devices().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::edit_rack::{RackEdit, RackEditor};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rack_audit_files_{}", Uuid::new_v4()))
    }

    fn sample_rack() -> Rack {
        Rack::new(
            "row-b-07",
            42,
            vec![
                Device::builder("core-sw-01", 40, 1).build().unwrap(),
                Device::builder("db-01", 10, 2).notes("primary").build().unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_format_is_chosen_by_extension() {
        assert_eq!(Format::of(Path::new("a.json")), Format::Json);
        assert_eq!(Format::of(Path::new("a.JSON")), Format::Json);
        assert_eq!(Format::of(Path::new("a.toml")), Format::Toml);
        assert_eq!(Format::of(Path::new("rack")), Format::Toml);
    }

    #[test]
    fn test_save_and_load_rack_file_toml() {
        let dir = temp_dir();
        let path = dir.join("rack.toml");
        let rack = sample_rack();

        save_rack_file(&path, &rack).unwrap();
        let loaded = load_rack_file(&path).unwrap();

        assert_eq!(loaded, rack);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_rack_file_json() {
        let dir = temp_dir();
        let path = dir.join("rack.json");
        let rack = sample_rack();

        save_rack_file(&path, &rack).unwrap();
        let loaded = load_rack_file(&path).unwrap();

        assert_eq!(loaded, rack);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_hand_written_toml_applies_defaults() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rack.toml");
        std::fs::write(
            &path,
            r#"
name = "lab"

[[devices]]
name = "pdu"
start_unit = 1
"#,
        )
        .unwrap();

        let rack = load_rack_file(&path).unwrap();

        assert_eq!(rack.height_units(), 42);
        assert_eq!(rack.devices()[0].unit_span(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rack_file_rejects_unit_zero() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rack.toml");
        std::fs::write(&path, "name = \"bad\"\n[[devices]]\nname = \"x\"\nstart_unit = 0\n").unwrap();

        assert!(matches!(load_rack_file(&path), Err(RackFileError::Toml { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_devices_file_accepts_bare_json_array() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("devices.json");
        std::fs::write(
            &path,
            r#"[{"name": "a", "start_unit": 1, "unit_span": 2}, {"name": "b", "start_unit": 3}]"#,
        )
        .unwrap();

        let devices = load_devices_file(&path).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].unit_span(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_devices_file_toml_tables() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("devices.toml");
        std::fs::write(
            &path,
            "[[devices]]\nname = \"a\"\nstart_unit = 5\n\n[[devices]]\nname = \"b\"\nstart_unit = 6\n",
        )
        .unwrap();

        let names: Vec<String> = load_devices_file(&path)
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        assert_eq!(names, vec!["a", "b"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_missing_rack_is_not_found() {
        let store = FileRackStore::new(temp_dir());
        let id = Uuid::new_v4();
        assert_eq!(store.load(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_file_store_backs_rack_editor() {
        // Arrange
        let dir = temp_dir();
        let store = FileRackStore::new(&dir);
        let rack = sample_rack();
        store.save(&rack).unwrap();
        let editor = RackEditor::new(store);

        // Act
        let new_device = Device::builder("web-01", 20, 1).build().unwrap();
        editor
            .apply_and_save(rack.id(), &RackEdit::Add(new_device))
            .unwrap();

        // Assert
        let reloaded = editor.store().load(rack.id()).unwrap();
        assert_eq!(reloaded.devices().len(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }
}
