//! File-backed persistence of route data.
//!
//! # Responsibilities
//! - Read a route file in one of the supported formats and build a snapshot
//! - Write a snapshot back, replacing the file atomically
//!
//! # Design Decisions
//! - The path lives in an explicit `RouteStore`, never in global state
//! - Each save writes its own uniquely named temp file in the target's
//!   directory and renames it over the target, so a failed or concurrent
//!   save never leaves a partial file in place

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::codec::build::{build_route_data, record_from_data};
use crate::codec::grammar::parse_record;
use crate::codec::record::RouteRecord;
use crate::codec::writer::write_record;
use crate::error::{Result, RouteError};
use crate::routing::data::RouteData;

/// On-disk representation of a route record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteFormat {
    /// `domain { prefix { target { } } }` grammar.
    #[default]
    Native,
    Toml,
    Json,
}

impl RouteFormat {
    /// Infer the format from a file extension; anything unknown is native.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => RouteFormat::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => RouteFormat::Json,
            _ => RouteFormat::Native,
        }
    }

    /// Parse `text` into a record.
    pub fn decode(self, text: &str, source_name: &str) -> Result<RouteRecord> {
        match self {
            RouteFormat::Native => parse_record(text, source_name),
            RouteFormat::Toml => toml::from_str(text).map_err(|e| RouteError::ConfigParse {
                source_name: source_name.to_string(),
                line: e.span().map_or(0, |span| line_of(text, span.start)),
                section: "<toml>".to_string(),
                message: e.message().to_string(),
            }),
            RouteFormat::Json => serde_json::from_str(text).map_err(|e| RouteError::ConfigParse {
                source_name: source_name.to_string(),
                line: e.line(),
                section: "<json>".to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Render a record.
    pub fn encode(self, record: &RouteRecord) -> Result<String> {
        match self {
            RouteFormat::Native => Ok(write_record(record)),
            RouteFormat::Toml => toml::to_string_pretty(record).map_err(|e| RouteError::Encode(e.to_string())),
            RouteFormat::Json => {
                serde_json::to_string_pretty(record).map_err(|e| RouteError::Encode(e.to_string()))
            }
        }
    }
}

impl FromStr for RouteFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "conf" => Ok(RouteFormat::Native),
            "toml" => Ok(RouteFormat::Toml),
            "json" => Ok(RouteFormat::Json),
            other => Err(format!("unknown route format {other:?} (expected native, toml or json)")),
        }
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()
        .iter()
        .take(offset)
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// A route file and its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStore {
    path: PathBuf,
    format: RouteFormat,
}

impl RouteStore {
    /// Store at `path`, with the format inferred from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = RouteFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(path: impl Into<PathBuf>, format: RouteFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RouteFormat {
        self.format
    }

    /// Read and parse the file without building a snapshot.
    pub fn load_record(&self) -> Result<RouteRecord> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RouteError::ConfigNotFound {
                path: self.path.clone(),
            },
            _ => RouteError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;
        self.format.decode(&text, &self.path.display().to_string())
    }

    /// Read the file and build a snapshot from it.
    pub fn load(&self) -> Result<RouteData> {
        let record = self.load_record()?;
        build_route_data(&record)
    }

    /// Write `data` to the file, replacing it only once fully written.
    pub fn save(&self, data: &RouteData) -> Result<()> {
        let text = self.format.encode(&record_from_data(data))?;
        self.write_atomic(text.as_bytes())
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let io_err = |source| RouteError::Io {
            path: self.path.clone(),
            source,
        };

        // A private temp file per save; it is removed on drop if never persisted.
        let mut tmp = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .suffix(".tmp")
            .tempfile_in(self.dir())
            .map_err(io_err)?;
        tmp.write_all(contents).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::info!(path = %self.path.display(), bytes = contents.len(), "Route data saved");
        Ok(())
    }

    /// Directory holding the route file.
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Hidden sibling name, so watchers filtering on the file name skip it.
    fn temp_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "routes".into(), |n| n.to_string_lossy());
        format!(".{name}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RouteFormat::from_path(Path::new("routes.conf")), RouteFormat::Native);
        assert_eq!(RouteFormat::from_path(Path::new("routes.TOML")), RouteFormat::Toml);
        assert_eq!(RouteFormat::from_path(Path::new("routes.json")), RouteFormat::Json);
        assert_eq!(RouteFormat::from_path(Path::new("routes")), RouteFormat::Native);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("TOML".parse::<RouteFormat>(), Ok(RouteFormat::Toml));
        assert_eq!("native".parse::<RouteFormat>(), Ok(RouteFormat::Native));
        assert!("yaml".parse::<RouteFormat>().is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::new(dir.path().join("absent.conf"));
        assert!(matches!(store.load(), Err(RouteError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::new(dir.path().join("no/such/dir/routes.conf"));
        let err = store.save(&RouteData::default()).unwrap_err();
        assert!(matches!(err, RouteError::Io { .. }));
    }

    #[test]
    fn test_toml_decode_error_has_line() {
        let text = "[[domain]]\nname = \"voice\"\n[[domain.prefix]]\nprefix = 49\n";
        match RouteFormat::Toml.decode(text, "routes.toml") {
            Err(RouteError::ConfigParse { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_temp_files_are_hidden_siblings() {
        let store = RouteStore::new("/var/lib/routes/carrier.conf");
        assert_eq!(store.dir(), Path::new("/var/lib/routes"));
        assert_eq!(store.temp_prefix(), ".carrier.conf.");
        assert_eq!(RouteStore::new("carrier.conf").dir(), Path::new("."));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::new(dir.path().join("routes.conf"));
        store.save(&RouteData::default()).unwrap();
        store.save(&RouteData::default()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("routes.conf")]);
    }
}
