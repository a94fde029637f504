//!
//! # Serialization & Deserialization Utilities
//!
//! Circuit descriptions and placement configurations are plain [serde] data,
//! readable and writable as JSON, YAML, or TOML.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use serde::de::DeserializeOwned;
use serde::Serialize;
use textwrap::dedent;

/// # Enumerated Supported Serialization Formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    Json,
    Yaml,
    Toml,
}
impl SerializationFormat {
    /// Infer a format from the extension of `fname`, if it has a recognized one.
    pub fn from_path(fname: impl AsRef<Path>) -> Option<Self> {
        let ext = fname.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
    /// Convert any [serde::Serialize] data to a serialized string
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, Error> {
        match *self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            Self::Yaml => Ok(serde_yaml::to_string(data)?),
            Self::Toml => Ok(toml::to_string(data)?),
        }
    }
    /// Parse string `s`.
    /// Common leading indentation is removed first, so inline test-data can be indented.
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        self.parse(&dedent(s))
    }
    fn parse<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        let rv = match *self {
            Self::Json => serde_json::from_str(s)?,
            Self::Yaml => serde_yaml::from_str(s)?,
            Self::Toml => toml::from_str(s)?,
        };
        Ok(rv)
    }
    /// Write `data` to file `fname`, replacing any existing content
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(fname, self.to_string(data)?)?;
        Ok(())
    }
    /// Read and parse file `fname`
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, Error> {
        self.parse(&std::fs::read_to_string(fname)?)
    }
}

/// # Serde File Trait
/// File load and save for any serde data type. Implementors need no method bodies.
pub trait SerdeFile: Serialize + DeserializeOwned {
    fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> Result<(), Error> {
        fmt.save(self, fname)
    }
    fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> Result<Self, Error> {
        fmt.open(fname)
    }
    /// Open from file `fname`, inferring its format from the file extension
    fn open_any(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let fmt = SerializationFormat::from_path(&fname).ok_or_else(|| {
            Error::UnknownFormat(fname.as_ref().display().to_string())
        })?;
        fmt.open(fname)
    }
}

/// Serialization and file-IO errors
#[derive(Debug)]
pub enum Error {
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    TomlSer(toml::ser::Error),
    TomlDe(toml::de::Error),
    Io(std::io::Error),
    /// No format could be inferred for the named file
    UnknownFormat(String),
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Yaml(e) => write!(f, "YAML error: {}", e),
            Self::TomlSer(e) => write!(f, "TOML serialization error: {}", e),
            Self::TomlDe(e) => write!(f, "TOML parse error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::UnknownFormat(s) => write!(f, "unknown serialization format for `{}`", s),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::TomlSer(e) => Some(e),
            Self::TomlDe(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::UnknownFormat(_) => None,
        }
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}
impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSer(e)
    }
}
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlDe(e)
    }
}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
