use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest local id a plugin can assign (24 bits; the high byte is the load index).
pub const MAX_LOCAL_ID: u32 = 0x00FF_FFFF;

/// Identifies a plugin (one layer of the load order) by its file name,
/// e.g. `Fallout4.esm`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModKey(String);

impl ModKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifies a logical record independently of the layers that define it.
///
/// The origin plugin plus the plugin-local id are stable across overrides: a
/// plugin that overrides `000801:Fallout4.esm` keeps that exact key. The text
/// form is six hex digits, a colon, then the origin file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    pub origin: ModKey,
    pub local: u32,
}

impl FormKey {
    pub fn new(local: u32, origin: impl Into<ModKey>) -> Self {
        Self {
            origin: origin.into(),
            local,
        }
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.local, self.origin)
    }
}

/// Errors produced when parsing the text form of a [`FormKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormKeyParseError {
    #[error("form key '{0}' is missing the ':' separator")]
    MissingSeparator(String),
    #[error("form key '{0}' has an invalid hex id")]
    InvalidId(String),
    #[error("form key '{0}' id exceeds {MAX_LOCAL_ID:06X}")]
    IdOutOfRange(String),
    #[error("form key '{0}' has an empty plugin name")]
    EmptyPlugin(String),
}

impl FromStr for FormKey {
    type Err = FormKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, plugin) = s
            .split_once(':')
            .ok_or_else(|| FormKeyParseError::MissingSeparator(s.to_string()))?;
        if id.is_empty() || id.len() > 8 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FormKeyParseError::InvalidId(s.to_string()));
        }
        let local =
            u32::from_str_radix(id, 16).map_err(|_| FormKeyParseError::InvalidId(s.to_string()))?;
        if local > MAX_LOCAL_ID {
            return Err(FormKeyParseError::IdOutOfRange(s.to_string()));
        }
        if plugin.is_empty() {
            return Err(FormKeyParseError::EmptyPlugin(s.to_string()));
        }
        Ok(Self::new(local, plugin))
    }
}

impl TryFrom<String> for FormKey {
    type Error = FormKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(key: FormKey) -> Self {
        key.to_string()
    }
}
