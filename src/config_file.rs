//! Key/value documents that artifacts and checkouts carry around.
//!
//! Plugin zips ship a `plugin-descriptor.properties`, jars a
//! `META-INF/MANIFEST.MF`, dashboards checkouts a `package.json`. All three
//! are loaded into a [`ConfigFile`] and checked with [`ConfigFile::check_value`]
//! or [`ConfigFile::check_value_in`], which report *what* went wrong as a
//! [`KeyCheck`] instead of raising.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Outcome of comparing one key against an expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCheck {
    Ok,
    Absent,
    Mismatched { found: String },
}

impl KeyCheck {
    /// Turn a single-value check into an error carrying the user-visible text.
    pub fn into_result(self, key: &str, expected: &str) -> Result<(), ConfigCheckError> {
        match self {
            KeyCheck::Ok => Ok(()),
            KeyCheck::Absent => Err(ConfigCheckError::Absent {
                key: key.to_string(),
                expected: expected.to_string(),
            }),
            KeyCheck::Mismatched { found } => Err(ConfigCheckError::Mismatched {
                key: key.to_string(),
                expected: expected.to_string(),
                found,
            }),
        }
    }

    /// Same as [`KeyCheck::into_result`] for a set of accepted values.
    pub fn into_result_any(self, key: &str, expected: &[&str]) -> Result<(), ConfigCheckError> {
        let expected = ExpectedSet(expected.iter().map(|v| v.to_string()).collect());
        match self {
            KeyCheck::Ok => Ok(()),
            KeyCheck::Absent => Err(ConfigCheckError::AbsentAny {
                key: key.to_string(),
                expected,
            }),
            KeyCheck::Mismatched { found } => Err(ConfigCheckError::MismatchedAny {
                key: key.to_string(),
                expected,
                found,
            }),
        }
    }
}

/// Accepted values, rendered as `['a', 'b']`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSet(pub Vec<String>);

impl fmt::Display for ExpectedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = self
            .0
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{quoted}]")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigCheckError {
    #[error("Expected to have {key}='{expected}', but none was found.")]
    Absent { key: String, expected: String },

    #[error("Expected to have {key}='{expected}', but was '{found}'.")]
    Mismatched {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Expected to have {key}=any of {expected}, but none was found.")]
    AbsentAny { key: String, expected: ExpectedSet },

    #[error("Expected to have {key}=any of {expected}, but was '{found}'.")]
    MismatchedAny {
        key: String,
        expected: ExpectedSet,
        found: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    data: Map<String, Value>,
}

impl ConfigFile {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Parse a JSON object document.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("parsing JSON config")?;
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => anyhow::bail!("expected a JSON object, found {other}"),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config file '{}'", path.display()))
    }

    /// Parse Java-properties style text (`key=value` or `key: value`).
    ///
    /// Blank lines and `#`/`!` comments are skipped. The first separator wins,
    /// so `a=b=c` yields `a` -> `b=c`.
    pub fn from_properties(text: &str) -> Self {
        let mut data = Map::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split_at = line.find(['=', ':']);
            let (key, value) = match split_at {
                Some(idx) => (&line[..idx], &line[idx + 1..]),
                None => (line, ""),
            };
            data.insert(
                key.trim().to_string(),
                Value::String(value.trim().to_string()),
            );
        }
        Self { data }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String view of a value; numbers and booleans are rendered, `null` is absent.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn check_value(&self, key: &str, expected: &str) -> KeyCheck {
        match self.present(key) {
            None => KeyCheck::Absent,
            Some(found) if found == expected => KeyCheck::Ok,
            Some(found) => KeyCheck::Mismatched { found },
        }
    }

    /// Accept any of `expected`; with `allow_absent` a missing key passes.
    pub fn check_value_in(&self, key: &str, expected: &[&str], allow_absent: bool) -> KeyCheck {
        match self.present(key) {
            None if allow_absent => KeyCheck::Ok,
            None => KeyCheck::Absent,
            Some(found) if expected.contains(&found.as_str()) => KeyCheck::Ok,
            Some(found) => KeyCheck::Mismatched { found },
        }
    }

    // An empty value reads the same as a missing one.
    fn present(&self, key: &str) -> Option<String> {
        self.get_str(key).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_parse_both_separators_and_skip_comments() {
        let config = ConfigFile::from_properties(
            "# comment\n! other\nopensearch.version=1.1.0\nImplementation-Version: 1.1.0.0\n\nurl=http://a=b\n",
        );
        assert_eq!(config.get_str("opensearch.version").as_deref(), Some("1.1.0"));
        assert_eq!(
            config.get_str("Implementation-Version").as_deref(),
            Some("1.1.0.0")
        );
        assert_eq!(config.get_str("url").as_deref(), Some("http://a=b"));
        assert_eq!(config.data().len(), 3);
    }

    #[test]
    fn check_value_distinguishes_absent_and_mismatched() {
        let config = ConfigFile::from_properties("version=1.2.3.4\nempty=");
        assert_eq!(config.check_value("version", "1.2.3.4"), KeyCheck::Ok);
        assert_eq!(config.check_value("missing", "x"), KeyCheck::Absent);
        assert_eq!(config.check_value("empty", "x"), KeyCheck::Absent);
        assert_eq!(
            config.check_value("version", "1.1.0.0"),
            KeyCheck::Mismatched {
                found: "1.2.3.4".to_string()
            }
        );
    }

    #[test]
    fn error_messages_match_ci_format() {
        let absent = KeyCheck::Absent
            .into_result("version", "1.1.0.0-SNAPSHOT")
            .unwrap_err();
        assert_eq!(
            absent.to_string(),
            "Expected to have version='1.1.0.0-SNAPSHOT', but none was found."
        );

        let mismatched = KeyCheck::Mismatched {
            found: "1.2.3.4".into(),
        }
        .into_result("version", "1.1.0.0-SNAPSHOT")
        .unwrap_err();
        assert_eq!(
            mismatched.to_string(),
            "Expected to have version='1.1.0.0-SNAPSHOT', but was '1.2.3.4'."
        );
    }

    #[test]
    fn check_value_in_respects_allow_absent() {
        let config = ConfigFile::from_properties("Implementation-Version=9.9");
        let expected = ["1.1.0.0", "1.1.0"];
        assert_eq!(config.check_value_in("Other", &expected, true), KeyCheck::Ok);
        assert_eq!(
            config.check_value_in("Other", &expected, false),
            KeyCheck::Absent
        );
        let err = config
            .check_value_in("Implementation-Version", &expected, true)
            .into_result_any("Implementation-Version", &expected)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected to have Implementation-Version=any of ['1.1.0.0', '1.1.0'], but was '9.9'."
        );
    }

    #[test]
    fn json_documents_must_be_objects() {
        let config = ConfigFile::from_json(r#"{"version": "1.1.0", "private": true}"#).unwrap();
        assert_eq!(config.get_str("version").as_deref(), Some("1.1.0"));
        assert_eq!(config.get_str("private").as_deref(), Some("true"));
        assert!(ConfigFile::from_json("[1, 2]").is_err());
    }
}
