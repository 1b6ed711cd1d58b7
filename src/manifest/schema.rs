//! Declarative document shapes for the three manifest kinds.
//!
//! Each shape is a JSON Schema (draft 2020-12) compiled once on first use.
//! Every object is closed (`additionalProperties: false`) and `ref` is always
//! a string, so a bare `ref: 1.0` in YAML is rejected rather than coerced.

use std::sync::OnceLock;

use jsonschema::{Draft, Validator};
use serde_json::{json, Value};

use super::{ManifestError, ManifestKind, SchemaViolation};

pub(crate) const SCHEMA_VERSION: &str = "1.0";

fn document(kind: ManifestKind) -> Value {
    match kind {
        ManifestKind::Input => input_schema(),
        ManifestKind::Build => build_schema(),
        ManifestKind::Bundle => bundle_schema(),
    }
}

fn cell(kind: ManifestKind) -> &'static OnceLock<Result<Validator, String>> {
    static INPUT: OnceLock<Result<Validator, String>> = OnceLock::new();
    static BUILD: OnceLock<Result<Validator, String>> = OnceLock::new();
    static BUNDLE: OnceLock<Result<Validator, String>> = OnceLock::new();
    match kind {
        ManifestKind::Input => &INPUT,
        ManifestKind::Build => &BUILD,
        ManifestKind::Bundle => &BUNDLE,
    }
}

fn compiled(kind: ManifestKind) -> Result<&'static Validator, ManifestError> {
    cell(kind)
        .get_or_init(|| {
            jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&document(kind))
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|message| ManifestError::SchemaDefinition {
            kind: kind.label(),
            message: message.clone(),
        })
}

/// Validate `document` and collect every violation with its instance path.
pub(crate) fn validate(kind: ManifestKind, document: &Value) -> Result<(), ManifestError> {
    let validator = compiled(kind)?;
    if validator.is_valid(document) {
        return Ok(());
    }

    let violations = validator
        .iter_errors(document)
        .map(|error| SchemaViolation {
            path: error.instance_path().to_string(),
            message: error.to_string(),
        })
        .collect::<Vec<_>>();
    Err(ManifestError::Schema(violations))
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn schema_version() -> Value {
    json!({ "type": "string", "enum": [SCHEMA_VERSION] })
}

fn input_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "additionalProperties": false,
        "required": ["schema-version", "build", "components"],
        "properties": {
            "schema-version": schema_version(),
            "build": {
                "type": "object",
                "additionalProperties": false,
                "required": ["name", "version"],
                "properties": {
                    "name": string(),
                    "version": string()
                }
            },
            "components": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "repository", "ref"],
                    "properties": {
                        "name": string(),
                        "repository": string(),
                        "ref": string(),
                        "checks": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["name"],
                                "properties": {
                                    "name": string(),
                                    "args": string()
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn build_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "additionalProperties": false,
        "required": ["schema-version", "build"],
        "properties": {
            "schema-version": schema_version(),
            "build": {
                "type": "object",
                "additionalProperties": false,
                "required": ["name", "version", "architecture", "id"],
                "properties": {
                    "name": string(),
                    "version": string(),
                    "architecture": string(),
                    "id": string()
                }
            },
            "components": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "repository", "ref", "commit_id", "artifacts", "version"],
                    "properties": {
                        "name": string(),
                        "repository": string(),
                        "ref": string(),
                        "commit_id": string(),
                        "artifacts": {
                            "type": "object",
                            "additionalProperties": {
                                "type": "array",
                                "items": string()
                            }
                        },
                        "version": string()
                    }
                }
            }
        }
    })
}

fn bundle_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "additionalProperties": false,
        "required": ["schema-version", "build"],
        "properties": {
            "schema-version": schema_version(),
            "build": {
                "type": "object",
                "additionalProperties": false,
                "required": ["name", "version", "architecture", "id", "location"],
                "properties": {
                    "name": string(),
                    "version": string(),
                    "architecture": string(),
                    "id": string(),
                    "location": string()
                }
            },
            "components": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "repository", "ref", "commit_id", "location"],
                    "properties": {
                        "name": string(),
                        "repository": string(),
                        "ref": string(),
                        "commit_id": string(),
                        "location": string()
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_schemas_compile() {
        for kind in [ManifestKind::Input, ManifestKind::Build, ManifestKind::Bundle] {
            assert!(compiled(kind).is_ok(), "{} schema", kind.label());
        }
    }

    #[test]
    fn reports_nested_path_of_numeric_ref() {
        let document = json!({
            "schema-version": "1.0",
            "build": { "name": "OpenSearch", "version": "1.0.0" },
            "components": [
                { "name": "OpenSearch", "repository": "https://example.com/x.git", "ref": 1.0 }
            ]
        });
        let Err(ManifestError::Schema(violations)) = validate(ManifestKind::Input, &document)
        else {
            panic!("expected schema violations");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/components/0/ref");
        assert!(violations[0].message.contains("string"));
    }

    #[test]
    fn rejects_unknown_keys_and_collects_every_violation() {
        let document = json!({
            "schema-version": "1.0",
            "build": { "name": "OpenSearch", "version": "1.1.0", "arch": "x64" },
            "components": [
                { "name": "common-utils", "repository": 7, "ref": "main" }
            ]
        });
        let Err(ManifestError::Schema(violations)) = validate(ManifestKind::Input, &document)
        else {
            panic!("expected schema violations");
        };
        let paths = violations
            .iter()
            .map(|v| v.path.as_str())
            .collect::<Vec<_>>();
        assert!(paths.contains(&"/build"));
        assert!(paths.contains(&"/components/0/repository"));
    }

    #[test]
    fn schema_version_is_pinned() {
        let document = json!({
            "schema-version": "2.0",
            "build": { "name": "OpenSearch", "version": "1.1.0", "architecture": "x64", "id": "1" }
        });
        assert!(validate(ManifestKind::Build, &document).is_err());
    }
}
