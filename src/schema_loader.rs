//! JSON Schema compilation for registry payloads and the context registry.
//!
//! Bundled schemas are compiled from embedded text; callers may also load an
//! override from disk. Validation failures are reported as one line per
//! violation, prefixed with the JSON pointer of the offending value.

use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

/// Schema for bioregistry-style extended prefix map exports.
pub const EXTENDED_PREFIX_MAP_SCHEMA: &str =
    include_str!("../schema/extended_prefix_map.schema.json");

/// Schema for `contexts.yaml`.
pub const CONTEXT_REGISTRY_SCHEMA: &str = include_str!("../schema/context_registry.schema.json");

pub struct CompiledSchema {
    name: String,
    compiled: JSONSchema,
}

impl CompiledSchema {
    pub fn from_json_str(name: &str, text: &str) -> Result<Self> {
        let raw: Value =
            serde_json::from_str(text).with_context(|| format!("parsing schema {name}"))?;
        Self::compile(name, &raw)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw: Value = serde_json::from_reader(
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?,
        )
        .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::compile(&path.display().to_string(), &raw)
    }

    fn compile(name: &str, raw: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(raw)
            .map_err(|err| anyhow!("compiling schema {name}: {err}"))?;
        Ok(Self {
            name: name.to_string(),
            compiled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Violations of the schema, empty when `instance` conforms.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    if pointer.is_empty() {
                        err.to_string()
                    } else {
                        format!("{pointer}: {err}")
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundled_schemas_compile() {
        CompiledSchema::from_json_str("epm", EXTENDED_PREFIX_MAP_SCHEMA).unwrap();
        CompiledSchema::from_json_str("registry", CONTEXT_REGISTRY_SCHEMA).unwrap();
    }

    #[test]
    fn extended_prefix_map_violations_name_the_record() {
        let schema = CompiledSchema::from_json_str("epm", EXTENDED_PREFIX_MAP_SCHEMA).unwrap();
        let ok = json!([{"prefix": "go", "uri_prefix": "http://purl.obolibrary.org/obo/GO_"}]);
        assert!(schema.violations(&ok).is_empty());

        let drifted = json!([
            {"prefix": "go", "uri_prefix": "http://purl.obolibrary.org/obo/GO_"},
            {"prefix": "chebi", "uriPrefix": "http://purl.obolibrary.org/obo/CHEBI_"}
        ]);
        let violations = schema.violations(&drifted);
        assert!(!violations.is_empty());
        assert!(violations.iter().any(|v| v.starts_with("/1")), "{violations:?}");
    }
}
