//! generator configuration
//!
//! a [`CodegenConfig`] names the schema source and a set of output targets.
//! load one from json with [`CodegenConfig::load`] or build it in code.
//!
//! # example
//!
//! ```
//! use recodegen::{CodegenConfig, Plugin, TargetConfig};
//!
//! let config = CodegenConfig::new("schema.graphql")
//!     .with_target("src/types.ts", TargetConfig::new(vec![Plugin::Typescript]))
//!     .with_target(
//!         "src/operations.ts",
//!         TargetConfig::new(vec![Plugin::TypescriptOperations])
//!             .with_documents(vec!["src/**/*.ts".to_string()])
//!             .with_import_types("./types"),
//!     );
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "recodegen.json";

/// `presetConfig` key holding the shared types module path
pub const TYPES_PATH_KEY: &str = "typesPath";

/// top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenConfig {
    /// replace existing output files whose content differs
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// schema file path or http(s) url
    pub schema: String,

    /// headers sent when the schema is fetched over http
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schema_headers: BTreeMap<String, String>,

    /// output path to target
    #[serde(default)]
    pub generates: BTreeMap<String, TargetConfig>,
}

/// one generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub preset_config: BTreeMap<String, String>,

    /// plugins whose outputs are concatenated, in order
    #[serde(default)]
    pub plugins: Vec<Plugin>,

    /// document glob patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
}

/// output generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plugin {
    /// schema types
    #[serde(rename = "typescript")]
    Typescript,
    /// operation variables and result types
    #[serde(rename = "typescript-operations")]
    TypescriptOperations,
}

impl Plugin {
    pub fn as_str(self) -> &'static str {
        match self {
            Plugin::Typescript => "typescript",
            Plugin::TypescriptOperations => "typescript-operations",
        }
    }
}

/// target preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// import shared schema types from `presetConfig.typesPath`
    #[serde(rename = "import-types")]
    ImportTypes,
}

fn default_overwrite() -> bool {
    true
}

impl CodegenConfig {
    /// create a configuration with no targets
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            overwrite: true,
            schema: schema.into(),
            schema_headers: BTreeMap::new(),
            generates: BTreeMap::new(),
        }
    }

    /// read and validate a json config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            targets = config.generates.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// parse and validate json config text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// add or replace an output target
    pub fn with_target(mut self, output: impl Into<String>, target: TargetConfig) -> Self {
        self.generates.insert(output.into(), target);
        self
    }

    /// add a header sent with the schema fetch
    pub fn with_schema_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.schema_headers.insert(name.into(), value.into());
        self
    }

    /// keep existing output files that differ from the generated text
    ///
    /// default: overwrite
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema.trim().is_empty() {
            return Err(Error::Config("schema cannot be empty".to_string()));
        }

        if self.generates.is_empty() {
            return Err(Error::Config(
                "generates must declare at least one target".to_string(),
            ));
        }

        for (output, target) in &self.generates {
            target.validate(output)?;
        }

        Ok(())
    }
}

impl TargetConfig {
    /// create a target running `plugins`
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self {
            preset: None,
            preset_config: BTreeMap::new(),
            plugins,
            documents: Vec::new(),
        }
    }

    /// set the document glob patterns
    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = documents;
        self
    }

    /// use the `import-types` preset with the given shared types path
    pub fn with_import_types(mut self, types_path: impl Into<String>) -> Self {
        self.preset = Some(Preset::ImportTypes);
        self.preset_config
            .insert(TYPES_PATH_KEY.to_string(), types_path.into());
        self
    }

    /// shared types path when the `import-types` preset is active
    pub fn types_path(&self) -> Option<&str> {
        match self.preset {
            Some(Preset::ImportTypes) => self.preset_config.get(TYPES_PATH_KEY).map(String::as_str),
            None => None,
        }
    }

    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    fn validate(&self, output: &str) -> Result<()> {
        if output.trim().is_empty() {
            return Err(Error::Config("output path cannot be empty".to_string()));
        }

        if self.plugins.is_empty() {
            return Err(Error::Config(format!(
                "{output}: at least one plugin is required"
            )));
        }

        if self.has_plugin(Plugin::TypescriptOperations) && self.documents.is_empty() {
            return Err(Error::Config(format!(
                "{output}: {} requires at least one document pattern",
                Plugin::TypescriptOperations.as_str()
            )));
        }

        let has_types_path = matches!(self.types_path(), Some(path) if !path.trim().is_empty());
        if self.preset == Some(Preset::ImportTypes) && !has_types_path {
            return Err(Error::Config(format!(
                "{output}: import-types preset requires presetConfig.{TYPES_PATH_KEY}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_load_json() {
        let config = CodegenConfig::from_json(indoc! {r#"
            {
              "overwrite": false,
              "schema": "http://localhost:8080/v1/graphql",
              "schemaHeaders": { "x-hasura-admin-secret": "secret" },
              "generates": {
                "src/generated/types.ts": { "plugins": ["typescript"] },
                "src/generated/operations.ts": {
                  "preset": "import-types",
                  "presetConfig": { "typesPath": "./types" },
                  "plugins": ["typescript-operations"],
                  "documents": ["src/**/*.tsx"]
                }
              }
            }
        "#})
        .unwrap();

        assert!(!config.overwrite);
        assert_eq!(
            config.schema_headers.get("x-hasura-admin-secret").unwrap(),
            "secret"
        );

        let outputs: Vec<&str> = config.generates.keys().map(String::as_str).collect();
        assert_eq!(
            outputs,
            vec!["src/generated/operations.ts", "src/generated/types.ts"]
        );

        let operations = &config.generates["src/generated/operations.ts"];
        assert_eq!(operations.types_path(), Some("./types"));
        assert_eq!(operations.plugins, vec![Plugin::TypescriptOperations]);

        let types = &config.generates["src/generated/types.ts"];
        assert_eq!(types.types_path(), None);
        assert!(types.documents.is_empty());
    }

    #[test]
    fn test_overwrite_defaults_to_true() {
        let config = CodegenConfig::from_json(
            r#"{ "schema": "schema.graphql", "generates": { "a.ts": { "plugins": ["typescript"] } } }"#,
        )
        .unwrap();
        assert!(config.overwrite);
    }

    #[test]
    fn test_unknown_plugin_is_rejected() {
        let err = CodegenConfig::from_json(
            r#"{ "schema": "s.graphql", "generates": { "a.ts": { "plugins": ["flow"] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_validation() {
        let config = CodegenConfig::new("schema.graphql");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = config.with_target("a.ts", TargetConfig::new(vec![Plugin::Typescript]));
        assert!(config.validate().is_ok());

        let empty_schema = CodegenConfig::new(" ")
            .with_target("a.ts", TargetConfig::new(vec![Plugin::Typescript]));
        assert!(matches!(empty_schema.validate(), Err(Error::Config(_))));

        let no_plugins = CodegenConfig::new("schema.graphql").with_target("a.ts", TargetConfig::new(vec![]));
        assert!(matches!(no_plugins.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_operations_need_documents() {
        let config = CodegenConfig::new("schema.graphql").with_target(
            "ops.ts",
            TargetConfig::new(vec![Plugin::TypescriptOperations]),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("typescript-operations"));
    }

    #[test]
    fn test_import_types_needs_path() {
        let mut target = TargetConfig::new(vec![Plugin::Typescript]).with_import_types("./types");
        target.preset_config.clear();
        let config = CodegenConfig::new("schema.graphql").with_target("a.ts", target);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("typesPath"));
    }

    #[test]
    fn test_builder_helpers() {
        let config = CodegenConfig::new("https://example.com/graphql")
            .with_schema_header("authorization", "Bearer token")
            .with_overwrite(false)
            .with_target(
                "ops.ts",
                TargetConfig::new(vec![Plugin::TypescriptOperations])
                    .with_documents(vec!["src/**/*.ts".to_string()])
                    .with_import_types("./types"),
            );

        assert!(!config.overwrite);
        assert_eq!(config.schema_headers.len(), 1);
        let target = &config.generates["ops.ts"];
        assert_eq!(target.preset, Some(Preset::ImportTypes));
        assert_eq!(target.types_path(), Some("./types"));
        assert!(target.has_plugin(Plugin::TypescriptOperations));
        assert!(!target.has_plugin(Plugin::Typescript));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = CodegenConfig::new("schema.graphql").with_target(
            "ops.ts",
            TargetConfig::new(vec![Plugin::TypescriptOperations])
                .with_documents(vec!["*.ts".to_string()])
                .with_import_types("./types"),
        );
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"presetConfig\":{\"typesPath\":\"./types\"}"));
        assert!(json.contains("\"preset\":\"import-types\""));
        assert!(json.contains("\"plugins\":[\"typescript-operations\"]"));
        assert_eq!(CodegenConfig::from_json(&json).unwrap(), config);
    }
}
