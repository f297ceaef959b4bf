//! output assembly
//!
//! loads the schema once, renders every configured target with its plugins,
//! and writes each output file only when its content changed.

use crate::config::{CodegenConfig, Plugin, TargetConfig};
use crate::discovery;
use crate::document::OperationSet;
use crate::error::{Error, Result};
use crate::schema::SchemaModel;
use crate::source::SchemaSource;
use crate::typescript::{OperationProjector, RenderOptions, SchemaProjector};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// what happened to one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// new or changed content was written
    Written,
    /// the file already had this content
    Unchanged,
    /// the file differs but overwriting is disabled
    Kept,
}

/// result of generating one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// runs a configuration against a working root
pub struct Codegen {
    config: CodegenConfig,
    root: PathBuf,
    options: RenderOptions,
}

impl Codegen {
    pub fn new(config: CodegenConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            options: RenderOptions::default(),
        }
    }

    /// render with non-default formatting
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// load the schema and generate every target
    pub fn run(&self) -> Result<Vec<TargetReport>> {
        self.config.validate()?;
        let source = SchemaSource::resolve(&self.config.schema, &self.root)?;
        let sdl = source.load(&self.config.schema_headers)?;
        let schema = SchemaModel::parse(&sdl)?;
        self.run_with_schema(&schema)
    }

    /// generate every target against an already parsed schema
    pub fn run_with_schema(&self, schema: &SchemaModel) -> Result<Vec<TargetReport>> {
        self.config
            .generates
            .par_iter()
            .map(|(output, target)| {
                let text = self.render_target(schema, target)?;
                let path = self.root.join(output);
                let outcome = write_if_changed(&path, &text, self.config.overwrite)?;
                Ok(TargetReport { path, outcome })
            })
            .collect()
    }

    /// concatenate the outputs of a target's plugins
    pub fn render_target(&self, schema: &SchemaModel, target: &TargetConfig) -> Result<String> {
        let mut out = String::new();
        for plugin in &target.plugins {
            match plugin {
                Plugin::Typescript => {
                    out.push_str(&SchemaProjector::new(schema, &self.options).render());
                }
                Plugin::TypescriptOperations => {
                    let set = self.operations(schema, target)?;
                    let mut projector = OperationProjector::new(schema, &set, &self.options);
                    if let Some(path) = target.types_path() {
                        projector = projector.with_types_path(path);
                    }
                    out.push_str(&projector.render()?);
                }
            }
        }
        Ok(out)
    }

    fn operations(&self, schema: &SchemaModel, target: &TargetConfig) -> Result<OperationSet> {
        let documents = discovery::collect(&self.root, &target.documents)?;
        if documents.is_empty() {
            tracing::warn!(
                patterns = %target.documents.join(", "),
                files = documents.files.len(),
                "no operations found"
            );
            return Ok(OperationSet::default());
        }
        OperationSet::parse(schema, &documents.text, &target.documents.join(", "))
    }
}

/// write `text` to `path` unless the file already holds it.
///
/// with `overwrite` off an existing file with different content is left as is.
pub fn write_if_changed(path: &Path, text: &str, overwrite: bool) -> Result<WriteOutcome> {
    match std::fs::read_to_string(path) {
        Ok(existing) if existing == text => {
            tracing::info!("[skipping] {}", path.display());
            return Ok(WriteOutcome::Unchanged);
        }
        Ok(_) if !overwrite => {
            tracing::warn!(
                "[skipping] {} exists and overwrite is disabled",
                path.display()
            );
            return Ok(WriteOutcome::Kept);
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::io(path, err)),
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    std::fs::write(path, text).map_err(|err| Error::io(path, err))?;
    tracing::info!("[writing] {}", path.display());
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SCHEMA: &str = indoc! {"
        type User { id: ID! name: String }
        type Query { users: [User!]! }
    "};

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen/out.ts");

        assert_eq!(write_if_changed(&path, "a", true).unwrap(), WriteOutcome::Written);
        assert_eq!(write_if_changed(&path, "a", true).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(write_if_changed(&path, "b", false).unwrap(), WriteOutcome::Kept);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");
        assert_eq!(write_if_changed(&path, "b", true).unwrap(), WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_plugins_are_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ops.graphql"),
            "query AllUsers { users { id } }",
        )
        .unwrap();

        let target = TargetConfig::new(vec![Plugin::Typescript, Plugin::TypescriptOperations])
            .with_documents(vec!["*.graphql".to_string()]);
        let config = CodegenConfig::new("schema.graphql").with_target("out.ts", target.clone());
        let codegen = Codegen::new(config, dir.path());
        let schema = SchemaModel::parse(SCHEMA).unwrap();

        let out = codegen.render_target(&schema, &target).unwrap();
        let types = out.find("export type User = {").unwrap();
        let operation = out.find("export type AllUsersQuery = Exact<{").unwrap();
        assert!(types < operation);
        assert!(!out.contains("import * as Types"));
    }

    #[test]
    fn test_custom_indent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();
        let config = CodegenConfig::new("schema.graphql")
            .with_target("types.ts", TargetConfig::new(vec![Plugin::Typescript]));

        Codegen::new(config, dir.path())
            .with_options(RenderOptions::default().with_indent("\t"))
            .run()
            .unwrap();
        let out = std::fs::read_to_string(dir.path().join("types.ts")).unwrap();
        assert!(out.contains("export type User = {\n\tid: Scalars['ID'];\n"));
        assert!(!out.contains("  id: Scalars['ID'];"));
    }

    #[test]
    fn test_import_types_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("users.ts"),
            "export const Q = gql`query AllUsers { users { name } }`;",
        )
        .unwrap();

        let target = TargetConfig::new(vec![Plugin::TypescriptOperations])
            .with_documents(vec!["*.ts".to_string()])
            .with_import_types("./types");
        let config = CodegenConfig::new("schema.graphql").with_target("ops.ts", target.clone());
        let schema = SchemaModel::parse(SCHEMA).unwrap();

        let out = Codegen::new(config, dir.path())
            .render_target(&schema, &target)
            .unwrap();
        assert!(out.starts_with("import * as Types from \"./types\";\n\n"));
        assert!(out.contains("export type AllUsersQuery = Types.Exact<{\n"));
        assert!(out.contains("    name?: string | null;\n"));
    }

    #[test]
    fn test_no_documents_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = TargetConfig::new(vec![Plugin::TypescriptOperations])
            .with_documents(vec!["src/**/*.ts".to_string()]);
        let config = CodegenConfig::new("schema.graphql").with_target("ops.ts", target.clone());
        let schema = SchemaModel::parse(SCHEMA).unwrap();

        let out = Codegen::new(config, dir.path())
            .render_target(&schema, &target)
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_run_reports_every_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schema.graphql"), SCHEMA).unwrap();
        let config = CodegenConfig::new("schema.graphql")
            .with_target("a/types.ts", TargetConfig::new(vec![Plugin::Typescript]))
            .with_target("b/types.ts", TargetConfig::new(vec![Plugin::Typescript]));

        let codegen = Codegen::new(config, dir.path());
        let reports = codegen.run().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|report| report.outcome == WriteOutcome::Written));
        assert_eq!(reports[0].path, dir.path().join("a/types.ts"));

        let reports = codegen.run().unwrap();
        assert!(reports
            .iter()
            .all(|report| report.outcome == WriteOutcome::Unchanged));
    }
}
