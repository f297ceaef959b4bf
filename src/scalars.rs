//! scalar mapping tables
//!
//! two lookup tables decide how a scalar name is rendered: the schema table
//! points into the generated `Scalars` type, the operation-result table
//! resolves straight to a native typescript type. names missing from a table
//! are not errors, callers render them as plain type references.

use crate::naming::pascal_case;
use crate::schema::SchemaModel;
use std::collections::BTreeMap;

/// built-in scalars as `(canonical name, Scalars entry type, result type)`.
///
/// the order here is the order of the generated `Scalars` type.
pub const BUILTIN_SCALARS: &[(&str, &str, &str)] = &[
    ("ID", "string", "string"),
    ("String", "string", "string"),
    ("Boolean", "boolean", "boolean"),
    ("Int", "number", "number"),
    ("Float", "number", "number"),
    ("Bigint", "any", "number"),
    ("Date", "any", "string"),
    ("Float8", "any", "number"),
    ("Timestamp", "any", "string"),
    ("Timestamptz", "any", "string"),
    ("Json", "any", "any"),
    ("Jsonb", "any", "any"),
    ("Numeric", "any", "number"),
    ("Point", "any", "any"),
    ("Polygon", "any", "any"),
    ("Uuid", "any", "any"),
];

/// native type used for schema-declared scalars the built-ins don't cover
pub const CUSTOM_SCALAR_TYPE: &str = "any";

/// how a scalar name renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarRule {
    /// `Scalars['<key>']`
    Lookup(String),
    /// a native typescript type such as `string`
    Native(String),
}

/// scalar lookup table keyed by canonical (pascal-cased) name
#[derive(Debug, Clone, Default)]
pub struct ScalarTable {
    rules: BTreeMap<String, ScalarRule>,
}

impl ScalarTable {
    /// table for schema fields, input fields, and operation variables
    pub fn schema() -> Self {
        let rules = BUILTIN_SCALARS
            .iter()
            .map(|(name, _, _)| (name.to_string(), ScalarRule::Lookup(name.to_string())))
            .collect();
        Self { rules }
    }

    /// table for operation result fields
    pub fn operation_result() -> Self {
        let rules = BUILTIN_SCALARS
            .iter()
            .map(|(name, _, native)| (name.to_string(), ScalarRule::Native(native.to_string())))
            .collect();
        Self { rules }
    }

    /// schema table extended with the custom scalars `model` declares
    pub fn schema_for(model: &SchemaModel) -> Self {
        let mut table = Self::schema();
        for name in custom_scalars(model) {
            table.insert(&name, ScalarRule::Lookup(name.clone()));
        }
        table
    }

    /// operation-result table extended with the custom scalars `model` declares
    pub fn operation_result_for(model: &SchemaModel) -> Self {
        let mut table = Self::operation_result();
        for name in custom_scalars(model) {
            table.insert(&name, ScalarRule::Native(CUSTOM_SCALAR_TYPE.to_string()));
        }
        table
    }

    /// add or replace a rule
    pub fn with_rule(mut self, name: &str, rule: ScalarRule) -> Self {
        self.insert(name, rule);
        self
    }

    /// add or replace a rule
    pub fn insert(&mut self, name: &str, rule: ScalarRule) {
        self.rules.insert(pascal_case(name), rule);
    }

    /// rule for a graphql scalar name, if the table knows it
    pub fn resolve(&self, name: &str) -> Option<&ScalarRule> {
        self.rules.get(&pascal_case(name))
    }
}

/// canonical names of scalars declared by `model` that no built-in covers,
/// in name order
pub fn custom_scalars(model: &SchemaModel) -> Vec<String> {
    let mut names: Vec<String> = model
        .scalars()
        .map(|scalar| pascal_case(&scalar.name))
        .filter(|name| !BUILTIN_SCALARS.iter().any(|(builtin, _, _)| builtin == name))
        .collect();
    names.sort();
    names.dedup();
    names
}
