//! type-shape rendering
//!
//! turns a [`TypeRef`] into a typescript type expression. the wrapping rules
//! depend on where the type appears:
//!
//! | context | `T!` | `T` | `[T!]!` | `[T]`, `[T!]`, `[T]!` |
//! | --- | --- | --- | --- | --- |
//! | schema field, variable | `T` | `Maybe<T>` | `Array<T>` | `Maybe<Array<T>>` |
//! | input field | `T` | `InputMaybe<T>` | `Array<T>` | `InputMaybe<Array<T>>` |
//! | operation result | `t` | `t \| null` | `t[]` | `t[] \| null` |

use super::TYPES_NAMESPACE;
use crate::naming::pascal_case;
use crate::scalars::{ScalarRule, ScalarTable};
use crate::schema::{SchemaModel, TypeRef};

/// where a type reference is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeContext {
    SchemaField,
    InputField,
    Variable,
    OperationResult,
}

/// renders type references with a pair of scalar tables
#[derive(Debug, Clone)]
pub struct TypeRenderer {
    schema_scalars: ScalarTable,
    result_scalars: ScalarTable,
    namespace: Option<String>,
}

impl TypeRenderer {
    pub fn new(schema_scalars: ScalarTable, result_scalars: ScalarTable) -> Self {
        Self {
            schema_scalars,
            result_scalars,
            namespace: None,
        }
    }

    /// renderer using the built-in tables plus the custom scalars of `model`
    pub fn for_schema(model: &SchemaModel) -> Self {
        Self::new(
            ScalarTable::schema_for(model),
            ScalarTable::operation_result_for(model),
        )
    }

    /// qualify generated names with the shared types namespace
    pub fn with_types_namespace(mut self) -> Self {
        self.namespace = Some(TYPES_NAMESPACE.to_string());
        self
    }

    /// `Types.<name>` in import mode, `name` otherwise
    pub fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{name}"),
            None => name.to_string(),
        }
    }

    /// render the named type at the bottom of a reference, unwrapped
    pub fn base_type(&self, name: &str, context: ShapeContext) -> String {
        let table = match context {
            ShapeContext::OperationResult => &self.result_scalars,
            _ => &self.schema_scalars,
        };
        match table.resolve(name) {
            Some(ScalarRule::Native(native)) => native.clone(),
            Some(ScalarRule::Lookup(key)) => self.qualify(&format!("Scalars['{key}']")),
            None => self.qualify(&pascal_case(name)),
        }
    }

    /// render a full type reference
    pub fn render(&self, ty: &TypeRef, context: ShapeContext) -> String {
        let base = self.base_type(&ty.name, context);
        match context {
            ShapeContext::OperationResult => {
                let body = if ty.is_list { format!("{base}[]") } else { base };
                if ty.admits_null() {
                    format!("{body} | null")
                } else {
                    body
                }
            }
            ShapeContext::SchemaField | ShapeContext::Variable | ShapeContext::InputField => {
                let body = if ty.is_list {
                    format!("Array<{base}>")
                } else {
                    base
                };
                if !ty.admits_null() {
                    return body;
                }
                let wrapper = if context == ShapeContext::InputField {
                    "InputMaybe"
                } else {
                    "Maybe"
                };
                format!("{}<{body}>", self.qualify(wrapper))
            }
        }
    }
}
