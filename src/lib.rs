//! typescript types from a graphql schema and its operations
//!
//! this crate reads a graphql schema (sdl file or http endpoint) plus the
//! operation documents of a project and generates typescript declarations:
//! one type per schema enum, input, object, interface, and union, and
//! variables/result types per named operation. start with
//! [`CodegenConfig`] and [`Codegen`], or drive the projectors directly.
//!
//! ## quick start
//!
//! ```
//! use recodegen::{RenderOptions, SchemaModel, SchemaProjector};
//!
//! # fn example() -> recodegen::Result<()> {
//! let schema = SchemaModel::parse("type Query { hello: String }")?;
//! let options = RenderOptions::default();
//! let out = SchemaProjector::new(&schema, &options).render();
//! assert!(out.contains("export type Query = {\n  hello?: Maybe<Scalars['String']>;\n};"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## configured runs
//!
//! the `recodegen` binary loads `recodegen.json` and runs [`Codegen`] over
//! every target it declares.

mod codegen;
mod config;
mod discovery;
mod document;
mod error;
mod naming;
mod scalars;
mod schema;
mod source;
mod typescript;

pub use codegen::{write_if_changed, Codegen, TargetReport, WriteOutcome};
pub use config::{CodegenConfig, Plugin, Preset, TargetConfig, DEFAULT_CONFIG_FILE};
pub use discovery::{collect as collect_documents, Documents};
pub use document::{
    FieldSelection, FragmentDescriptor, FragmentSpreadSelection, OperationDescriptor,
    OperationKind, OperationSet, SelectionNode, VariableDescriptor,
};
pub use error::{Error, Result};
pub use naming::{operation_name, pascal_case, pascal_case_joined, upper_first};
pub use scalars::{ScalarRule, ScalarTable};
pub use schema::{
    ArgumentDescriptor, EnumDescriptor, EnumValueDescriptor, FieldDescriptor,
    InputObjectDescriptor, ObjectDescriptor, ScalarDescriptor, SchemaModel, TypeDescriptor,
    TypeRef, UnionDescriptor,
};
pub use source::SchemaSource;
pub use typescript::{
    OperationProjector, RenderOptions, SchemaProjector, ShapeContext, TypeRenderer,
};
