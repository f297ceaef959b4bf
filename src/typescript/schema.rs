//! schema projection
//!
//! renders every enum, input object, object, interface, and union of a
//! schema as typescript declarations, grouped by kind and sorted by name
//! so unchanged schemas produce byte-identical output.

use super::shape::{ShapeContext, TypeRenderer};
use super::{doc_comment, optional_marker, preamble, RenderOptions};
use crate::naming::{pascal_case, pascal_case_joined};
use crate::scalars::{custom_scalars, BUILTIN_SCALARS, CUSTOM_SCALAR_TYPE};
use crate::schema::{
    EnumDescriptor, FieldDescriptor, InputObjectDescriptor, ObjectDescriptor, SchemaModel,
    TypeDescriptor, UnionDescriptor, INTROSPECTION_FIELDS,
};

/// renders the `typescript` plugin output for a schema
pub struct SchemaProjector<'a> {
    schema: &'a SchemaModel,
    renderer: TypeRenderer,
    options: &'a RenderOptions,
}

impl<'a> SchemaProjector<'a> {
    pub fn new(schema: &'a SchemaModel, options: &'a RenderOptions) -> Self {
        Self {
            schema,
            renderer: TypeRenderer::for_schema(schema),
            options,
        }
    }

    /// render the preamble followed by every projected type
    pub fn render(&self) -> String {
        let mut enums = String::new();
        let mut inputs = String::new();
        let mut objects = String::new();
        let mut unions = String::new();

        for ty in self.schema.types() {
            match ty {
                TypeDescriptor::Enum(enum_ty) => enums.push_str(&self.render_enum(enum_ty)),
                TypeDescriptor::InputObject(input) => inputs.push_str(&self.render_input(input)),
                TypeDescriptor::Object(obj) | TypeDescriptor::Interface(obj) => {
                    objects.push_str(&self.render_object(obj))
                }
                TypeDescriptor::Union(union_ty) => unions.push_str(&self.render_union(union_ty)),
                TypeDescriptor::Scalar(_) => {}
            }
        }

        tracing::debug!(
            enums = enums.len(),
            inputs = inputs.len(),
            objects = objects.len(),
            unions = unions.len(),
            "rendered schema types"
        );

        let mut out = self.preamble();
        out.push_str(&enums);
        out.push_str(&inputs);
        out.push_str(&objects);
        out.push_str(&unions);
        out
    }

    fn preamble(&self) -> String {
        let mut scalars: Vec<(String, String)> = BUILTIN_SCALARS
            .iter()
            .map(|(name, native, _)| (name.to_string(), native.to_string()))
            .collect();
        scalars.extend(
            custom_scalars(self.schema)
                .into_iter()
                .map(|name| (name, CUSTOM_SCALAR_TYPE.to_string())),
        );
        preamble(&scalars, self.options)
    }

    fn render_enum(&self, enum_ty: &EnumDescriptor) -> String {
        let indent = self.options.indent(1);
        let mut out = doc_comment(enum_ty.description.as_deref(), "");
        out.push_str(&format!("export enum {} {{\n", pascal_case(&enum_ty.name)));
        for value in &enum_ty.values {
            out.push_str(&doc_comment(value.description.as_deref(), &indent));
            out.push_str(&format!(
                "{indent}{} = '{}',\n",
                pascal_case_joined(&value.raw_value),
                value.raw_value
            ));
        }
        out.push_str("}\n\n");
        out
    }

    fn render_input(&self, input: &InputObjectDescriptor) -> String {
        let mut out = doc_comment(input.description.as_deref(), "");
        out.push_str(&format!("export type {} = {{\n", pascal_case(&input.name)));
        for field in &input.fields {
            out.push_str(&self.render_field(field, ShapeContext::InputField));
        }
        out.push_str("};\n\n");
        out
    }

    fn render_object(&self, obj: &ObjectDescriptor) -> String {
        let object_name = pascal_case(&obj.name);
        let mut out = doc_comment(obj.description.as_deref(), "");
        let mut args = String::new();

        out.push_str(&format!("export type {object_name} = {{\n"));
        for field in &obj.fields {
            if INTROSPECTION_FIELDS.contains(&field.name.as_str()) {
                continue;
            }
            if !field.arguments.is_empty() {
                args.push_str(&self.render_args(&object_name, field));
            }
            out.push_str(&self.render_field(field, ShapeContext::SchemaField));
        }
        out.push_str("};\n\n");
        out.push_str(&args);
        out
    }

    fn render_field(&self, field: &FieldDescriptor, context: ShapeContext) -> String {
        let indent = self.options.indent(1);
        let mut out = doc_comment(field.description.as_deref(), &indent);
        out.push_str(&format!(
            "{indent}{}{}: {};\n",
            field.name,
            optional_marker(field.ty.nullable),
            self.renderer.render(&field.ty, context)
        ));
        out
    }

    /// `<Object><Field>Args` helper type for a field that takes arguments
    fn render_args(&self, object_name: &str, field: &FieldDescriptor) -> String {
        let indent = self.options.indent(1);
        let mut out = format!(
            "export type {object_name}{}Args = {{\n",
            pascal_case(&field.name)
        );
        for arg in &field.arguments {
            out.push_str(&doc_comment(arg.description.as_deref(), &indent));
            out.push_str(&format!(
                "{indent}{}{}: {};\n",
                arg.name,
                optional_marker(arg.ty.nullable),
                self.renderer.render(&arg.ty, ShapeContext::InputField)
            ));
        }
        out.push_str("};\n\n");
        out
    }

    fn render_union(&self, union_ty: &UnionDescriptor) -> String {
        let members = if union_ty.members.is_empty() {
            "never".to_string()
        } else {
            union_ty
                .members
                .iter()
                .map(|member| pascal_case(member))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let mut out = doc_comment(union_ty.description.as_deref(), "");
        out.push_str(&format!(
            "export type {} = {members};\n\n",
            pascal_case(&union_ty.name)
        ));
        out
    }
}
