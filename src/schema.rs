//! schema model
//!
//! owned, read-only view of a parsed graphql schema. the graphql-parser ast
//! is translated into these descriptors once and then dropped; the
//! projectors only ever see this model.

use crate::document::OperationKind;
use crate::error::{Error, Result};
use graphql_parser::schema::{
    parse_schema, Definition, Document, Field, InputValue, Type, TypeDefinition, TypeExtension,
};
use std::collections::BTreeMap;

/// fields that only exist for introspection and are never projected
pub const INTROSPECTION_FIELDS: &[&str] = &["__schema", "__type"];

/// a graphql type reference with at most one level of list wrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// named type at the bottom of the reference
    pub name: String,
    /// true unless the outermost type is `!`
    pub nullable: bool,
    /// true for `[T]` references
    pub is_list: bool,
    /// true when the list element may be null (`[T]` rather than `[T!]`)
    pub list_element_nullable: bool,
}

impl TypeRef {
    /// non-null named reference (`T!`)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            is_list: false,
            list_element_nullable: false,
        }
    }

    /// non-null list of non-null elements (`[T!]!`)
    pub fn list(name: impl Into<String>) -> Self {
        Self {
            is_list: true,
            ..Self::named(name)
        }
    }

    /// set the outer nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// set the element nullability of a list reference
    pub fn with_element_nullable(mut self, nullable: bool) -> Self {
        self.list_element_nullable = nullable;
        self
    }

    /// true if null is allowed at either the list or the element level
    pub fn admits_null(&self) -> bool {
        self.nullable || (self.is_list && self.list_element_nullable)
    }

    /// translate a parser type annotation.
    ///
    /// nested lists collapse onto one list level, keeping the nullability of
    /// the innermost element.
    pub fn from_ast(ty: &Type<'_, String>) -> Self {
        match ty {
            Type::NamedType(name) => Self::named(name.clone()).with_nullable(true),
            Type::NonNullType(inner) => Self::from_ast(inner).with_nullable(false),
            Type::ListType(element) => {
                let element = Self::from_ast(element);
                let element_nullable = if element.is_list {
                    element.list_element_nullable
                } else {
                    element.nullable
                };
                Self {
                    name: element.name,
                    nullable: true,
                    is_list: true,
                    list_element_nullable: element_nullable,
                }
            }
        }
    }
}

/// field argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
}

/// object, interface, or input-object field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    /// declared arguments, always empty for input fields
    pub arguments: Vec<ArgumentDescriptor>,
}

/// one enum member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub raw_value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDescriptor>,
}

/// object or interface type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputObjectDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarDescriptor {
    pub name: String,
    pub description: Option<String>,
}

/// any named schema type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Scalar(ScalarDescriptor),
    Object(ObjectDescriptor),
    Interface(ObjectDescriptor),
    Union(UnionDescriptor),
    Enum(EnumDescriptor),
    InputObject(InputObjectDescriptor),
}

impl TypeDescriptor {
    /// declared type name
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Scalar(ty) => &ty.name,
            TypeDescriptor::Object(ty) | TypeDescriptor::Interface(ty) => &ty.name,
            TypeDescriptor::Union(ty) => &ty.name,
            TypeDescriptor::Enum(ty) => &ty.name,
            TypeDescriptor::InputObject(ty) => &ty.name,
        }
    }

    fn from_ast(def: &TypeDefinition<'_, String>) -> Self {
        match def {
            TypeDefinition::Scalar(scalar) => TypeDescriptor::Scalar(ScalarDescriptor {
                name: scalar.name.clone(),
                description: scalar.description.clone(),
            }),
            TypeDefinition::Object(obj) => TypeDescriptor::Object(ObjectDescriptor {
                name: obj.name.clone(),
                description: obj.description.clone(),
                fields: obj.fields.iter().map(field_from_ast).collect(),
            }),
            TypeDefinition::Interface(iface) => TypeDescriptor::Interface(ObjectDescriptor {
                name: iface.name.clone(),
                description: iface.description.clone(),
                fields: iface.fields.iter().map(field_from_ast).collect(),
            }),
            TypeDefinition::Union(union_ty) => TypeDescriptor::Union(UnionDescriptor {
                name: union_ty.name.clone(),
                description: union_ty.description.clone(),
                members: union_ty.types.clone(),
            }),
            TypeDefinition::Enum(enum_ty) => TypeDescriptor::Enum(EnumDescriptor {
                name: enum_ty.name.clone(),
                description: enum_ty.description.clone(),
                values: enum_ty
                    .values
                    .iter()
                    .map(|value| EnumValueDescriptor {
                        raw_value: value.name.clone(),
                        description: value.description.clone(),
                    })
                    .collect(),
            }),
            TypeDefinition::InputObject(input) => TypeDescriptor::InputObject(InputObjectDescriptor {
                name: input.name.clone(),
                description: input.description.clone(),
                fields: input.fields.iter().map(input_field_from_ast).collect(),
            }),
        }
    }
}

/// parsed schema: every named type plus the root operation types
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    types: BTreeMap<String, TypeDescriptor>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl SchemaModel {
    /// parse sdl text
    pub fn parse(source: &str) -> Result<Self> {
        let document = parse_schema::<String>(source)
            .map_err(|err| Error::SchemaParse(err.to_string()))?;
        Self::from_document(&document)
    }

    /// translate a parsed schema document
    pub fn from_document(document: &Document<'_, String>) -> Result<Self> {
        let mut model = Self::default();
        let mut extensions = Vec::new();
        let mut roots = None;

        for def in &document.definitions {
            match def {
                Definition::TypeDefinition(ty) => {
                    let descriptor = TypeDescriptor::from_ast(ty);
                    if descriptor.name().starts_with("__") {
                        continue;
                    }
                    model
                        .types
                        .insert(descriptor.name().to_string(), descriptor);
                }
                Definition::TypeExtension(ext) => extensions.push(ext),
                Definition::SchemaDefinition(schema) => {
                    roots = Some((
                        schema.query.clone(),
                        schema.mutation.clone(),
                        schema.subscription.clone(),
                    ));
                }
                Definition::DirectiveDefinition(_) => {}
            }
        }

        for ext in extensions {
            model.apply_extension(ext)?;
        }

        match roots {
            Some((query, mutation, subscription)) => {
                for name in [&query, &mutation, &subscription].into_iter().flatten() {
                    if !model.types.contains_key(name) {
                        return Err(Error::UnknownType(name.clone()));
                    }
                }
                model.query_type = query;
                model.mutation_type = mutation;
                model.subscription_type = subscription;
            }
            None => {
                let declared = |name: &str| {
                    model
                        .types
                        .contains_key(name)
                        .then(|| name.to_string())
                };
                model.query_type = declared("Query");
                model.mutation_type = declared("Mutation");
                model.subscription_type = declared("Subscription");
            }
        }

        Ok(model)
    }

    /// every named type in name order
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// look up a named type
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// declared scalar types in name order
    pub fn scalars(&self) -> impl Iterator<Item = &ScalarDescriptor> {
        self.types.values().filter_map(|ty| match ty {
            TypeDescriptor::Scalar(scalar) => Some(scalar),
            _ => None,
        })
    }

    /// root type name for an operation kind
    pub fn root_type(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// field declared on an object or interface type
    pub fn field(&self, parent: &str, name: &str) -> Option<&FieldDescriptor> {
        match self.types.get(parent)? {
            TypeDescriptor::Object(obj) | TypeDescriptor::Interface(obj) => {
                obj.fields.iter().find(|field| field.name == name)
            }
            _ => None,
        }
    }

    fn apply_extension(&mut self, ext: &TypeExtension<'_, String>) -> Result<()> {
        let name = match ext {
            TypeExtension::Scalar(ext) => &ext.name,
            TypeExtension::Object(ext) => &ext.name,
            TypeExtension::Interface(ext) => &ext.name,
            TypeExtension::Union(ext) => &ext.name,
            TypeExtension::Enum(ext) => &ext.name,
            TypeExtension::InputObject(ext) => &ext.name,
        };
        let target = self
            .types
            .get_mut(name)
            .ok_or_else(|| Error::UnknownType(name.clone()))?;

        match (target, ext) {
            (TypeDescriptor::Scalar(_), TypeExtension::Scalar(_)) => {}
            (TypeDescriptor::Object(obj), TypeExtension::Object(ext)) => {
                obj.fields.extend(ext.fields.iter().map(field_from_ast));
            }
            (TypeDescriptor::Interface(obj), TypeExtension::Interface(ext)) => {
                obj.fields.extend(ext.fields.iter().map(field_from_ast));
            }
            (TypeDescriptor::Union(union_ty), TypeExtension::Union(ext)) => {
                union_ty.members.extend(ext.types.iter().cloned());
            }
            (TypeDescriptor::Enum(enum_ty), TypeExtension::Enum(ext)) => {
                enum_ty
                    .values
                    .extend(ext.values.iter().map(|value| EnumValueDescriptor {
                        raw_value: value.name.clone(),
                        description: value.description.clone(),
                    }));
            }
            (TypeDescriptor::InputObject(input), TypeExtension::InputObject(ext)) => {
                input
                    .fields
                    .extend(ext.fields.iter().map(input_field_from_ast));
            }
            _ => {
                return Err(Error::SchemaParse(format!(
                    "extension of `{name}` does not match its definition kind"
                )))
            }
        }
        Ok(())
    }
}

fn field_from_ast(field: &Field<'_, String>) -> FieldDescriptor {
    FieldDescriptor {
        name: field.name.clone(),
        ty: TypeRef::from_ast(&field.field_type),
        description: field.description.clone(),
        arguments: field
            .arguments
            .iter()
            .map(|arg| ArgumentDescriptor {
                name: arg.name.clone(),
                ty: TypeRef::from_ast(&arg.value_type),
                description: arg.description.clone(),
            })
            .collect(),
    }
}

fn input_field_from_ast(field: &InputValue<'_, String>) -> FieldDescriptor {
    FieldDescriptor {
        name: field.name.clone(),
        ty: TypeRef::from_ast(&field.value_type),
        description: field.description.clone(),
        arguments: Vec::new(),
    }
}
