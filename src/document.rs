//! operation documents
//!
//! translation of parsed executable documents into operation and fragment
//! descriptors. every field selection is resolved against the schema here,
//! so the projector never has to look a field up again.

use crate::error::{Error, Result};
use crate::schema::{SchemaModel, TypeRef};
use graphql_parser::query::{
    parse_query, Definition, FragmentDefinition, OperationDefinition, Selection, SelectionSet,
    TypeCondition, VariableDefinition,
};
use std::collections::BTreeMap;

/// name of the meta field every composite type answers
pub const TYPENAME_FIELD: &str = "__typename";

/// graphql operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// suffix appended to generated operation type names
    pub fn type_suffix(self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// declared operation variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub name: String,
    pub ty: TypeRef,
}

/// named query, mutation, or subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    /// schema type the root selection set is resolved against
    pub root_type: String,
    pub variables: Vec<VariableDescriptor>,
    pub selections: Vec<SelectionNode>,
}

/// one entry of a selection set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionNode {
    Field(FieldSelection),
    FragmentSpread(FragmentSpreadSelection),
}

/// selected field, resolved against its parent type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    /// schema field name
    pub name: String,
    /// alias when present, otherwise the field name
    pub alias: String,
    pub ty: TypeRef,
    /// sub-selections, present iff the document selected into the field
    pub selections: Option<Vec<SelectionNode>>,
}

/// `...Name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpreadSelection {
    pub fragment: String,
}

/// named fragment definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDescriptor {
    pub name: String,
    pub type_condition: String,
    pub selections: Vec<SelectionNode>,
}

/// every operation and fragment of one set of documents
#[derive(Debug, Clone, Default)]
pub struct OperationSet {
    pub operations: Vec<OperationDescriptor>,
    pub fragments: BTreeMap<String, FragmentDescriptor>,
}

impl OperationSet {
    /// parse document text and resolve it against `schema`.
    ///
    /// `origin` names where the text came from and only shows up in errors.
    pub fn parse(schema: &SchemaModel, source: &str, origin: &str) -> Result<Self> {
        let document = parse_query::<String>(source).map_err(|err| Error::DocumentParse {
            documents: origin.to_string(),
            message: err.to_string(),
        })?;

        let resolver = Resolver { schema };
        let mut set = Self::default();

        for def in &document.definitions {
            match def {
                Definition::Fragment(fragment) => {
                    let fragment = resolver.fragment(fragment)?;
                    set.fragments.insert(fragment.name.clone(), fragment);
                }
                Definition::Operation(operation) => {
                    set.operations.push(resolver.operation(operation)?);
                }
            }
        }

        set.check_spreads()?;
        Ok(set)
    }

    /// look up a fragment definition
    pub fn fragment(&self, name: &str) -> Option<&FragmentDescriptor> {
        self.fragments.get(name)
    }

    fn check_spreads(&self) -> Result<()> {
        let bodies = self
            .operations
            .iter()
            .map(|op| &op.selections)
            .chain(self.fragments.values().map(|fragment| &fragment.selections));
        for selections in bodies {
            self.check_selections(selections)?;
        }
        Ok(())
    }

    fn check_selections(&self, selections: &[SelectionNode]) -> Result<()> {
        for selection in selections {
            match selection {
                SelectionNode::Field(field) => {
                    if let Some(nested) = &field.selections {
                        self.check_selections(nested)?;
                    }
                }
                SelectionNode::FragmentSpread(spread) => {
                    if !self.fragments.contains_key(&spread.fragment) {
                        return Err(Error::UnknownFragment(spread.fragment.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

struct Resolver<'s> {
    schema: &'s SchemaModel,
}

impl<'s> Resolver<'s> {
    fn operation(&self, def: &OperationDefinition<'_, String>) -> Result<OperationDescriptor> {
        let (kind, name, variables, selection_set) = match def {
            OperationDefinition::Query(query) => (
                OperationKind::Query,
                &query.name,
                &query.variable_definitions,
                &query.selection_set,
            ),
            OperationDefinition::Mutation(mutation) => (
                OperationKind::Mutation,
                &mutation.name,
                &mutation.variable_definitions,
                &mutation.selection_set,
            ),
            OperationDefinition::Subscription(subscription) => (
                OperationKind::Subscription,
                &subscription.name,
                &subscription.variable_definitions,
                &subscription.selection_set,
            ),
            OperationDefinition::SelectionSet(_) => return Err(Error::AnonymousOperation),
        };
        let name = name.clone().ok_or(Error::AnonymousOperation)?;
        let root_type = self
            .schema
            .root_type(kind)
            .ok_or_else(|| Error::UnknownType(kind.type_suffix().to_string()))?
            .to_string();

        Ok(OperationDescriptor {
            selections: self.selections(&root_type, selection_set, &name)?,
            variables: variables.iter().map(variable).collect(),
            name,
            kind,
            root_type,
        })
    }

    fn fragment(&self, def: &FragmentDefinition<'_, String>) -> Result<FragmentDescriptor> {
        let TypeCondition::On(type_condition) = &def.type_condition;
        if self.schema.get(type_condition).is_none() {
            return Err(Error::UnknownType(type_condition.clone()));
        }
        Ok(FragmentDescriptor {
            name: def.name.clone(),
            type_condition: type_condition.clone(),
            selections: self.selections(type_condition, &def.selection_set, &def.name)?,
        })
    }

    fn selections(
        &self,
        parent: &str,
        set: &SelectionSet<'_, String>,
        context: &str,
    ) -> Result<Vec<SelectionNode>> {
        set.items
            .iter()
            .map(|item| match item {
                Selection::Field(field) => {
                    let ty = if field.name == TYPENAME_FIELD {
                        TypeRef::named("String")
                    } else {
                        self.schema
                            .field(parent, &field.name)
                            .ok_or_else(|| Error::UnknownField {
                                parent: parent.to_string(),
                                field: field.name.clone(),
                            })?
                            .ty
                            .clone()
                    };
                    let selections = if field.selection_set.items.is_empty() {
                        None
                    } else {
                        Some(self.selections(&ty.name, &field.selection_set, context)?)
                    };
                    Ok(SelectionNode::Field(FieldSelection {
                        name: field.name.clone(),
                        alias: field.alias.clone().unwrap_or_else(|| field.name.clone()),
                        ty,
                        selections,
                    }))
                }
                Selection::FragmentSpread(spread) => {
                    Ok(SelectionNode::FragmentSpread(FragmentSpreadSelection {
                        fragment: spread.fragment_name.clone(),
                    }))
                }
                Selection::InlineFragment(_) => Err(Error::UnsupportedSelection {
                    context: context.to_string(),
                    kind: "inline fragment",
                }),
            })
            .collect()
    }
}

fn variable(def: &VariableDefinition<'_, String>) -> VariableDescriptor {
    VariableDescriptor {
        name: def.name.clone(),
        ty: TypeRef::from_ast(&def.var_type),
    }
}
