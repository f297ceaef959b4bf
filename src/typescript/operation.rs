//! operation projection
//!
//! renders the variables and result types of every operation, plus one
//! standalone type per fragment an operation spreads. selections are first
//! collected into a small shape tree (fragment spreads inlined, members
//! merged by response key) and then written out.

use super::shape::{ShapeContext, TypeRenderer};
use super::{optional_marker, RenderOptions, TYPES_NAMESPACE};
use crate::document::{
    FragmentDescriptor, OperationDescriptor, OperationSet, SelectionNode, TYPENAME_FIELD,
};
use crate::error::{Error, Result};
use crate::naming::operation_name;
use crate::schema::SchemaModel;
use std::collections::BTreeMap;

/// renders the `typescript-operations` plugin output
pub struct OperationProjector<'a> {
    set: &'a OperationSet,
    renderer: TypeRenderer,
    options: &'a RenderOptions,
    types_path: Option<String>,
}

impl<'a> OperationProjector<'a> {
    pub fn new(schema: &SchemaModel, set: &'a OperationSet, options: &'a RenderOptions) -> Self {
        Self {
            set,
            renderer: TypeRenderer::for_schema(schema),
            options,
            types_path: None,
        }
    }

    /// import shared schema types from `path` instead of expecting them in
    /// the same file
    pub fn with_types_path(mut self, path: impl Into<String>) -> Self {
        self.types_path = Some(path.into());
        self.renderer = self.renderer.with_types_namespace();
        self
    }

    /// render every operation of the set
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        if let Some(path) = &self.types_path {
            out.push_str(&format!("import * as {TYPES_NAMESPACE} from \"{path}\";\n\n"));
        }
        for operation in &self.set.operations {
            out.push_str(&self.render_operation(operation)?);
        }
        Ok(out)
    }

    /// render one operation: fragment types first, then variables, then the
    /// result type
    pub fn render_operation(&self, operation: &'a OperationDescriptor) -> Result<String> {
        // fresh per operation so fragments never leak into the next one
        let mut registry = FragmentRegistry::default();

        let mut root = Shape::new(&operation.root_type);
        self.collect(&operation.selections, &mut root, &mut registry, &mut Vec::new())?;

        let fragments = self.render_fragments(&registry)?;
        tracing::debug!(
            operation = %operation.name,
            fragments = registry.len(),
            "rendered operation"
        );

        let type_name = format!(
            "{}{}",
            operation_name(&operation.name),
            operation.kind.type_suffix()
        );
        let exact = self.renderer.qualify("Exact");

        let mut out = fragments;
        out.push_str(&self.render_variables(operation, &type_name, &exact));
        out.push_str(&format!("export type {type_name} = {exact}<{{\n"));
        self.write_shape(&root, 1, &mut out);
        out.push_str("}>;\n\n");
        Ok(out)
    }

    fn render_variables(
        &self,
        operation: &OperationDescriptor,
        type_name: &str,
        exact: &str,
    ) -> String {
        if operation.variables.is_empty() {
            return format!(
                "export type {type_name}Variables = {exact}<{{ [key: string]: never; }}>;\n\n"
            );
        }
        let indent = self.options.indent(1);
        let mut out = format!("export type {type_name}Variables = {exact}<{{\n");
        for variable in &operation.variables {
            out.push_str(&format!(
                "{indent}{}{}: {};\n",
                variable.name,
                optional_marker(variable.ty.nullable),
                self.renderer.render(&variable.ty, ShapeContext::Variable)
            ));
        }
        out.push_str("}>;\n\n");
        out
    }

    fn render_fragments(&self, registry: &FragmentRegistry<'a>) -> Result<String> {
        let mut out = String::new();
        for fragment in registry.fragments() {
            let mut shape = Shape::new(&fragment.type_condition);
            // everything reachable from here is already registered
            let mut scratch = FragmentRegistry::default();
            let mut stack = vec![fragment.name.as_str()];
            self.collect(&fragment.selections, &mut shape, &mut scratch, &mut stack)?;

            out.push_str(&format!("export type {}Fragment = {{\n", fragment.name));
            self.write_shape(&shape, 1, &mut out);
            out.push_str("};\n\n");
        }
        Ok(out)
    }

    /// fold `selections` into `shape`, inlining fragment spreads
    fn collect(
        &self,
        selections: &'a [SelectionNode],
        shape: &mut Shape,
        registry: &mut FragmentRegistry<'a>,
        stack: &mut Vec<&'a str>,
    ) -> Result<()> {
        for selection in selections {
            match selection {
                SelectionNode::Field(field) => {
                    if field.name == TYPENAME_FIELD {
                        continue;
                    }
                    let member = match &field.selections {
                        None => Member::Leaf {
                            key: field.alias.clone(),
                            optional: field.ty.nullable,
                            ty: self.renderer.render(&field.ty, ShapeContext::OperationResult),
                        },
                        Some(nested) => {
                            let mut inner = Shape::new(&field.ty.name);
                            self.collect(nested, &mut inner, registry, stack)?;
                            Member::Nested {
                                key: field.alias.clone(),
                                optional: field.ty.nullable,
                                list: field.ty.is_list,
                                shape: inner,
                            }
                        }
                    };
                    shape.push(member);
                }
                SelectionNode::FragmentSpread(spread) => {
                    let fragment = self
                        .set
                        .fragment(&spread.fragment)
                        .ok_or_else(|| Error::UnknownFragment(spread.fragment.clone()))?;
                    if stack.contains(&fragment.name.as_str()) {
                        let mut path = stack.join(" -> ");
                        path.push_str(" -> ");
                        path.push_str(&fragment.name);
                        return Err(Error::FragmentCycle(path));
                    }
                    registry.record(fragment);
                    stack.push(&fragment.name);
                    self.collect(&fragment.selections, shape, registry, stack)?;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn write_shape(&self, shape: &Shape, depth: usize, out: &mut String) {
        let indent = self.options.indent(depth);
        out.push_str(&format!("{indent}__typename?: '{}';\n", shape.typename));
        for member in &shape.members {
            match member {
                Member::Leaf { key, optional, ty } => {
                    out.push_str(&format!(
                        "{indent}{key}{}: {ty};\n",
                        optional_marker(*optional)
                    ));
                }
                Member::Nested {
                    key,
                    optional,
                    list,
                    shape,
                } => {
                    let (open, close) = if *list { ("Array<{", "}>") } else { ("{", "}") };
                    out.push_str(&format!(
                        "{indent}{key}{}: {open}\n",
                        optional_marker(*optional)
                    ));
                    self.write_shape(shape, depth + 1, out);
                    out.push_str(&format!("{indent}{close};\n"));
                }
            }
        }
    }
}

/// fragments spread while rendering one operation, keyed by name
#[derive(Debug, Default)]
struct FragmentRegistry<'a> {
    fragments: BTreeMap<&'a str, &'a FragmentDescriptor>,
}

impl<'a> FragmentRegistry<'a> {
    fn record(&mut self, fragment: &'a FragmentDescriptor) {
        self.fragments.insert(&fragment.name, fragment);
    }

    fn len(&self) -> usize {
        self.fragments.len()
    }

    fn fragments(&self) -> impl Iterator<Item = &'a FragmentDescriptor> + '_ {
        self.fragments.values().copied()
    }
}

/// object shape of one selection set
#[derive(Debug)]
struct Shape {
    typename: String,
    members: Vec<Member>,
}

#[derive(Debug)]
enum Member {
    Leaf {
        key: String,
        optional: bool,
        ty: String,
    },
    Nested {
        key: String,
        optional: bool,
        list: bool,
        shape: Shape,
    },
}

impl Member {
    fn key(&self) -> &str {
        match self {
            Member::Leaf { key, .. } | Member::Nested { key, .. } => key,
        }
    }
}

impl Shape {
    fn new(typename: &str) -> Self {
        Self {
            typename: typename.to_string(),
            members: Vec::new(),
        }
    }

    /// add a member; a key seen before keeps its first position, and two
    /// nested selections under one key merge
    fn push(&mut self, member: Member) {
        let position = self
            .members
            .iter()
            .position(|existing| existing.key() == member.key());
        let Some(position) = position else {
            self.members.push(member);
            return;
        };
        if let (Member::Nested { shape: into, .. }, Member::Nested { shape: from, .. }) =
            (&mut self.members[position], member)
        {
            for member in from.members {
                into.push(member);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = indoc! {r#"
        schema { query: query_root mutation: mutation_root }
        enum user_role { ADMIN MEMBER }
        type users {
          id: ID!
          name: String
          role: user_role!
          tags: [String!]
          created_at: timestamptz!
          friends: [users!]!
          best_friend: users
        }
        type query_root {
          users(limit: Int): [users!]!
          user_by_pk(id: ID!): users
        }
        type mutation_root {
          delete_user(id: ID!): users
        }
    "#};

    fn render(documents: &str) -> Result<String> {
        let schema = SchemaModel::parse(SCHEMA).unwrap();
        let set = OperationSet::parse(&schema, documents, "test").unwrap();
        let options = RenderOptions::default();
        OperationProjector::new(&schema, &set, &options).render()
    }

    fn render_imported(documents: &str) -> String {
        let schema = SchemaModel::parse(SCHEMA).unwrap();
        let set = OperationSet::parse(&schema, documents, "test").unwrap();
        let options = RenderOptions::default();
        OperationProjector::new(&schema, &set, &options)
            .with_types_path("./types")
            .render()
            .unwrap()
    }

    #[test]
    fn test_query_with_nested_selections() {
        let out = render(indoc! {"
            query getUserByID($id: ID!) {
              user: user_by_pk(id: $id) {
                id
                name
                role
                tags
                friends { id }
              }
            }
        "})
        .unwrap();

        assert_eq!(
            out,
            indoc! {"
                export type GetUserByIdQueryVariables = Exact<{
                  id: Scalars['ID'];
                }>;

                export type GetUserByIdQuery = Exact<{
                  __typename?: 'query_root';
                  user?: {
                    __typename?: 'users';
                    id: string;
                    name?: string | null;
                    role: User_Role;
                    tags?: string[] | null;
                    friends: Array<{
                      __typename?: 'users';
                      id: string;
                    }>;
                  };
                }>;

            "}
        );
    }

    #[test]
    fn test_explicit_typename_is_not_duplicated() {
        let out = render("query Q { users { __typename id } }").unwrap();
        assert_eq!(out.matches("__typename?: 'users';").count(), 1);
        assert!(!out.contains("__typename: string"));
    }

    #[test]
    fn test_fragment_emitted_once() {
        let out = render(indoc! {"
            query Q {
              users { ...UserFields }
              user_by_pk(id: 1) { best_friend { ...UserFields } }
            }
            fragment UserFields on users { id name }
        "})
        .unwrap();

        assert_eq!(out.matches("export type UserFieldsFragment = {").count(), 1);
        assert!(out.starts_with(indoc! {"
            export type UserFieldsFragment = {
              __typename?: 'users';
              id: string;
              name?: string | null;
            };

            export type QQueryVariables = Exact<{ [key: string]: never; }>;
        "}));
        // spread fields are inlined at every spread site
        let lines = |line: &str| out.lines().filter(|l| *l == line).count();
        assert_eq!(lines("    id: string;"), 1);
        assert_eq!(lines("      id: string;"), 1);
    }

    #[test]
    fn test_fragment_type_keeps_its_declared_name() {
        let out = render(indoc! {"
            query get_userByID { users { ...user_fieldsByID } }
            fragment user_fieldsByID on users { id }
        "})
        .unwrap();

        assert!(out.starts_with("export type user_fieldsByIDFragment = {\n"));
        assert!(out.contains("export type GetUserByIdQuery = Exact<{\n"));
        assert!(!out.contains("UserFieldsByIdFragment"));
    }

    #[test]
    fn test_fragments_do_not_leak_between_operations() {
        let out = render(indoc! {"
            query A { users { ...UserFields } }
            query B { users { id } }
            fragment UserFields on users { id }
        "})
        .unwrap();
        let (first, second) = out.split_once("export type BQueryVariables").unwrap();
        assert!(first.contains("UserFieldsFragment"));
        assert!(!second.contains("UserFieldsFragment"));
    }

    #[test]
    fn test_nested_fragments_are_registered() {
        let out = render(indoc! {"
            query Q { users { ...Outer } }
            fragment Outer on users { id best_friend { ...Inner } }
            fragment Inner on users { name }
        "})
        .unwrap();
        let inner = out.find("export type InnerFragment").unwrap();
        let outer = out.find("export type OuterFragment").unwrap();
        assert!(inner < outer);
        assert!(out.contains(indoc! {"
            export type OuterFragment = {
              __typename?: 'users';
              id: string;
              best_friend?: {
                __typename?: 'users';
                name?: string | null;
              };
            };
        "}));
    }

    #[test]
    fn test_duplicate_keys_are_merged() {
        let out = render(indoc! {"
            query Q { users { id best_friend { id } ...More } }
            fragment More on users { id best_friend { name } }
        "})
        .unwrap();
        assert!(out.contains(concat!(
            "  users: Array<{\n",
            "    __typename?: 'users';\n",
            "    id: string;\n",
            "    best_friend?: {\n",
            "      __typename?: 'users';\n",
            "      id: string;\n",
            "      name?: string | null;\n",
            "    };\n",
            "  }>;\n",
        )));
    }

    #[test]
    fn test_fragment_cycle() {
        let err = render(indoc! {"
            query Q { users { ...A } }
            fragment A on users { best_friend { ...B } }
            fragment B on users { best_friend { ...A } }
        "})
        .unwrap_err();
        assert!(matches!(err, Error::FragmentCycle(path) if path == "A -> B -> A"));
    }

    #[test]
    fn test_mutation_naming_and_optional_variables() {
        let out = render("mutation delete_user($id: ID!, $reason: String) { delete_user(id: $id) { id } }")
            .unwrap();
        assert!(out.contains(indoc! {"
            export type DeleteUserMutationVariables = Exact<{
              id: Scalars['ID'];
              reason?: Maybe<Scalars['String']>;
            }>;
        "}));
        assert!(out.contains("export type DeleteUserMutation = Exact<{\n  __typename?: 'mutation_root';\n"));
    }

    #[test]
    fn test_import_mode() {
        let out = render_imported("query Q($limit: Int) { users(limit: $limit) { role created_at } }");
        assert!(out.starts_with("import * as Types from \"./types\";\n\n"));
        assert_eq!(out.matches("import * as Types").count(), 1);
        assert!(out.contains("export type QQueryVariables = Types.Exact<{\n  limit?: Types.Maybe<Types.Scalars['Int']>;\n}>;\n"));
        assert!(out.contains("export type QQuery = Types.Exact<{\n"));
        assert!(out.contains("    role: Types.User_Role;\n"));
        assert!(out.contains("    created_at: string;\n"));
    }

    #[test]
    fn test_output_is_stable() {
        let documents = indoc! {"
            query A { users { ...F } }
            query B { users { ...G ...F } }
            fragment F on users { id }
            fragment G on users { name }
        "};
        assert_eq!(render(documents).unwrap(), render(documents).unwrap());
    }
}
