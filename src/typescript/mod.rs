//! typescript backend
//!
//! projectors that turn the schema model and operation descriptors into
//! typescript declarations.

mod operation;
mod schema;
mod shape;

pub use operation::OperationProjector;
pub use schema::SchemaProjector;
pub use shape::{ShapeContext, TypeRenderer};

/// namespace used for the shared types module in import mode
pub const TYPES_NAMESPACE: &str = "Types";

/// formatting knobs shared by every projector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// one level of indentation
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

impl RenderOptions {
    /// use a different indentation unit
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub(crate) fn indent(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }
}

/// helper types every schema file starts with, followed by the `Scalars`
/// lookup type built from `scalars` (`(name, native type)` pairs).
pub(crate) fn preamble(scalars: &[(String, String)], options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str("export type Maybe<T> = T | null;\n");
    out.push_str("export type InputMaybe<T> = Maybe<T>;\n");
    out.push_str(
        "export type Exact<T extends { [key: string]: unknown }> = { [K in keyof T]: T[K] };\n",
    );
    out.push_str("export type MakeOptional<T, K extends keyof T> = Omit<T, K> & { [SubKey in K]?: Maybe<T[SubKey]> };\n");
    out.push_str("export type MakeMaybe<T, K extends keyof T> = Omit<T, K> & { [SubKey in K]: Maybe<T[SubKey]> };\n");
    out.push_str("/** All built-in and custom scalars, mapped to their actual values */\n");
    out.push_str("export type Scalars = {\n");
    for (name, native) in scalars {
        out.push_str(&format!("{}{}: {};\n", options.indent(1), name, native));
    }
    out.push_str("};\n\n");
    out
}

/// `/** ... */` block for a description, empty when there is none
pub(crate) fn doc_comment(description: Option<&str>, indent: &str) -> String {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };
    // a literal `*/` would close the comment early
    let description = description.replace("*/", "*\\/");
    if !description.contains('\n') {
        return format!("{indent}/** {description} */\n");
    }
    let mut out = format!("{indent}/**\n");
    for line in description.lines() {
        let line = line.trim();
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
    out
}

/// `?` for nullable keys
pub(crate) fn optional_marker(nullable: bool) -> &'static str {
    if nullable {
        "?"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_comment() {
        assert_eq!(doc_comment(None, ""), "");
        assert_eq!(doc_comment(Some("  "), ""), "");
        assert_eq!(doc_comment(Some("a user"), "  "), "  /** a user */\n");
        assert_eq!(
            doc_comment(Some("first\n\nsecond"), "  "),
            "  /**\n   * first\n   *\n   * second\n   */\n"
        );
    }

    #[test]
    fn test_doc_comment_escapes_terminator() {
        assert_eq!(
            doc_comment(Some("ends with */ here"), ""),
            "/** ends with *\\/ here */\n"
        );
        assert_eq!(
            doc_comment(Some("a */\nb"), ""),
            "/**\n * a *\\/\n * b\n */\n"
        );
    }

    #[test]
    fn test_preamble_lists_scalars() {
        let scalars = vec![
            ("ID".to_string(), "string".to_string()),
            ("Money".to_string(), "any".to_string()),
        ];
        let out = preamble(&scalars, &RenderOptions::default().with_indent("\t"));
        assert!(out.starts_with("export type Maybe<T> = T | null;\n"));
        assert!(out.ends_with("export type Scalars = {\n\tID: string;\n\tMoney: any;\n};\n\n"));
    }
}
