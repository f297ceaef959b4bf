//! name normalization
//!
//! pure string helpers that turn graphql names into typescript identifiers.

/// upper-case the first letter of every `_`-separated segment, keeping the
/// underscores (`users_bool_exp` -> `Users_Bool_Exp`).
///
/// used for schema type names, which keep their separators.
pub fn pascal_case(ident: &str) -> String {
    ident
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("_")
}

/// title-case every word and drop the underscores between them
/// (`IN_PROGRESS` -> `InProgress`).
///
/// an underscore only separates words when a letter follows it, so
/// `V_1` stays `V_1`.
pub fn pascal_case_joined(ident: &str) -> String {
    split_words(ident)
        .into_iter()
        .map(|word| title(&word))
        .collect()
}

/// upper-case the first code point and rewrite `ID` as `Id`
/// (`userID` -> `UserId`).
pub fn upper_first(ident: &str) -> String {
    capitalize(ident).replace("ID", "Id")
}

/// type name prefix for an operation or fragment (`get_userByID` ->
/// `GetUserById`).
pub fn operation_name(ident: &str) -> String {
    ident.split('_').map(upper_first).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn split_words(ident: &str) -> Vec<String> {
    let mut words = vec![String::new()];
    let mut chars = ident.chars().peekable();
    while let Some(ch) = chars.next() {
        let boundary = ch == '_' && chars.peek().is_some_and(|next| next.is_ascii_alphabetic());
        if boundary {
            words.push(String::new());
        } else if let Some(word) = words.last_mut() {
            word.push(ch);
        }
    }
    words
}
