//! Identifier case conversion
//!
//! Converts between the member names found on Rust types and the
//! snake_case names used for tables and columns. Only ASCII identifiers
//! are supported; other input is converted on a best-effort basis.

/// Convert an identifier to snake_case
///
/// An underscore goes before an uppercase letter that follows a lowercase
/// one. Inside a run of capitals, the last capital starts a new word when a
/// lowercase letter follows it, so acronyms stay together.
///
/// # Example
/// ```rust,ignore
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("UserID"), "user_id");
/// ```
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Convert a snake_case identifier to camelCase
///
/// # Example
/// ```rust,ignore
/// assert_eq!(to_camel_case("user_id"), "userId");
/// ```
pub fn to_camel_case(input: &str) -> String {
    let pascal = to_pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a snake_case identifier to PascalCase
///
/// # Example
/// ```rust,ignore
/// assert_eq!(to_pascal_case("created_at"), "CreatedAt");
/// ```
pub fn to_pascal_case(input: &str) -> String {
    input
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_acronyms() {
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("UserID"), "user_id");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("APIKeyHash"), "api_key_hash");
    }

    #[test]
    fn test_snake_case_plain() {
        assert_eq!(to_snake_case("CreatedAt"), "created_at");
        assert_eq!(to_snake_case("name"), "name");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("Address2"), "address2");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_camel_and_pascal() {
        assert_eq!(to_camel_case("user_id"), "userId");
        assert_eq!(to_camel_case("created_at"), "createdAt");
        assert_eq!(to_pascal_case("created_at"), "CreatedAt");
        assert_eq!(to_pascal_case("order__line"), "OrderLine");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_round_trip_keeps_letters() {
        for name in ["UserID", "CreatedAt", "HTTPServer", "OwnerName"] {
            let back = to_camel_case(&to_snake_case(name));
            assert_eq!(back.to_lowercase(), name.to_lowercase());
        }
        assert_eq!(to_camel_case(&to_snake_case("UserID")), "userId");
    }
}
