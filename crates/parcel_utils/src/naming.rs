//! Identifier helpers for generated code.

use alloc::string::String;

/// Convert an `UpperCamelCase` type name into `snake_case`.
///
/// Acronyms are kept together, so `HTTPServer` becomes `http_server`.
///
/// # Examples
///
/// ```
/// use parcel_utils::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("Ticket"), "ticket");
/// assert_eq!(to_snake_case("TicketDetail"), "ticket_detail");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let chars: alloc::vec::Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (index, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            if index > 0 && !out.ends_with('_') {
                let prev = chars[index - 1];
                let next_is_lower = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    out.push('_');
                }
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Return `base`, or `base` followed by as many `_` as needed until
/// `taken` no longer reports a collision.
///
/// Generated items introduce names of their own (a payload field, a context
/// parameter) next to user-chosen field names; this keeps both apart.
///
/// # Examples
///
/// ```
/// use parcel_utils::naming::unique_name;
///
/// let fields = ["context", "context_"];
/// let name = unique_name("context", |n| fields.contains(&n));
/// assert_eq!(name, "context__");
/// ```
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut name = String::from(base);
    while taken(&name) {
        name.push('_');
    }
    name
}
