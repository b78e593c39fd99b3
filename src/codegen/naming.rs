//! Identifier conventions shared by all backends.
//!
//! Source identifiers are PascalCase. Members and locals are rendered in
//! camelCase, constants and enum values in UPPER_SNAKE_CASE.

/// `ReadByte` → `readByte`, `X` → `x`.
pub fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `MaxLength` → `MAX_LENGTH`, `HTTPStatus` → `HTTP_STATUS`, `RED` → `RED`.
pub fn upper_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }
    out
}

/// A target's reserved words.
#[derive(Clone, Copy, Debug)]
pub struct Keywords(pub &'static [&'static str]);

impl Keywords {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name)
    }

    /// Append `_` when `name` collides with a reserved word.
    pub fn escape(&self, name: String) -> String {
        if self.contains(&name) {
            name + "_"
        } else {
            name
        }
    }
}
