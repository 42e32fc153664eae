//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Expand `$VAR` and `${VAR}` references against the process environment.
///
/// Unset variables expand to the empty string.
pub fn expand_vars(input: &str) -> String {
    expand_with(input, |name| env::var(name).ok())
}

/// Expand `$VAR` and `${VAR}` references using `lookup`.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some((_, '{')) => {
                let start = i + 2;
                match input[start..].find('}') {
                    Some(len) => {
                        let name = &input[start..start + len];
                        out.push_str(&lookup(name).unwrap_or_default());
                        // Skip past the closing brace.
                        while let Some((j, _)) = chars.next() {
                            if j == start + len {
                                break;
                            }
                        }
                    }
                    None => out.push(c),
                }
            }
            Some((_, n)) if n.is_ascii_alphanumeric() || *n == '_' => {
                let mut name = String::new();
                while let Some((_, n)) = chars.peek() {
                    if n.is_ascii_alphanumeric() || *n == '_' {
                        name.push(*n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&lookup(&name).unwrap_or_default());
            }
            _ => out.push(c),
        }
    }

    out
}
