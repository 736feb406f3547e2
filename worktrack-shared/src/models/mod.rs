//! Database models
//!
//! One module per entity, each owning its row struct and CRUD SQL:
//!
//! - `user`: identity records behind registration and login
//! - `project`: units of work owned by exactly one user
//! - `task`: trackable work items, owned by a user, optionally in a project
//!
//! Ids (`Uuid::new_v4`) and `created_at`/`updated_at` are assigned here at
//! write time rather than by column defaults, so a create can return the
//! exact stored row and every full-replace update refreshes `updated_at`.

pub mod project;
pub mod task;
pub mod user;

/// Escapes LIKE pattern metacharacters in a user-supplied prefix.
///
/// The result is safe to embed in a `LIKE $1` bind as `{prefix}%` for a
/// literal, case-sensitive prefix match.
pub fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("Design Doc"), "Design Doc");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_escape_like_empty() {
        assert_eq!(escape_like(""), "");
    }
}
