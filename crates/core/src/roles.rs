//! Role names and the editor authorization verdict.

/// Full administrative access.
pub const ROLE_ADMIN: &str = "admin";

/// May edit page text and read its history.
pub const ROLE_EDITOR: &str = "editor";

/// Roles allowed to save text, prune history and read history.
pub const EDITOR_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR];

/// Returns `true` if a caller holding `role` is an authorized editor.
pub fn is_authorized_editor(role: &str) -> bool {
    EDITOR_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_editor_are_authorized() {
        assert!(is_authorized_editor("admin"));
        assert!(is_authorized_editor("editor"));
    }

    #[test]
    fn other_roles_are_not_authorized() {
        assert!(!is_authorized_editor("viewer"));
        assert!(!is_authorized_editor(""));
        assert!(!is_authorized_editor("Admin"));
    }
}
