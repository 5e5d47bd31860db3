//! Scope claim construction and checks

use sys_touch_shared::Role;

/// Build the `scope` claim from a user's roles
///
/// Names are concatenated in the roles' iteration order with no
/// separator, so `[ADMIN, BASIC]` becomes `"ADMINBASIC"`.
pub fn scope_from_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::name).collect()
}

/// Whether `scope` grants `role`
///
/// Entries are whitespace-delimited, as a resource server reads them. A
/// concatenated multi-role scope therefore grants none of its roles.
pub fn has_authority(scope: &str, role: &str) -> bool {
    scope.split_whitespace().any(|entry| entry == role)
}
