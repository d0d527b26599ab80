//! Role identifier normalization.

/// Canonical prefix carried by every role id.
pub const ROLE_PREFIX: &str = "roles/";

/// Normalize a role identifier to carry the `roles/` prefix.
///
/// `admin` and `roles/admin` denote the same role. Normalizing an already
/// normalized id returns it unchanged.
#[must_use]
pub fn normalize_role(role_id: &str) -> String {
    if role_id.starts_with(ROLE_PREFIX) {
        role_id.to_string()
    } else {
        format!("{ROLE_PREFIX}{role_id}")
    }
}
