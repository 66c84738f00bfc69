// ============== Authorization ==============

/// Whether a chat belongs to the configured admin.
///
/// Usernames are compared case-insensitively; a chat without a username is
/// never the admin.
pub fn is_admin(chat_username: Option<&str>, admin_username: &str) -> bool {
    let Some(username) = chat_username else {
        return false;
    };
    if admin_username.is_empty() {
        return false;
    }
    username.to_lowercase() == admin_username.to_lowercase()
}
