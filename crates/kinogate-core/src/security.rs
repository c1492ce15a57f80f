use crate::domain::UserId;

// ============== Authorization ==============

/// Administrators are a flat allow-list of user ids.
pub fn is_admin(user_id: Option<UserId>, admin_ids: &[i64]) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    admin_ids.contains(&user_id.0)
}
