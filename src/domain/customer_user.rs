use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Auth identity to create for portal access. The password is never printed.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewAuthUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub organization_id: Uuid,
}

impl fmt::Debug for NewAuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAuthUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// Portal link row tying an auth identity to its organization.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CustomerUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
}
