//! Role gating for the admin panel and the customer portal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_HOME: &str = "/admin";
pub const PORTAL_HOME: &str = "/portal";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Admin,
    Portal,
}

/// Resolved identity of the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub is_super_admin: bool,
    pub customer_organization_id: Option<Uuid>,
}

impl SessionContext {
    pub fn is_customer(&self) -> bool {
        self.customer_organization_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Redirect(&'static str),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decides whether `session` may enter `section`, and where to send it otherwise.
pub fn gate(section: Section, session: Option<&SessionContext>) -> AccessDecision {
    let Some(session) = session else {
        return AccessDecision::Redirect(LOGIN_PATH);
    };

    match section {
        Section::Admin if session.is_super_admin => AccessDecision::Allow,
        Section::Admin if session.is_customer() => AccessDecision::Redirect(PORTAL_HOME),
        Section::Portal if session.is_customer() => AccessDecision::Allow,
        Section::Portal if session.is_super_admin => AccessDecision::Redirect(ADMIN_HOME),
        _ => AccessDecision::Redirect(UNAUTHORIZED_PATH),
    }
}
