use super::{BackendStore, Table, AUTH_USERS_TABLE};
use crate::domain::customer_user::NewAuthUser;
use crate::domain::error::{AppError, BackendFailure, BackendFailureKind, Result};
use crate::infrastructure::config::RestCredentials;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;
use uuid::Uuid;

const MAX_ERROR_BODY: usize = 500;

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

#[derive(Deserialize)]
struct AuthUserResponse {
    id: Uuid,
}

/// Privileged client for the hosted store's REST and auth-admin endpoints.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl RestBackend {
    pub fn new(credentials: &RestCredentials) -> Result<Self> {
        let mut base_url = credentials.url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            service_key: credentials.service_key().to_string(),
        })
    }

    fn rows_url(&self, table: Table) -> Result<Url> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table.name()))?;
        url.query_pairs_mut().append_pair("select", "id");
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::ConfigError(format!("Invalid backend endpoint '{}': {}", path, e)))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send_json(&self, table: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            AppError::Backend(BackendFailure::new(
                table,
                BackendFailureKind::Transport,
                format!("Request failed: {}", e),
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(classify_response(table, status, &text)));
        }
        Ok(response)
    }
}

#[async_trait]
impl BackendStore for RestBackend {
    fn label(&self) -> &'static str {
        "rest"
    }

    async fn insert_rows(&self, table: Table, rows: &[Value]) -> Result<Vec<Uuid>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.rows_url(table)?;
        debug!(table = %table, rows = rows.len(), "POST rows");

        let request = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(rows);
        let response = self.send_json(table.name(), request).await?;

        let stored: Vec<IdRow> = response.json().await.map_err(|e| {
            AppError::Backend(BackendFailure::new(
                table.name(),
                BackendFailureKind::Rejected,
                format!("Failed to parse inserted ids: {}", e),
            ))
        })?;
        Ok(stored.into_iter().map(|row| row.id).collect())
    }

    async fn create_auth_user(&self, user: &NewAuthUser) -> Result<Uuid> {
        let url = self.endpoint("auth/v1/admin/users")?;
        let body = json!({
            "email": user.email,
            "password": user.password,
            "email_confirm": true,
            "user_metadata": {
                "full_name": user.full_name,
                "organization_id": user.organization_id,
            },
        });

        let request = self.authorized(self.client.post(url)).json(&body);
        let response = self.send_json(AUTH_USERS_TABLE, request).await?;

        let created: AuthUserResponse = response.json().await.map_err(|e| {
            AppError::Backend(BackendFailure::new(
                AUTH_USERS_TABLE,
                BackendFailureKind::Rejected,
                format!("Failed to parse created user: {}", e),
            ))
        })?;
        Ok(created.id)
    }
}

/// Maps a non-success answer onto the failure taxonomy.
pub(crate) fn classify_response(table: &str, status: StatusCode, body: &str) -> BackendFailure {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|value| value.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let pg_code = field("code");
    let error_code = field("error_code");
    let message = field("message")
        .or_else(|| field("msg"))
        .or_else(|| field("error_description"))
        .map(|message| match field("details") {
            Some(details) => format!("{} ({})", message, details),
            None => message,
        })
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect());

    let lowered = message.to_lowercase();
    let kind = if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        BackendFailureKind::Auth
    } else if status == StatusCode::CONFLICT
        || matches!(pg_code.as_deref(), Some("23505") | Some("23503"))
        || error_code.as_deref() == Some("email_exists")
        || lowered.contains("already been registered")
        || lowered.contains("already registered")
    {
        BackendFailureKind::ConstraintViolation
    } else {
        BackendFailureKind::Rejected
    };

    BackendFailure::new(table, kind, format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str) -> RestBackend {
        let credentials = RestCredentials::new(Url::parse(url).unwrap(), "service-key".to_string());
        RestBackend::new(&credentials).unwrap()
    }

    #[test]
    fn test_rows_url() {
        let rest = backend("https://abc.supabase.co");
        assert_eq!(
            rest.rows_url(Table::CampaignSequences).unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/campaign_sequences?select=id"
        );
    }

    #[test]
    fn test_base_path_preserved() {
        let rest = backend("http://localhost:54321/proxy");
        assert_eq!(
            rest.endpoint("auth/v1/admin/users").unwrap().as_str(),
            "http://localhost:54321/proxy/auth/v1/admin/users"
        );
    }

    #[test]
    fn test_unique_violation_is_constraint() {
        let body = r#"{"code":"23505","details":"Key (slug)=(demo) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"organizations_slug_key\""}"#;
        let failure = classify_response("organizations", StatusCode::CONFLICT, body);
        assert_eq!(failure.kind, BackendFailureKind::ConstraintViolation);
        assert!(failure.message.contains("organizations_slug_key"));
        assert!(failure.message.contains("Key (slug)=(demo)"));
    }

    #[test]
    fn test_foreign_key_violation_on_bad_request() {
        let body = r#"{"code":"23503","message":"insert or update on table \"leads\" violates foreign key constraint"}"#;
        let failure = classify_response("leads", StatusCode::BAD_REQUEST, body);
        assert_eq!(failure.kind, BackendFailureKind::ConstraintViolation);
    }

    #[test]
    fn test_bad_key_is_auth() {
        let body = r#"{"message":"Invalid API key"}"#;
        let failure = classify_response("leads", StatusCode::UNAUTHORIZED, body);
        assert_eq!(failure.kind, BackendFailureKind::Auth);
    }

    #[test]
    fn test_existing_auth_email_is_constraint() {
        let body = r#"{"code":422,"error_code":"email_exists","msg":"A user with this email address has already been registered"}"#;
        let failure = classify_response(AUTH_USERS_TABLE, StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(failure.kind, BackendFailureKind::ConstraintViolation);
        assert_eq!(failure.table, "auth.users");
    }

    #[test]
    fn test_non_json_body_is_rejected() {
        let failure = classify_response("leads", StatusCode::BAD_GATEWAY, "upstream timed out");
        assert_eq!(failure.kind, BackendFailureKind::Rejected);
        assert_eq!(failure.message, "HTTP 502: upstream timed out");
    }
}
