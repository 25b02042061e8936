use super::{BackendStore, Table, AUTH_USERS_TABLE};
use crate::domain::customer_user::NewAuthUser;
use crate::domain::error::{AppError, BackendFailure, BackendFailureKind, Result};
use crate::infrastructure::config::PgCredentials;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const CREATE_AUTH_USER_SQL: &str = "INSERT INTO auth.users (
        instance_id, id, aud, role, email, encrypted_password, email_confirmed_at,
        raw_app_meta_data, raw_user_meta_data, created_at, updated_at
    )
    VALUES (
        '00000000-0000-0000-0000-000000000000', gen_random_uuid(), 'authenticated', 'authenticated',
        $1, crypt($2, gen_salt('bf')), now(), $3, $4, now(), now()
    )
    RETURNING id";

/// Direct Postgres writer, for local stacks where the database port is reachable.
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub async fn connect(credentials: &PgCredentials) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(credentials.database_url())
            .await
            .map_err(|e| AppError::Backend(map_sqlx_error("connection", e)))?;

        info!("Connected to Postgres backend");
        Ok(Self { pool })
    }
}

/// `INSERT … SELECT` over `jsonb_populate_recordset`, limited to the given
/// columns so column defaults still apply to the rest. Rows are inserted in
/// input order.
pub(crate) fn insert_statement(table: Table, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|column| format!("\"{}\"", column.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO public.{table} ({columns}) SELECT {columns} FROM jsonb_populate_recordset(NULL::public.{table}, $1) WITH ORDINALITY AS input ORDER BY input.ordinality RETURNING id",
        table = table.name(),
        columns = column_list
    )
}

/// `RETURNING` has no ordering guarantee. When every row carries its own id,
/// answer in input order and check each one was acknowledged.
pub(crate) fn ids_in_input_order(table: Table, rows: &[Value], returned: Vec<Uuid>) -> Result<Vec<Uuid>> {
    let supplied: Option<Vec<Uuid>> = rows
        .iter()
        .map(|row| {
            row.get("id")
                .and_then(Value::as_str)
                .and_then(|id| Uuid::parse_str(id).ok())
        })
        .collect();
    let Some(supplied) = supplied else {
        return Ok(returned);
    };

    let acknowledged: HashSet<Uuid> = returned.into_iter().collect();
    for (index, id) in supplied.iter().enumerate() {
        if !acknowledged.contains(id) {
            return Err(AppError::Backend(
                BackendFailure::new(
                    table.name(),
                    BackendFailureKind::Rejected,
                    format!("row id {} was not returned by the insert", id),
                )
                .at_record(index),
            ));
        }
    }
    Ok(supplied)
}

fn row_columns(rows: &[Value]) -> Vec<String> {
    rows.first()
        .and_then(Value::as_object)
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

pub(crate) fn map_sqlx_error(table: &str, err: sqlx::Error) -> BackendFailure {
    let kind = match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                BackendFailureKind::ConstraintViolation
            } else if db_err.code().map(|code| code.starts_with("28")).unwrap_or(false) {
                BackendFailureKind::Auth
            } else {
                BackendFailureKind::Rejected
            }
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            BackendFailureKind::Transport
        }
        _ => BackendFailureKind::Rejected,
    };
    BackendFailure::new(table, kind, err.to_string())
}

#[async_trait]
impl BackendStore for PgBackend {
    fn label(&self) -> &'static str {
        "postgres"
    }

    async fn insert_rows(&self, table: Table, rows: &[Value]) -> Result<Vec<Uuid>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let sql = insert_statement(table, &row_columns(rows));
        debug!(table = %table, rows = rows.len(), "INSERT rows");

        let returned = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(Json(rows))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Backend(map_sqlx_error(table.name(), e)))?;
        ids_in_input_order(table, rows, returned)
    }

    async fn create_auth_user(&self, user: &NewAuthUser) -> Result<Uuid> {
        let app_meta = json!({ "provider": "email", "providers": ["email"] });
        let user_meta = json!({
            "full_name": user.full_name,
            "organization_id": user.organization_id,
        });

        sqlx::query_scalar::<_, Uuid>(CREATE_AUTH_USER_SQL)
            .bind(&user.email)
            .bind(&user.password)
            .bind(Json(app_meta))
            .bind(Json(user_meta))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Backend(map_sqlx_error(AUTH_USERS_TABLE, e)))
    }
}
