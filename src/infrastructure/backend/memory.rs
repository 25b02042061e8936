use super::{BackendStore, Table, AUTH_USERS_TABLE};
use crate::domain::customer_user::NewAuthUser;
use crate::domain::error::{AppError, BackendFailure, BackendFailureKind, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Value>>,
    auth_users: Vec<(Uuid, String)>,
    failures: HashMap<String, BackendFailureKind>,
}

impl MemoryState {
    fn ids(&self, table: Table) -> HashSet<Uuid> {
        self.tables
            .get(&table)
            .map(|rows| rows.iter().filter_map(row_id).collect())
            .unwrap_or_default()
    }
}

/// In-process store with the constraints the hosted schema enforces:
/// organization slugs and auth emails are unique, and every child row must
/// point at an existing parent. Each write is all-or-nothing.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    write_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write to `table` fail with `kind`.
    pub fn fail_on(&self, table: &str, kind: BackendFailureKind) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert(table.to_string(), kind);
        }
    }

    /// Number of write attempts, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state
            .lock()
            .map(|state| state.tables.get(&table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn count(&self, table: Table) -> usize {
        self.rows(table).len()
    }

    pub fn auth_user_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.auth_users.len())
            .unwrap_or_default()
    }

    fn lock(&self, table: &str) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| {
            AppError::Backend(BackendFailure::new(
                table,
                BackendFailureKind::Transport,
                "memory store lock poisoned",
            ))
        })
    }
}

fn row_id(row: &Value) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn reference(row: &Value, column: &str) -> Option<Uuid> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn violation(table: Table, index: usize, message: String) -> AppError {
    AppError::Backend(
        BackendFailure::new(table.name(), BackendFailureKind::ConstraintViolation, message)
            .at_record(index),
    )
}

fn check_foreign_key(
    table: Table,
    index: usize,
    row: &Value,
    column: &str,
    parents: &HashSet<Uuid>,
    nullable: bool,
) -> Result<()> {
    match (row.get(column), reference(row, column)) {
        (_, Some(id)) if parents.contains(&id) => Ok(()),
        (None, _) | (Some(Value::Null), _) if nullable => Ok(()),
        _ => Err(violation(
            table,
            index,
            format!("insert violates foreign key constraint on {}", column),
        )),
    }
}

#[async_trait]
impl BackendStore for MemoryBackend {
    fn label(&self) -> &'static str {
        "memory"
    }

    async fn insert_rows(&self, table: Table, rows: &[Value]) -> Result<Vec<Uuid>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock(table.name())?;

        if let Some(kind) = state.failures.get(table.name()) {
            return Err(AppError::Backend(BackendFailure::new(
                table.name(),
                *kind,
                "injected failure",
            )));
        }

        let organizations = state.ids(Table::Organizations);
        let leads = state.ids(Table::Leads);
        let campaigns = state.ids(Table::Campaigns);
        let mut seen_ids = HashSet::new();
        let mut slugs: HashSet<String> = state
            .tables
            .get(&Table::Organizations)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.get("slug").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let existing = state.ids(table);

        let mut ids = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let id = row_id(row).ok_or_else(|| {
                AppError::Backend(
                    BackendFailure::new(table.name(), BackendFailureKind::Rejected, "row has no valid id")
                        .at_record(index),
                )
            })?;
            if existing.contains(&id) || !seen_ids.insert(id) {
                return Err(violation(
                    table,
                    index,
                    format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                ));
            }

            match table {
                Table::Organizations => {
                    let slug = row.get("slug").and_then(Value::as_str).unwrap_or_default();
                    if !slugs.insert(slug.to_string()) {
                        return Err(violation(
                            table,
                            index,
                            format!("duplicate key value violates unique constraint \"organizations_slug_key\": slug={}", slug),
                        ));
                    }
                }
                Table::Leads | Table::Campaigns | Table::CustomerUsers => {
                    check_foreign_key(table, index, row, "organization_id", &organizations, false)?;
                }
                Table::CampaignSequences => {
                    check_foreign_key(table, index, row, "campaign_id", &campaigns, false)?;
                }
                Table::ActivityEvents => {
                    check_foreign_key(table, index, row, "organization_id", &organizations, false)?;
                    check_foreign_key(table, index, row, "lead_id", &leads, true)?;
                    check_foreign_key(table, index, row, "campaign_id", &campaigns, true)?;
                }
            }
            ids.push(id);
        }

        state
            .tables
            .entry(table)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(ids)
    }

    async fn create_auth_user(&self, user: &NewAuthUser) -> Result<Uuid> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock(AUTH_USERS_TABLE)?;

        if let Some(kind) = state.failures.get(AUTH_USERS_TABLE) {
            return Err(AppError::Backend(BackendFailure::new(
                AUTH_USERS_TABLE,
                *kind,
                "injected failure",
            )));
        }

        let email = user.email.to_lowercase();
        if state.auth_users.iter().any(|(_, existing)| *existing == email) {
            return Err(AppError::Backend(BackendFailure::new(
                AUTH_USERS_TABLE,
                BackendFailureKind::ConstraintViolation,
                "A user with this email address has already been registered",
            )));
        }

        let id = Uuid::new_v4();
        state.auth_users.push((id, email));
        Ok(id)
    }
}
