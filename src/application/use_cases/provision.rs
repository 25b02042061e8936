use crate::application::use_cases::seed_orchestrator::{SeedOrchestrator, SeedReport};
use crate::domain::error::AppError;
use crate::domain::seed_summary::SeedFailure;
use crate::infrastructure::backend::BackendConnector;
use crate::infrastructure::config::{AppConfig, BackendKind};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::info;

#[derive(Debug)]
pub enum ProvisionError {
    /// Credentials or plan were unusable; nothing was written.
    Config(AppError),
    /// The store could not be reached; nothing was written.
    Connect(AppError),
    Stage(SeedFailure),
}

impl ProvisionError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ProvisionError::Config(_) => 2,
            ProvisionError::Connect(_) | ProvisionError::Stage(_) => 1,
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::Config(err) => write!(f, "{}", err),
            ProvisionError::Connect(err) => write!(f, "could not connect to backend: {}", err),
            ProvisionError::Stage(failure) => write!(f, "{}", failure),
        }
    }
}

impl std::error::Error for ProvisionError {}

/// Loads credentials, validates the plan, connects, then runs every stage.
pub struct ProvisionUseCase<C: BackendConnector> {
    connector: C,
}

impl<C: BackendConnector> ProvisionUseCase<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub async fn execute(
        &self,
        config: &AppConfig,
        kind: BackendKind,
    ) -> Result<SeedReport, ProvisionError> {
        let credentials = config
            .backend_credentials(kind)
            .map_err(ProvisionError::Config)?;
        let plan = &config.seed;
        let counts = plan.counts().map_err(ProvisionError::Config)?;

        let store = self
            .connector
            .connect(&credentials)
            .await
            .map_err(|err| {
                if err.is_config() {
                    ProvisionError::Config(err)
                } else {
                    ProvisionError::Connect(err)
                }
            })?;

        let mut rng = match plan.rng_seed {
            Some(seed) => {
                info!(seed, "Using fixed RNG seed");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        SeedOrchestrator::new(store)
            .run(plan, counts, &mut rng, Utc::now())
            .await
            .map_err(ProvisionError::Stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::Result;
    use crate::domain::seed_plan::SeedPlan;
    use crate::infrastructure::backend::{BackendStore, MemoryBackend, Table};
    use crate::infrastructure::config::BackendCredentials;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct SharedMemory {
        store: Arc<MemoryBackend>,
        connects: Arc<AtomicUsize>,
    }

    impl SharedMemory {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryBackend::new()),
                connects: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl BackendConnector for SharedMemory {
        async fn connect(&self, _credentials: &BackendCredentials) -> Result<Arc<dyn BackendStore>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let store: Arc<dyn BackendStore> = self.store.clone();
            Ok(store)
        }
    }

    fn config(key: &str, plan: SeedPlan) -> AppConfig {
        AppConfig {
            supabase_url: Some("https://abc.supabase.co".to_string()),
            supabase_service_role_key: Some(key.to_string()),
            seed: plan,
            ..Default::default()
        }
    }

    fn small_plan() -> SeedPlan {
        SeedPlan {
            lead_count: 30,
            activity_event_count: 10,
            rng_seed: Some(17),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_key_writes_nothing() {
        let memory = SharedMemory::new();
        let err = ProvisionUseCase::new(memory.clone())
            .execute(&config("", small_plan()), BackendKind::Rest)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Config(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(memory.connects.load(Ordering::SeqCst), 0);
        assert_eq!(memory.store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_negative_count_writes_nothing() {
        let memory = SharedMemory::new();
        let plan = SeedPlan {
            activity_event_count: -5,
            ..small_plan()
        };
        let err = ProvisionUseCase::new(memory.clone())
            .execute(&config("key", plan), BackendKind::Rest)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Config(_)));
        assert_eq!(memory.store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_run() {
        let memory = SharedMemory::new();
        let report = ProvisionUseCase::new(memory.clone())
            .execute(&config("key", small_plan()), BackendKind::Rest)
            .await
            .unwrap();

        assert_eq!(memory.connects.load(Ordering::SeqCst), 1);
        assert_eq!(report.summary.leads, 30);
        assert_eq!(memory.store.count(Table::Leads), 30);
    }

    #[tokio::test]
    async fn test_stage_failure_exit_code() {
        let memory = SharedMemory::new();
        let use_case = ProvisionUseCase::new(memory.clone());
        use_case
            .execute(&config("key", small_plan()), BackendKind::Rest)
            .await
            .unwrap();
        let err = use_case
            .execute(&config("key", small_plan()), BackendKind::Rest)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Stage(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
