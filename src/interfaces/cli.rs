//! Operator command line.

use crate::application::use_cases::campaign_preview::render_step;
use crate::application::use_cases::generators::{build_organization, generate_campaigns, generate_leads};
use crate::application::{CampaignPreviewUseCase, IcebreakerWriterUseCase, ProvisionUseCase};
use crate::domain::error::{AppError, Result};
use crate::domain::lead::{Lead, LeadStatus};
use crate::infrastructure::backend::StoreConnector;
use crate::infrastructure::config::{AppConfig, BackendKind, ConfigService, DEFAULT_CONFIG_FILE};
use crate::infrastructure::email::HttpEmailClient;
use crate::infrastructure::llm_clients::OpenAICompatibleClient;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mailsmith")]
#[command(version, about = "Demo tenant provisioning and server-side actions for Mailsmith")]
pub struct Cli {
    /// Optional TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create one organization with leads, campaigns, a customer user and an activity feed.
    Seed(SeedArgs),

    /// Ask the configured LLM for an icebreaker line.
    Icebreaker(IcebreakerArgs),

    /// Render a sequence step of a demo campaign and send it through the email API.
    Preview(PreviewArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Hosted REST API (SUPABASE_URL + SUPABASE_SERVICE_ROLE_KEY).
    Rest,
    /// Direct Postgres connection (DATABASE_URL).
    Postgres,
    /// In-process store; nothing leaves the machine.
    Memory,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Rest => BackendKind::Rest,
            BackendArg::Postgres => BackendKind::Postgres,
            BackendArg::Memory => BackendKind::Memory,
        }
    }
}

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, value_enum, default_value_t = BackendArg::Rest)]
    pub backend: BackendArg,

    /// Number of leads (default 2000).
    #[arg(long, allow_negative_numbers = true)]
    pub leads: Option<i64>,

    /// Number of activity feed events.
    #[arg(long, allow_negative_numbers = true)]
    pub events: Option<i64>,

    /// Chance that a lead carries an icebreaker.
    #[arg(long)]
    pub icebreaker_probability: Option<f64>,

    /// Seed for reproducible data.
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Organization slug (the store's uniqueness key).
    #[arg(long)]
    pub slug: Option<String>,
}

#[derive(Args)]
pub struct IcebreakerArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long)]
    pub company: String,
    #[arg(long, default_value = "Agency Owner")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub state: String,
    /// Comma separated, e.g. "commercial auto,trucking".
    #[arg(long, value_delimiter = ',')]
    pub lines: Vec<String>,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Recipient address.
    #[arg(long)]
    pub to: String,
    /// Campaign number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub campaign: usize,
    /// Step number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub step: u32,
    /// Print instead of sending.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn dispatch(cli: Cli) -> ExitCode {
    let config = match ConfigService::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Seed(args) => return ExitCode::from(seed(config, args).await),
        Commands::Icebreaker(args) => icebreaker(&config, args).await,
        Commands::Preview(args) => preview(&config, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(if err.is_config() { 2 } else { 1 })
        }
    }
}

async fn seed(mut config: AppConfig, args: SeedArgs) -> u8 {
    if let Some(leads) = args.leads {
        config.seed.lead_count = leads;
    }
    if let Some(events) = args.events {
        config.seed.activity_event_count = events;
    }
    if let Some(probability) = args.icebreaker_probability {
        config.seed.icebreaker_probability = probability;
    }
    if let Some(seed) = args.rng_seed {
        config.seed.rng_seed = Some(seed);
    }
    if let Some(slug) = args.slug {
        config.seed.organization_slug = slug;
    }

    match ProvisionUseCase::new(StoreConnector)
        .execute(&config, args.backend.into())
        .await
    {
        Ok(report) => {
            println!("Seeded organization {}", report.organization_id);
            println!("Customer user {} <{}>", report.customer_user_id, config.seed.customer_email);
            println!("{}", report.summary);
            0
        }
        Err(err) => {
            eprintln!("error: {}", err);
            err.exit_code()
        }
    }
}

async fn icebreaker(config: &AppConfig, args: IcebreakerArgs) -> Result<()> {
    let mut rng = StdRng::from_entropy();
    let organization = build_organization(&mut rng, &config.seed, Utc::now());
    let lead = Lead {
        id: Uuid::nil(),
        organization_id: organization.id,
        first_name: args.first_name,
        last_name: args.last_name,
        email: String::new(),
        title: args.title,
        company_name: args.company,
        company_domain: String::new(),
        city: args.city,
        state: args.state,
        phone: String::new(),
        lines_of_business: args.lines,
        status: LeadStatus::New,
        icebreaker: None,
        created_at: Utc::now(),
    };

    let use_case = IcebreakerWriterUseCase::new(Arc::new(OpenAICompatibleClient::new()));
    let text = use_case.execute(&config.llm, &organization, &lead).await?;
    println!("{}", text);
    Ok(())
}

async fn preview(config: &AppConfig, args: PreviewArgs) -> Result<()> {
    let mut rng = match config.seed.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();
    let organization = build_organization(&mut rng, &config.seed, now);
    let lead = generate_leads(&mut rng, &organization, 1, 1.0, now)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("no demo lead generated".to_string()))?;
    let campaigns = generate_campaigns(&mut rng, &organization, now);

    let campaign = args
        .campaign
        .checked_sub(1)
        .and_then(|index| campaigns.get(index))
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "campaign must be between 1 and {}",
                campaigns.len()
            ))
        })?;
    let step = campaign.step(args.step).ok_or_else(|| {
        AppError::ValidationError(format!(
            "step must be between 1 and {} for '{}'",
            campaign.steps.len(),
            campaign.campaign.name
        ))
    })?;

    if args.dry_run {
        let rendered = render_step(step, &lead, &config.seed.sender_name)?;
        println!("To: {}\nSubject: {}\n\n{}", args.to, rendered.subject, rendered.body);
        return Ok(());
    }

    let use_case = CampaignPreviewUseCase::new(Arc::new(HttpEmailClient::new()));
    let id = use_case
        .send(&config.email, step, &lead, &config.seed.sender_name, &args.to)
        .await?;
    println!("Sent preview of '{}' step {} ({})", campaign.campaign.name, step.step_number, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_args_parse() {
        let cli = Cli::try_parse_from([
            "mailsmith", "seed", "--backend", "memory", "--leads", "-3", "--rng-seed", "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Seed(args) => {
                assert!(matches!(args.backend, BackendArg::Memory));
                assert_eq!(args.leads, Some(-3));
                assert_eq!(args.rng_seed, Some(9));
            }
            _ => panic!("expected seed command"),
        }
    }

    #[test]
    fn test_non_integer_leads_rejected_by_parser() {
        assert!(Cli::try_parse_from(["mailsmith", "seed", "--leads", "2.5"]).is_err());
    }

    #[test]
    fn test_icebreaker_lines_split() {
        let cli = Cli::try_parse_from([
            "mailsmith",
            "icebreaker",
            "--first-name",
            "Ann",
            "--company",
            "Summit Risk Advisors",
            "--lines",
            "trucking,cyber liability",
        ])
        .unwrap();
        match cli.command {
            Commands::Icebreaker(args) => {
                assert_eq!(args.lines, vec!["trucking".to_string(), "cyber liability".to_string()])
            }
            _ => panic!("expected icebreaker command"),
        }
    }

    #[tokio::test]
    async fn test_memory_seed_succeeds() {
        let config = AppConfig::default();
        let args = SeedArgs {
            backend: BackendArg::Memory,
            leads: Some(12),
            events: Some(5),
            icebreaker_probability: None,
            rng_seed: Some(1),
            slug: None,
        };
        assert_eq!(seed(config, args).await, 0);
    }

    #[tokio::test]
    async fn test_rest_seed_without_credentials_is_config_exit() {
        let args = SeedArgs {
            backend: BackendArg::Rest,
            leads: None,
            events: None,
            icebreaker_probability: None,
            rng_seed: None,
            slug: None,
        };
        assert_eq!(seed(AppConfig::default(), args).await, 2);
    }

    #[tokio::test]
    async fn test_preview_rejects_unknown_step() {
        let args = PreviewArgs {
            to: "qa@example.com".to_string(),
            campaign: 1,
            step: 99,
            dry_run: true,
        };
        let err = preview(&AppConfig::default(), args).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
