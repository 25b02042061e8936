//! Provisioning pipeline for demo tenants.
//!
//! Stages run strictly in order because each one needs ids captured by the
//! previous one: organization, leads, campaigns with sequences, customer
//! user, activity feed. A failing stage stops the run and reports what was
//! already written. Earlier stages are not rolled back.

use crate::application::use_cases::generators::{
    build_customer_user, build_organization, generate_activity, generate_campaigns, generate_leads,
    random_id,
};
use crate::domain::campaign::{Campaign, SequenceStep};
use crate::domain::customer_user::CustomerUser;
use crate::domain::error::{AppError, BackendFailure, BackendFailureKind, Result};
use crate::domain::seed_plan::{SeedCounts, SeedPlan};
use crate::domain::seed_summary::{SeedFailure, SeedStage, SeedSummary};
use crate::infrastructure::backend::{insert_batched, to_rows, BackendStore, Table};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub const CUSTOMER_ROLE: &str = "customer";

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub organization_id: Uuid,
    pub customer_user_id: Uuid,
    pub summary: SeedSummary,
}

pub struct SeedOrchestrator {
    store: Arc<dyn BackendStore>,
}

impl SeedOrchestrator {
    pub fn new(store: Arc<dyn BackendStore>) -> Self {
        Self { store }
    }

    pub async fn run<R: Rng + Send>(
        &self,
        plan: &SeedPlan,
        counts: SeedCounts,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> std::result::Result<SeedReport, SeedFailure> {
        let mut summary = SeedSummary::default();
        let store = self.store.as_ref();
        let batch_size = counts.batch_size;
        info!(backend = store.label(), leads = counts.leads, "Seeding started");

        // Organization
        let mut organization = build_organization(rng, plan, now);
        let organization_id = stage(SeedStage::Organization, &summary, async {
            let rows = to_rows(Table::Organizations, std::slice::from_ref(&organization))?;
            let ids = store.insert_rows(Table::Organizations, &rows).await?;
            single_id(Table::Organizations, ids)
        })
        .await?;
        organization.id = organization_id;
        summary.organizations = 1;
        info!(stage = %SeedStage::Organization, organization_id = %organization_id, slug = %organization.slug, "Stage complete");

        // Leads
        let mut leads = generate_leads(rng, &organization, counts.leads, plan.icebreaker_probability, now);
        let lead_result = async {
            let rows = to_rows(Table::Leads, &leads)?;
            insert_batched(store, Table::Leads, &rows, batch_size, &mut summary.leads).await
        }
        .await;
        summary.leads_with_icebreakers = leads
            .iter()
            .take(summary.leads)
            .filter(|lead| lead.has_icebreaker())
            .count();
        let lead_ids = lead_result.map_err(|cause| failure(SeedStage::Leads, &summary, cause))?;
        for (lead, id) in leads.iter_mut().zip(lead_ids) {
            lead.id = id;
        }
        info!(
            stage = %SeedStage::Leads,
            count = summary.leads,
            with_icebreakers = summary.leads_with_icebreakers,
            "Stage complete"
        );

        // Campaigns and their sequences
        let generated = generate_campaigns(rng, &organization, now);
        let mut campaigns: Vec<Campaign> = generated.iter().map(|c| c.campaign.clone()).collect();
        let campaign_result = async {
            let rows = to_rows(Table::Campaigns, &campaigns)?;
            let ids = insert_batched(store, Table::Campaigns, &rows, batch_size, &mut summary.campaigns).await?;

            let mut steps: Vec<SequenceStep> = Vec::new();
            for ((campaign, generated), id) in campaigns.iter_mut().zip(&generated).zip(ids) {
                campaign.id = id;
                steps.extend(generated.steps.iter().cloned().map(|mut step| {
                    step.campaign_id = id;
                    step
                }));
            }

            let rows = to_rows(Table::CampaignSequences, &steps)?;
            insert_batched(store, Table::CampaignSequences, &rows, batch_size, &mut summary.sequence_steps)
                .await
        }
        .await;
        campaign_result.map_err(|cause| failure(SeedStage::Campaigns, &summary, cause))?;
        info!(
            stage = %SeedStage::Campaigns,
            count = summary.campaigns,
            steps = summary.sequence_steps,
            "Stage complete"
        );

        // Customer user
        let new_user = build_customer_user(plan, organization_id);
        let link_id = random_id(rng);
        let customer_user_id = stage(SeedStage::CustomerUser, &summary, async {
            let user_id = store.create_auth_user(&new_user).await?;
            let link = CustomerUser {
                id: link_id,
                user_id,
                organization_id,
                email: new_user.email.clone(),
                full_name: new_user.full_name.clone(),
                role: CUSTOMER_ROLE.to_string(),
            };
            let rows = to_rows(Table::CustomerUsers, std::slice::from_ref(&link))?;
            let link_ids = store.insert_rows(Table::CustomerUsers, &rows).await?;
            single_id(Table::CustomerUsers, link_ids)?;
            Ok(user_id)
        })
        .await?;
        summary.customer_users = 1;
        info!(stage = %SeedStage::CustomerUser, user_id = %customer_user_id, email = %new_user.email, "Stage complete");

        // Activity feed
        let events = generate_activity(
            rng,
            organization_id,
            &leads,
            &campaigns,
            counts.activity_events,
            counts.activity_window_days,
            now,
        );
        let activity_result = async {
            let rows = to_rows(Table::ActivityEvents, &events)?;
            insert_batched(store, Table::ActivityEvents, &rows, batch_size, &mut summary.activity_events).await
        }
        .await;
        activity_result.map_err(|cause| failure(SeedStage::ActivityFeed, &summary, cause))?;
        info!(stage = %SeedStage::ActivityFeed, count = summary.activity_events, "Stage complete");

        Ok(SeedReport {
            organization_id,
            customer_user_id,
            summary,
        })
    }
}

async fn stage<T>(
    stage: SeedStage,
    summary: &SeedSummary,
    work: impl std::future::Future<Output = Result<T>>,
) -> std::result::Result<T, SeedFailure> {
    work.await.map_err(|cause| failure(stage, summary, cause))
}

fn failure(stage: SeedStage, summary: &SeedSummary, cause: AppError) -> SeedFailure {
    error!(stage = %stage, error = %cause, "Seeding stage failed");
    SeedFailure {
        stage,
        completed: summary.clone(),
        cause,
    }
}

fn single_id(table: Table, ids: Vec<Uuid>) -> Result<Uuid> {
    match ids.as_slice() {
        [id] => Ok(*id),
        _ => Err(AppError::Backend(BackendFailure::new(
            table.name(),
            BackendFailureKind::Rejected,
            format!("expected one acknowledged id, got {}", ids.len()),
        ))),
    }
}
