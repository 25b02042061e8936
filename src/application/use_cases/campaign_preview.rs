//! Renders a sequence step for one lead and hands it to the email API.

use crate::domain::campaign::SequenceStep;
use crate::domain::email::{EmailConfig, EmailMessage};
use crate::domain::error::{AppError, Result};
use crate::domain::lead::Lead;
use crate::infrastructure::email::EmailSender;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

static MERGE_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("merge tag pattern is valid"));

static BLANK_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub subject: String,
    pub body: String,
}

fn merge_value<'a>(tag: &str, lead: &'a Lead, sender_name: &'a str) -> Option<&'a str> {
    match tag {
        "first_name" => Some(lead.first_name.as_str()),
        "last_name" => Some(lead.last_name.as_str()),
        "company" => Some(lead.company_name.as_str()),
        "city" => Some(lead.city.as_str()),
        "icebreaker" => lead.icebreaker.as_deref().filter(|text| !text.trim().is_empty()),
        "sender_name" => Some(sender_name),
        _ => None,
    }
}

fn render_text(template: &str, lead: &Lead, sender_name: &str) -> Result<String> {
    if let Some(unknown) = MERGE_TAG_PATTERN
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|tag| tag != "icebreaker" && merge_value(tag, lead, sender_name).is_none())
    {
        return Err(AppError::ValidationError(format!(
            "Unknown merge tag '{{{{{}}}}}'",
            unknown
        )));
    }

    // A line that only carried a missing icebreaker disappears entirely.
    let kept: Vec<&str> = template
        .lines()
        .filter(|line| {
            let only_icebreaker = MERGE_TAG_PATTERN
                .captures(line.trim())
                .map(|caps| &caps[0] == line.trim() && &caps[1] == "icebreaker")
                .unwrap_or(false);
            !(only_icebreaker && merge_value("icebreaker", lead, sender_name).is_none())
        })
        .collect();

    let joined = kept.join("\n");
    let rendered = MERGE_TAG_PATTERN.replace_all(&joined, |caps: &regex::Captures| {
        merge_value(&caps[1], lead, sender_name)
            .unwrap_or_default()
            .to_string()
    });
    Ok(BLANK_RUN_PATTERN.replace_all(&rendered, "\n\n").trim().to_string())
}

pub fn render_step(step: &SequenceStep, lead: &Lead, sender_name: &str) -> Result<RenderedStep> {
    Ok(RenderedStep {
        subject: render_text(&step.subject, lead, sender_name)?,
        body: render_text(&step.body, lead, sender_name)?,
    })
}

pub struct CampaignPreviewUseCase {
    sender: Arc<dyn EmailSender + Send + Sync>,
}

impl CampaignPreviewUseCase {
    pub fn new(sender: Arc<dyn EmailSender + Send + Sync>) -> Self {
        Self { sender }
    }

    pub async fn send(
        &self,
        config: &EmailConfig,
        step: &SequenceStep,
        lead: &Lead,
        sender_name: &str,
        to: &str,
    ) -> Result<String> {
        let rendered = render_step(step, lead, sender_name)?;
        let message = EmailMessage {
            from: config.from_address.clone(),
            to: vec![to.to_string()],
            subject: rendered.subject,
            text: rendered.body,
        };
        let id = self.sender.send(config, &message).await?;
        info!(message_id = %id, step = step.step_number, to = %to, "Preview sent");
        Ok(id)
    }
}
