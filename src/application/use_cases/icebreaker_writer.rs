use crate::domain::error::{AppError, Result};
use crate::domain::lead::Lead;
use crate::domain::llm_config::LLMConfig;
use crate::domain::organization::Organization;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::clean_icebreaker;
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You write the first line of a cold email to an insurance agency. \
Write ONE friendly, specific sentence under 40 words that references the agency, its town or its lines of business. \
No greeting, no sign-off, no pitch, no quotation marks. Return only the sentence.";

/// Asks the configured model for one icebreaker line for a lead.
pub struct IcebreakerWriterUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl IcebreakerWriterUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    pub fn user_prompt(organization: &Organization, lead: &Lead) -> String {
        let mut prompt = format!(
            "Sender: {} (works with {}).\nRecipient: {} {}, {} at {}",
            organization.name,
            organization.market_focus,
            lead.first_name,
            lead.last_name,
            lead.title,
            lead.company_name
        );
        if !lead.city.is_empty() {
            prompt.push_str(&format!(" in {}, {}", lead.city, lead.state));
        }
        prompt.push('.');
        if !lead.lines_of_business.is_empty() {
            prompt.push_str(&format!(
                "\nLines of business: {}.",
                lead.lines_of_business.join(", ")
            ));
        }
        prompt
    }

    pub async fn execute(&self, config: &LLMConfig, organization: &Organization, lead: &Lead) -> Result<String> {
        let user_prompt = Self::user_prompt(organization, lead);
        debug!(company = %lead.company_name, "Requesting icebreaker");

        let raw = self
            .llm_client
            .generate(config, SYSTEM_PROMPT, &user_prompt)
            .await?;
        let icebreaker = clean_icebreaker(&raw);

        if icebreaker.is_empty() {
            warn!(company = %lead.company_name, "Model returned an empty icebreaker");
            return Err(AppError::LLMError("Model returned no usable icebreaker".to_string()));
        }
        Ok(icebreaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::generators::{build_organization, generate_leads};
    use crate::domain::seed_plan::SeedPlan;
    use async_trait::async_trait;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    struct CannedClient {
        answer: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LLMClient for CannedClient {
        async fn generate(&self, _config: &LLMConfig, _system: &str, user: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            Ok(self.answer.clone())
        }
    }

    fn fixtures() -> (Organization, Lead) {
        let mut rng = StdRng::seed_from_u64(21);
        let org = build_organization(&mut rng, &SeedPlan::default(), Utc::now());
        let lead = generate_leads(&mut rng, &org, 1, 0.0, Utc::now()).remove(0);
        (org, lead)
    }

    #[tokio::test]
    async fn test_response_is_cleaned() {
        let (org, lead) = fixtures();
        let client = Arc::new(CannedClient {
            answer: "<think>hmm</think>\"Congrats on the new office.\"".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let use_case = IcebreakerWriterUseCase::new(client.clone());
        let text = use_case.execute(&LLMConfig::default(), &org, &lead).await.unwrap();

        assert_eq!(text, "Congrats on the new office.");
        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains(&lead.company_name));
        assert!(prompts[0].contains(&org.market_focus));
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let (org, lead) = fixtures();
        let client = Arc::new(CannedClient {
            answer: "<think>nothing to say</think>".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let err = IcebreakerWriterUseCase::new(client)
            .execute(&LLMConfig::default(), &org, &lead)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LLMError(_)));
    }
}
