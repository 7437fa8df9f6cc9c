use std::sync::Arc;

use seomentor_core::{AppConfig, DetailRecord, Project, RoadmapDay};

use crate::client::{GenerationRequest, TextGenerator};
use crate::error::{GenerateError, SynthesisError};
use crate::prompt::{build_detail_prompt, detail_retry_instruction, DETAIL_SYSTEM_PROMPT};
use crate::validate::validate_detail;

pub const DEFAULT_DETAIL_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_DETAIL_MAX_TOKENS: u32 = 900;

/// On-demand elaboration of one roadmap day.
pub struct DetailExpander {
    generator: Arc<dyn TextGenerator>,
    max_attempts: u32,
    max_tokens: u32,
}

impl DetailExpander {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_attempts: DEFAULT_DETAIL_MAX_ATTEMPTS,
            max_tokens: DEFAULT_DETAIL_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &AppConfig) -> Self {
        Self::new(generator)
            .with_max_attempts(config.detail_max_attempts)
            .with_max_tokens(config.llm_detail_max_tokens)
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Expand `entry`, which must belong to `project`'s roadmap.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`crate::SynthesisContract::synthesize`]. No record
    /// is ever produced from an invalid completion.
    pub async fn expand(
        &self,
        project: &Project,
        entry: &RoadmapDay,
    ) -> Result<DetailRecord, SynthesisError> {
        let base_prompt = build_detail_prompt(project, entry);
        let mut prompt = base_prompt.clone();
        let mut last_reason: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let request = GenerationRequest {
                system: DETAIL_SYSTEM_PROMPT.to_owned(),
                prompt: prompt.clone(),
                max_tokens: self.max_tokens,
            };
            let raw = match self.generator.generate(&request).await {
                Ok(raw) => raw,
                Err(GenerateError::Timeout) => {
                    tracing::warn!(project_id = project.id, day = entry.day, attempt, "detail attempt timed out");
                    continue;
                }
                Err(e) => return Err(SynthesisError::Generation(e)),
            };
            tracing::debug!(project_id = project.id, day = entry.day, attempt, raw = %raw, "detail raw response");

            match validate_detail(&raw, entry) {
                Ok(record) => {
                    tracing::info!(project_id = project.id, day = entry.day, attempt, "day detail generated");
                    return Ok(record);
                }
                Err(violation) => {
                    let reason = violation.to_string();
                    tracing::warn!(project_id = project.id, day = entry.day, attempt, reason = %reason, "detail response rejected");
                    prompt = format!("{base_prompt}{}", detail_retry_instruction(&reason));
                    last_reason = Some(reason);
                }
            }
        }

        match last_reason {
            Some(reason) => Err(SynthesisError::Exhausted {
                attempts: self.max_attempts,
                reason,
            }),
            None => Err(SynthesisError::TimedOut {
                attempts: self.max_attempts,
            }),
        }
    }
}
