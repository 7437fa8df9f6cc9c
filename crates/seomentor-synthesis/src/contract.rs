//! The strict-contract analysis synthesis step.
//!
//! One call to [`SynthesisContract::synthesize`] is a bounded loop: each
//! attempt sends one prompt, validates the completion, and either returns,
//! amends the prompt for the next attempt, or gives up. Nothing is ever
//! substituted for a hard violation.

use std::sync::Arc;

use seomentor_core::{AnalysisArtifact, AnalysisContext, AppConfig, PageSignals};

use crate::client::{GenerationRequest, TextGenerator};
use crate::error::{GenerateError, SynthesisError};
use crate::prompt::{
    build_analysis_prompt, quality_retry_instruction, shape_retry_instruction,
    ANALYSIS_SYSTEM_PROMPT,
};
use crate::recover::looks_truncated;
use crate::resolver::{enrich_competitors, CompetitorLinkResolver};
use crate::validate::{validate_analysis, Violation};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_TOKENS: u32 = 3200;

pub struct SynthesisContract {
    generator: Arc<dyn TextGenerator>,
    resolver: Option<Arc<dyn CompetitorLinkResolver>>,
    max_attempts: u32,
    max_tokens: u32,
}

impl SynthesisContract {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            resolver: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &AppConfig) -> Self {
        Self::new(generator)
            .with_max_attempts(config.synthesis_max_attempts)
            .with_max_tokens(config.llm_max_tokens)
    }

    /// Total attempts, first call included. Clamped to at least 1.
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

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn CompetitorLinkResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Produce a validated artifact for one page.
    ///
    /// # Errors
    ///
    /// - [`SynthesisError::TimedOut`] when every attempt timed out.
    /// - [`SynthesisError::Exhausted`] when attempts ran out on violations.
    /// - [`SynthesisError::Generation`] on a non-retryable generation failure.
    pub async fn synthesize(
        &self,
        signals: &PageSignals,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisArtifact, SynthesisError> {
        let plan_days = ctx.plan_days;
        let base_prompt = build_analysis_prompt(signals, ctx);
        let mut prompt = base_prompt.clone();
        let mut degraded: Option<(usize, AnalysisArtifact)> = None;
        let mut last_reason: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let request = GenerationRequest {
                system: ANALYSIS_SYSTEM_PROMPT.to_owned(),
                prompt: prompt.clone(),
                max_tokens: self.max_tokens,
            };

            let raw = match self.generator.generate(&request).await {
                Ok(raw) => raw,
                Err(GenerateError::Timeout) => {
                    tracing::warn!(attempt, max_attempts = self.max_attempts, "synthesis attempt timed out");
                    continue;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "synthesis generation failed");
                    return Err(SynthesisError::Generation(e));
                }
            };
            tracing::debug!(attempt, raw = %raw, "synthesis raw response");

            match validate_analysis(&raw, plan_days) {
                Ok(mut artifact) => {
                    tracing::info!(attempt, plan_days, score = artifact.seo_score, "synthesis succeeded");
                    self.enrich(&mut artifact, ctx).await;
                    return Ok(artifact);
                }
                Err(Violation::LowQuality {
                    artifact,
                    shortfalls,
                    reason,
                }) => {
                    tracing::warn!(attempt, shortfalls, reason = %reason, "synthesis result below quality floor");
                    if degraded.as_ref().is_none_or(|(best, _)| shortfalls < *best) {
                        degraded = Some((shortfalls, *artifact));
                    }
                    prompt = format!(
                        "{base_prompt}{}",
                        quality_retry_instruction(plan_days, &reason)
                    );
                }
                Err(violation) => {
                    let reason = violation.to_string();
                    tracing::warn!(attempt, reason = %reason, "synthesis response violated schema");
                    prompt = format!(
                        "{base_prompt}{}",
                        shape_retry_instruction(plan_days, &reason, looks_truncated(&raw))
                    );
                    last_reason = Some(reason);
                }
            }
        }

        if let Some((shortfalls, mut artifact)) = degraded {
            tracing::warn!(shortfalls, "returning best degraded synthesis result");
            self.enrich(&mut artifact, ctx).await;
            return Ok(artifact);
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

    async fn enrich(&self, artifact: &mut AnalysisArtifact, ctx: &AnalysisContext) {
        if let Some(resolver) = &self.resolver {
            enrich_competitors(resolver.as_ref(), &mut artifact.competitors, ctx).await;
        }
    }
}

#[cfg(test)]
#[path = "contract_test.rs"]
mod tests;
