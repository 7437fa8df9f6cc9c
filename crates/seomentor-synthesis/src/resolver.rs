use async_trait::async_trait;
use seomentor_core::{AnalysisContext, Competitor};

use crate::error::ResolveError;
use crate::validate::normalize_competitor_url;

/// Optional lookup of an official url for a named competitor.
#[async_trait]
pub trait CompetitorLinkResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the lookup itself fails. Callers log the
    /// error and leave the url absent.
    async fn resolve(
        &self,
        name: &str,
        ctx: &AnalysisContext,
    ) -> Result<Option<String>, ResolveError>;
}

/// Fill in missing competitor urls. Existing urls are never replaced.
pub async fn enrich_competitors(
    resolver: &dyn CompetitorLinkResolver,
    competitors: &mut [Competitor],
    ctx: &AnalysisContext,
) {
    for competitor in competitors.iter_mut().filter(|c| c.url.is_none()) {
        match resolver.resolve(&competitor.name, ctx).await {
            Ok(found) => {
                competitor.url = found.as_deref().and_then(normalize_competitor_url);
            }
            Err(e) => {
                tracing::warn!(competitor = %competitor.name, error = %e, "competitor link lookup failed");
            }
        }
    }
}
