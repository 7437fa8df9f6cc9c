//! Strict-contract synthesis over a generative text service.

pub mod client;
pub mod contract;
pub mod detail;
pub mod error;
pub mod prompt;
pub mod recover;
pub mod resolver;
mod retry;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use client::{AnthropicClient, GenerationRequest, TextGenerator};
pub use contract::SynthesisContract;
pub use detail::DetailExpander;
pub use error::{GenerateError, ResolveError, SynthesisError};
pub use recover::recover_json;
pub use resolver::{enrich_competitors, CompetitorLinkResolver};
pub use validate::{validate_analysis, validate_detail, Violation};
