use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{GenerationRequest, TextGenerator};
use crate::error::GenerateError;

pub(crate) enum Reply {
    Text(String),
    Timeout,
    Fatal,
}

/// Replays scripted replies in order and records every request. The last
/// reply repeats once the script runs out.
pub(crate) struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    pub(crate) requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn prompt(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index].prompt.clone()
    }
}

fn replay(reply: &Reply) -> Result<String, GenerateError> {
    match reply {
        Reply::Text(text) => Ok(text.clone()),
        Reply::Timeout => Err(GenerateError::Timeout),
        Reply::Fatal => Err(GenerateError::Fatal {
            status: Some(401),
            message: "invalid x-api-key".to_owned(),
        }),
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.as_ref().map_or(Err(GenerateError::Timeout), replay)
    }
}

pub(crate) fn analysis_json(plan_days: u32) -> Value {
    json!({
        "seo_score": 64,
        "issues": ["Short title", "No meta description", "Few H2s", "Images missing alt"],
        "competitors": [
            {"name": "Flora", "reason": "Same-day delivery", "url": "https://flora.az"},
            {"name": "Gul Evi", "reason": "Ranks for roses"},
            {"name": "Bloom", "reason": "Catalog overlap", "url": "bloom.az"},
            {"name": "Rose Box", "reason": "Premium boxes", "url": "rosebox.az"},
            {"name": "Petal", "reason": "Corporate gifts", "url": "petal.az"}
        ],
        "keyword_gaps": ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
        "roadmap": (1..=plan_days)
            .map(|d| json!({"day": d, "task": format!("Optimize /page-{d}, KPI +{d}%")}))
            .collect::<Vec<_>>()
    })
}

pub(crate) fn analysis_text(plan_days: u32) -> Reply {
    Reply::Text(analysis_json(plan_days).to_string())
}
