//! Chat-completion client: the model side of the reconciliation.
//!
//! Split in two layers, mirroring [`crate::pipeline::recipes`]:
//!
//! * [`ChatApi`]: the raw transport seam. One method, one completion:
//!   a system/user message pair in, the assistant's JSON content string out.
//!   [`OpenAiChat`] is the production implementation; tests substitute a
//!   double returning fixed JSON fixtures.
//!
//! * [`SuggestionClient`]: four operation contracts, each a fixed prompt
//!   from [`crate::prompts`] paired with a tolerant parser. Every transport
//!   or parse failure is contained here behind a typed default result and a
//!   log line carrying the stable operation code. Three operations fail
//!   closed (empty/zero); the sanity check fails OPEN, returning the input
//!   ingredients unchanged; unverified data beats none at all.

use crate::error::ApiError;
use crate::output::{
    OcrAnalysis, SanityCheckResult, SanityCheckVerdict, SimplifiedDishName, SuggestionResult,
    TextQuality,
};
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Hard cap on suggested ingredients per dish.
const MAX_SUGGESTIONS: usize = 8;

// Stable operation codes used in error logs.
const OP_ANALYZE: &str = "analyze_ocr_text";
const OP_SIMPLIFY: &str = "simplify_dish_name";
const OP_SANITY: &str = "sanity_check_ingredients";
const OP_SUGGEST: &str = "suggest_missing_ingredients";

// ── Transport seam ───────────────────────────────────────────────────────────

/// One chat-completion request. The response is always requested as a single
/// JSON object (`response_format: json_object`).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Raw access to the chat-completion API.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// Run one completion and return the assistant message content.
    async fn complete(&self, request: ChatRequest) -> Result<String, ApiError>;
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct WireCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    response_format: WireResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireCompletionResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct WireAssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Production [`ChatApi`] over the OpenAI chat-completions HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    /// Construct with a fixed per-call timeout. An empty key is allowed: the
    /// remote will reject calls and the wrapper layer falls back to defaults.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, model, timeout_secs, OPENAI_BASE_URL)
    }

    /// Same as [`OpenAiChat::new`] with an overridable base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl ChatApi for OpenAiChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, ApiError> {
        let body = WireCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: WireResponseFormat {
                kind: "json_object",
            },
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: WireCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ApiError::EmptyResponse)
    }
}

// ── Operation contracts ──────────────────────────────────────────────────────

/// Suggestion-call outcome: the (possibly defaulted) result plus whether the
/// remote call actually succeeded, surfaced as `sources.openai_success`.
#[derive(Debug, Clone)]
pub struct SuggestionOutcome {
    pub result: SuggestionResult,
    pub succeeded: bool,
}

/// Model-suggestion client: four prompt contracts over a [`ChatApi`].
#[derive(Clone)]
pub struct SuggestionClient {
    api: Arc<dyn ChatApi>,
}

impl SuggestionClient {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self { api }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        op: &'static str,
        request: ChatRequest,
    ) -> Option<T> {
        let raw = match self.api.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(op, error = %e, "model call failed");
                return None;
            }
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                error!(op, error = %e, "model returned unparseable JSON");
                None
            }
        }
    }

    /// Extract all dish candidates from unstructured OCR text in one call.
    ///
    /// Fail-closed: zero dishes, zero confidence, poor quality.
    pub async fn analyze_ocr_text(&self, ocr_text: &str) -> OcrAnalysis {
        debug!("analyzing OCR text with the model");
        let request = ChatRequest {
            system: prompts::ANALYZE_OCR_SYSTEM.to_string(),
            user: prompts::analyze_ocr_prompt(ocr_text),
            temperature: 0.2,
            max_tokens: 1000,
        };

        let Some(mut analysis) = self.call::<OcrAnalysis>(OP_ANALYZE, request).await else {
            return OcrAnalysis {
                dishes: Vec::new(),
                overall_confidence: 0.0,
                text_quality: TextQuality::Poor,
            };
        };

        analysis.overall_confidence = analysis.overall_confidence.clamp(0.0, 1.0);
        for dish in &mut analysis.dishes {
            dish.confidence = dish.confidence.clamp(0.0, 1.0);
        }
        info!(dishes = analysis.dishes.len(), "OCR analysis complete");
        analysis
    }

    /// Produce a simpler search string for the lookup retry.
    ///
    /// Fail-closed: no alternative. An empty or whitespace alternative from
    /// the model is treated as none.
    pub async fn simplify_dish_name(&self, dish_name: &str) -> SimplifiedDishName {
        let request = ChatRequest {
            system: prompts::SIMPLIFY_DISH_SYSTEM.to_string(),
            user: prompts::simplify_dish_prompt(dish_name),
            temperature: 0.2,
            max_tokens: 500,
        };

        let Some(mut simplified) = self.call::<SimplifiedDishName>(OP_SIMPLIFY, request).await
        else {
            return SimplifiedDishName::default();
        };

        simplified.alternative_name = simplified
            .alternative_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        simplified
    }

    /// Filter implausible recipe-database ingredients.
    ///
    /// Fail-OPEN: when the call or parse fails, or the reply omits the
    /// verified list, the input is returned unchanged. Trusting unverified
    /// database ingredients beats discarding them.
    pub async fn sanity_check_ingredients(
        &self,
        dish_name: &str,
        ingredients: &[String],
    ) -> SanityCheckResult {
        let request = ChatRequest {
            system: prompts::SANITY_CHECK_SYSTEM.to_string(),
            user: prompts::sanity_check_prompt(dish_name, ingredients),
            temperature: 0.2,
            max_tokens: 800,
        };

        let verdict = self.call::<SanityCheckVerdict>(OP_SANITY, request).await;
        match verdict.and_then(|v| {
            v.verified_ingredients.map(|verified| SanityCheckResult {
                verified_ingredients: verified,
                removed_ingredients: v.removed_ingredients,
                reasoning: v.reasoning,
            })
        }) {
            Some(result) => {
                info!(
                    dish = dish_name,
                    verified = result.verified_ingredients.len(),
                    removed = result.removed_ingredients.len(),
                    "sanity check complete"
                );
                result
            }
            None => SanityCheckResult {
                verified_ingredients: ingredients.to_vec(),
                removed_ingredients: Vec::new(),
                reasoning: "sanity check unavailable; database ingredients kept".to_string(),
            },
        }
    }

    /// Propose up to 8 additional ingredients not already in the seed list.
    ///
    /// Fail-closed: empty suggestions, zero confidence. The parser lowercases
    /// and trims entries, drops anything already in `verified ∪ mentioned`,
    /// truncates to 8, and clamps confidence to [0, 1].
    pub async fn suggest_missing_ingredients(
        &self,
        dish_name: &str,
        verified: &[String],
        mentioned: &[String],
        ocr_text: &str,
    ) -> SuggestionOutcome {
        let request = ChatRequest {
            system: prompts::SUGGEST_MISSING_SYSTEM.to_string(),
            user: prompts::suggest_missing_prompt(dish_name, verified, mentioned, ocr_text),
            temperature: 0.3,
            max_tokens: 1000,
        };

        let Some(mut result) = self.call::<SuggestionResult>(OP_SUGGEST, request).await else {
            return SuggestionOutcome {
                result: SuggestionResult::default(),
                succeeded: false,
            };
        };

        let seed: HashSet<String> = verified
            .iter()
            .chain(mentioned.iter())
            .map(|s| s.trim().to_lowercase())
            .collect();

        let mut seen = HashSet::new();
        result.suggested_ingredients = result
            .suggested_ingredients
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty() && !seed.contains(s) && seen.insert(s.clone()))
            .take(MAX_SUGGESTIONS)
            .collect();
        result.confidence = result.confidence.clamp(0.0, 1.0);

        info!(
            dish = dish_name,
            suggested = result.suggested_ingredients.len(),
            "suggestion call complete"
        );
        SuggestionOutcome {
            result,
            succeeded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Double that answers every completion with one fixed payload.
    struct FixedChat {
        payload: Result<String, ()>,
    }

    #[async_trait::async_trait]
    impl ChatApi for FixedChat {
        async fn complete(&self, _request: ChatRequest) -> Result<String, ApiError> {
            self.payload
                .clone()
                .map_err(|_| ApiError::Transport {
                    detail: "connection refused".into(),
                })
        }
    }

    fn client(payload: Result<&str, ()>) -> SuggestionClient {
        SuggestionClient::new(Arc::new(FixedChat {
            payload: payload.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn analyze_clamps_out_of_range_confidences() {
        let c = client(Ok(
            r#"{"dishes":[{"name":"Ramen","confidence":1.7}],"overall_confidence":-0.2,"text_quality":"fair"}"#,
        ));
        let a = c.analyze_ocr_text("ramen").await;
        assert_eq!(a.overall_confidence, 0.0);
        assert_eq!(a.dishes[0].confidence, 1.0);
        assert_eq!(a.text_quality, TextQuality::Fair);
    }

    #[tokio::test]
    async fn analyze_fails_closed_on_transport_error() {
        let c = client(Err(()));
        let a = c.analyze_ocr_text("ramen").await;
        assert!(a.dishes.is_empty());
        assert_eq!(a.overall_confidence, 0.0);
        assert_eq!(a.text_quality, TextQuality::Poor);
    }

    #[tokio::test]
    async fn analyze_fails_closed_on_unparseable_json() {
        let c = client(Ok("not json at all"));
        let a = c.analyze_ocr_text("ramen").await;
        assert!(a.dishes.is_empty());
    }

    #[tokio::test]
    async fn simplify_discards_blank_alternative() {
        let c = client(Ok(r#"{"alternative_name":"   ","reasoning":"r"}"#));
        let s = c.simplify_dish_name("Fancy Stew").await;
        assert!(s.alternative_name.is_none());
    }

    #[tokio::test]
    async fn sanity_check_fails_open_on_error() {
        let c = client(Err(()));
        let input = vec!["flour".to_string(), "egg".to_string()];
        let r = c.sanity_check_ingredients("pasta", &input).await;
        assert_eq!(r.verified_ingredients, input);
        assert!(r.removed_ingredients.is_empty());
    }

    #[tokio::test]
    async fn sanity_check_fails_open_when_verified_field_missing() {
        let c = client(Ok(r#"{"removed_ingredients":[],"reasoning":"?"}"#));
        let input = vec!["flour".to_string()];
        let r = c.sanity_check_ingredients("pasta", &input).await;
        assert_eq!(r.verified_ingredients, input);
    }

    #[tokio::test]
    async fn sanity_check_applies_model_verdict() {
        let c = client(Ok(
            r#"{"verified_ingredients":["flour"],"removed_ingredients":["motor oil"],"reasoning":"not food"}"#,
        ));
        let input = vec!["flour".to_string(), "motor oil".to_string()];
        let r = c.sanity_check_ingredients("pasta", &input).await;
        assert_eq!(r.verified_ingredients, vec!["flour"]);
        assert_eq!(r.removed_ingredients, vec!["motor oil"]);
    }

    #[tokio::test]
    async fn suggest_caps_at_eight_and_excludes_seed() {
        let payload = r#"{"suggested_ingredients":
            ["Salt","salt","pepper","garlic","onion","butter","oil","cream","thyme","bay leaf"],
            "reasoning":"r","confidence":2.5}"#;
        let c = client(Ok(payload));
        let verified = vec!["garlic".to_string()];
        let mentioned = vec!["Onion".to_string()];
        let o = c
            .suggest_missing_ingredients("soup", &verified, &mentioned, "soup")
            .await;
        assert!(o.succeeded);
        let s = &o.result.suggested_ingredients;
        assert!(s.len() <= 8, "got {} suggestions", s.len());
        assert!(!s.contains(&"garlic".to_string()));
        assert!(!s.contains(&"onion".to_string()));
        // Case-insensitive internal dedup.
        assert_eq!(s.iter().filter(|x| *x == "salt").count(), 1);
        assert_eq!(o.result.confidence, 1.0);
    }

    #[tokio::test]
    async fn suggest_fails_closed() {
        let c = client(Err(()));
        let o = c.suggest_missing_ingredients("soup", &[], &[], "").await;
        assert!(!o.succeeded);
        assert!(o.result.suggested_ingredients.is_empty());
        assert_eq!(o.result.confidence, 0.0);
    }
}
