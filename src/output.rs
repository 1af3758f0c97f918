//! Data model for the OCR-to-ingredients pipeline.
//!
//! Every type here lives for the duration of one request: created, merged,
//! serialised into the HTTP response, and discarded. Nothing is persisted.
//!
//! Types parsed from chat-completion responses ([`OcrAnalysis`],
//! [`SanityCheckResult`], [`SimplifiedDishName`], [`SuggestionResult`])
//! are deliberately tolerant: every field carries `#[serde(default)]` so an
//! unexpected or missing field degrades to empty/zero instead of failing the
//! whole call. Invariant enforcement (confidence clamping, suggestion caps)
//! happens in the client wrapper after parsing, not here.

use serde::{Deserialize, Serialize};

// ── OCR analysis (model output) ─────────────────────────────────────────────

/// Quality of the supplied OCR text as judged by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextQuality {
    Good,
    Fair,
    #[default]
    Poor,
}

/// One dish detected in the OCR text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mentioned_ingredients: Vec<String>,
    #[serde(default)]
    pub cooking_method: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// Result of the one-shot OCR-text analysis call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrAnalysis {
    #[serde(default)]
    pub dishes: Vec<DishCandidate>,
    #[serde(default)]
    pub overall_confidence: f64,
    #[serde(default)]
    pub text_quality: TextQuality,
}

// ── Recipe lookup ────────────────────────────────────────────────────────────

/// Outcome of a recipe-database lookup for one dish name.
///
/// `ingredients` is always lowercase, deduplicated, and sorted.
/// `confidence = min(1, recipe_count/3)` when found, else 0.0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeLookupResult {
    pub dish_name: String,
    pub ingredients: Vec<String>,
    pub found: bool,
    pub recipe_count: usize,
    pub confidence: f64,
}

// ── Model call contracts ─────────────────────────────────────────────────────

/// Simplified search string produced when a lookup came up empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplifiedDishName {
    #[serde(default)]
    pub alternative_name: Option<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Sanity-check verdict on recipe-database ingredients.
///
/// `verified_ingredients` is `Option` rather than defaulted: a response that
/// omits the field is treated as a failed call, which fails OPEN to the
/// unmodified input list (trust the database over doing nothing).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SanityCheckVerdict {
    #[serde(default)]
    pub verified_ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub removed_ingredients: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Resolved sanity-check result after applying the fail-open policy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SanityCheckResult {
    pub verified_ingredients: Vec<String>,
    pub removed_ingredients: Vec<String>,
    pub reasoning: String,
}

/// Additional ingredients the model believes are missing from the menu.
///
/// After wrapper post-processing: at most 8 entries, lowercase, none already
/// present in the seed list, confidence clamped to [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionResult {
    #[serde(default)]
    pub suggested_ingredients: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub confidence: f64,
}

// ── Per-dish aggregate ───────────────────────────────────────────────────────

/// Ingredient lists by provenance for one dish.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishIngredients {
    /// Ingredients the menu text itself mentioned.
    pub from_menu: Vec<String>,
    /// Raw recipe-database extraction (pre sanity check).
    pub from_recipe_db: Vec<String>,
    /// Recipe-database ingredients that survived the sanity check.
    pub verified_recipe_db: Vec<String>,
    /// Model-suggested additions.
    pub suggested: Vec<String>,
    /// Deduplicated, lowercase, sorted union of verified + menu + suggested.
    pub combined: Vec<String>,
}

/// Confidence and bookkeeping for one dish.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishMetadata {
    pub spoonacular_confidence: f64,
    pub ai_confidence: f64,
    pub recipes_found: usize,
    pub ai_reasoning: String,
    pub total_ingredients: usize,
    pub sanity_check_performed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-remote-API success flags for one dish.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishSources {
    pub spoonacular_success: bool,
    pub openai_success: bool,
}

/// Final per-dish record. Always well-formed, even for dishes where every
/// remote source failed (never null, never omitted).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishResult {
    pub dish_name: String,
    pub ingredients: DishIngredients,
    pub metadata: DishMetadata,
    pub sources: DishSources,
}

// ── Request aggregate ────────────────────────────────────────────────────────

/// Summary statistics over all dishes in one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total_dishes_processed: usize,
    pub spoonacular_success_rate: f64,
    pub openai_success_rate: f64,
    pub total_ingredients_found: usize,
    /// Rounded to one decimal place.
    pub average_ingredients_per_dish: f64,
}

/// Top-level result of processing one OCR text.
///
/// `success: false` with an empty dish list is the defined response for
/// "no dishes found"; it is not an error and is served with HTTP 200.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_dishes: usize,
    pub ocr_analysis: OcrAnalysis,
    pub dishes: Vec<DishResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_summary: Option<ProcessingSummary>,
}

impl ProcessingSummary {
    /// Compute the summary over a slice of dish results.
    pub fn compute(dishes: &[DishResult]) -> Self {
        let total = dishes.len();
        if total == 0 {
            return Self::default();
        }
        let spoonacular_ok = dishes
            .iter()
            .filter(|d| d.sources.spoonacular_success)
            .count();
        let openai_ok = dishes.iter().filter(|d| d.sources.openai_success).count();
        let total_ingredients: usize = dishes.iter().map(|d| d.metadata.total_ingredients).sum();
        let average = total_ingredients as f64 / total as f64;

        Self {
            total_dishes_processed: total,
            spoonacular_success_rate: spoonacular_ok as f64 / total as f64,
            openai_success_rate: openai_ok as f64 / total as f64,
            total_ingredients_found: total_ingredients,
            average_ingredients_per_dish: (average * 10.0).round() / 10.0,
        }
    }
}
