//! The per-request orchestrator: drives the per-dish state machine and
//! aggregates summary statistics.
//!
//! ## Per-dish sequence
//!
//! Strictly sequential, no branching back except the one defined retry:
//!
//! 1. **Lookup**: recipe-database search by dish name
//! 2. **Retry-on-miss**: on `found = false`, ask the model for a simplified
//!    name and repeat the lookup once; no further retries either way
//! 3. **Sanity check**: only when the lookup found recipes; otherwise the
//!    verified list is empty
//! 4. **Suggest**: always runs, seeded with verified ∪ mentioned
//! 5. **Merge**: deduplicated, lowercase, sorted union of
//!    verified ∪ mentioned ∪ suggested
//! 6. **Aggregate**: assemble the `DishResult`
//!
//! ## Per-dish isolation
//!
//! Each dish runs inside its own task; a panic in any stage is caught at the
//! dish boundary and converted into a degraded `DishResult` carrying only the
//! menu-mentioned ingredients, with the error recorded in `metadata.error`.
//! The remaining dishes continue unaffected.
//!
//! Dishes within one request are awaited one at a time, never fanned out
//! concurrently. This bounds remote-API load at the cost of per-request
//! latency scaling linearly with dish count.

use crate::config::ServiceConfig;
use crate::error::DishError;
use crate::output::{DishIngredients, DishMetadata, DishResult, DishSources, ProcessOutput, ProcessingSummary};
use crate::pipeline::llm::{OpenAiChat, SuggestionClient};
use crate::pipeline::recipes::{RecipeLookup, SpoonacularApi};
use crate::pipeline::{merge, normalize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The two remote-API clients, constructed once at startup and shared across
/// requests. Cheap to clone: both wrap `Arc`'d transports.
#[derive(Clone)]
pub struct Clients {
    pub recipes: RecipeLookup,
    pub suggestions: SuggestionClient,
}

impl Clients {
    /// Build the production clients from configuration.
    ///
    /// A missing API key constructs the client with an empty key: its calls
    /// are rejected by the remote and contained by the wrapper layers, so the
    /// service still starts and degrades per call rather than refusing to
    /// boot.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let spoonacular = SpoonacularApi::new(
            config.spoonacular_api_key.clone().unwrap_or_default(),
            config.api_timeout_secs,
        );
        let chat = OpenAiChat::new(
            config.openai_api_key.clone().unwrap_or_default(),
            config.model.clone(),
            config.api_timeout_secs,
        );
        Self {
            recipes: RecipeLookup::new(Arc::new(spoonacular), config.search_results),
            suggestions: SuggestionClient::new(Arc::new(chat)),
        }
    }
}

/// Process one OCR text through the entire pipeline.
///
/// Infallible by design: every remote failure is contained below this
/// function, and a per-dish panic degrades only that dish. "No dishes found"
/// is a defined `success: false` output, not an error.
pub async fn process_ocr_text(clients: &Clients, ocr_text: &str) -> ProcessOutput {
    info!("starting OCR text processing");

    // Deterministic cleanup before the model sees the text; line structure
    // is preserved so the menu still reads one item per line.
    let cleaned = normalize::clean_text(ocr_text);
    debug!(chars = cleaned.len(), "cleaned OCR text");

    let analysis = clients.suggestions.analyze_ocr_text(&cleaned).await;

    if analysis.dishes.is_empty() {
        warn!("no dishes found in OCR text");
        return ProcessOutput {
            success: false,
            message: Some("No dishes could be identified in the OCR text".to_string()),
            total_dishes: 0,
            ocr_analysis: analysis,
            dishes: Vec::new(),
            processing_summary: None,
        };
    }

    let mut dishes = Vec::with_capacity(analysis.dishes.len());
    for candidate in &analysis.dishes {
        let dish_name = candidate.name.trim().to_string();
        if dish_name.is_empty() {
            warn!("skipping dish candidate with empty name");
            continue;
        }

        info!(dish = %dish_name, "processing dish");
        let task_clients = clients.clone();
        let mentioned = candidate.mentioned_ingredients.clone();
        let text = cleaned.clone();
        let name = dish_name.clone();

        // Task-per-dish so a panic in any stage degrades only this dish.
        let result = tokio::spawn(async move {
            process_single_dish(&task_clients, &name, &mentioned, &text).await
        })
        .await;

        dishes.push(match result {
            Ok(dish) => dish,
            Err(join_err) => {
                let error = DishError::Failed {
                    dish: dish_name.clone(),
                    detail: join_err.to_string(),
                };
                warn!(dish = %dish_name, error = %error, "dish processing aborted");
                degraded_dish_result(&dish_name, &candidate.mentioned_ingredients, &error)
            }
        });
    }

    let summary = ProcessingSummary::compute(&dishes);
    info!(
        dishes = dishes.len(),
        total_ingredients = summary.total_ingredients_found,
        "OCR processing complete"
    );

    ProcessOutput {
        success: true,
        message: None,
        total_dishes: dishes.len(),
        ocr_analysis: analysis,
        dishes,
        processing_summary: Some(summary),
    }
}

/// Run one dish through lookup → retry → sanity check → suggest → merge.
async fn process_single_dish(
    clients: &Clients,
    dish_name: &str,
    mentioned: &[String],
    ocr_text: &str,
) -> DishResult {
    // Step 1: recipe-database lookup.
    let mut lookup = clients.recipes.find_ingredients_for_dish(dish_name).await;

    // Step 2: one retry with a simplified name.
    if !lookup.found {
        let simplified = clients.suggestions.simplify_dish_name(dish_name).await;
        if let Some(alternative) = simplified.alternative_name {
            info!(dish = dish_name, alternative = %alternative, "retrying lookup with simplified name");
            lookup = clients.recipes.find_ingredients_for_dish(&alternative).await;
        }
    }

    // Step 3: sanity check, only when the lookup produced recipes.
    let sanity = if lookup.found {
        Some(
            clients
                .suggestions
                .sanity_check_ingredients(dish_name, &lookup.ingredients)
                .await,
        )
    } else {
        None
    };
    let verified: Vec<String> = sanity
        .map(|s| s.verified_ingredients)
        .unwrap_or_default();

    // Step 4: suggestions, seeded with verified ∪ mentioned.
    let suggestion = clients
        .suggestions
        .suggest_missing_ingredients(dish_name, &verified, mentioned, ocr_text)
        .await;

    // Step 5: merge into the combined list.
    let combined = merge::merge(&[
        &verified,
        mentioned,
        &suggestion.result.suggested_ingredients,
    ]);

    // Step 6: assemble.
    DishResult {
        dish_name: dish_name.to_string(),
        ingredients: DishIngredients {
            from_menu: merge::normalize_list(mentioned),
            from_recipe_db: lookup.ingredients,
            verified_recipe_db: merge::normalize_list(&verified),
            suggested: suggestion.result.suggested_ingredients,
            combined: combined.clone(),
        },
        metadata: DishMetadata {
            spoonacular_confidence: lookup.confidence,
            ai_confidence: suggestion.result.confidence,
            recipes_found: lookup.recipe_count,
            ai_reasoning: suggestion.result.reasoning,
            total_ingredients: combined.len(),
            sanity_check_performed: lookup.found,
            error: None,
        },
        sources: DishSources {
            spoonacular_success: lookup.found,
            openai_success: suggestion.succeeded,
        },
    }
}

/// Build the degraded result for a dish whose pipeline aborted: only the
/// menu-mentioned ingredients survive, and the error is recorded.
fn degraded_dish_result(dish_name: &str, mentioned: &[String], error: &DishError) -> DishResult {
    let combined = merge::normalize_list(mentioned);
    DishResult {
        dish_name: dish_name.to_string(),
        ingredients: DishIngredients {
            from_menu: combined.clone(),
            from_recipe_db: Vec::new(),
            verified_recipe_db: Vec::new(),
            suggested: Vec::new(),
            combined: combined.clone(),
        },
        metadata: DishMetadata {
            total_ingredients: combined.len(),
            error: Some(error.to_string()),
            ..Default::default()
        },
        sources: DishSources {
            spoonacular_success: false,
            openai_success: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_result_keeps_mentioned_ingredients() {
        let error = DishError::Failed {
            dish: "Bibimbap".into(),
            detail: "panicked".into(),
        };
        let mentioned = vec!["Rice".to_string(), "egg".to_string(), "rice".to_string()];
        let d = degraded_dish_result("Bibimbap", &mentioned, &error);

        assert_eq!(d.ingredients.combined, vec!["egg", "rice"]);
        assert_eq!(d.metadata.total_ingredients, 2);
        assert!(d.metadata.error.as_deref().unwrap().contains("Bibimbap"));
        assert!(!d.sources.spoonacular_success);
        assert!(!d.sources.openai_success);
    }
}
