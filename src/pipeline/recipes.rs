//! Recipe-search lookup: the recipe-database side of the reconciliation.
//!
//! Split in two layers:
//!
//! * [`RecipeApi`]: the raw transport seam. Implementations return
//!   `Result<_, ApiError>` and do nothing but HTTP. The single production
//!   implementation is [`SpoonacularApi`]; tests substitute a fixture double
//!   returning canned recipes.
//!
//! * [`RecipeLookup`]: the policy layer. Contains every transport error
//!   (logs and returns empty; a failed lookup must never abort a dish),
//!   normalises ingredient names, and derives a confidence score from the
//!   hit count. Retry policy does NOT live here: the one
//!   simplified-name retry is the orchestrator's job.

use crate::error::ApiError;
use crate::output::RecipeLookupResult;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

// ── Wire types ───────────────────────────────────────────────────────────────

/// One recipe as returned by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecipe {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "extendedIngredients")]
    pub extended_ingredients: Vec<RawIngredient>,
}

/// One ingredient entry inside a recipe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "originalName")]
    pub original_name: String,
}

impl RawIngredient {
    /// Preferred display name: `name`, falling back to `originalName`.
    fn resolved_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.original_name
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawRecipe>,
}

#[derive(Debug, Deserialize)]
struct IngredientWidgetResponse {
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
}

// ── Transport seam ───────────────────────────────────────────────────────────

/// Raw access to the recipe-search API. Implementations are stateless after
/// construction and shareable via `Arc`.
#[async_trait::async_trait]
pub trait RecipeApi: Send + Sync {
    /// Complex search by dish name, returning up to `number` recipes.
    async fn search(&self, query: &str, number: u32) -> Result<Vec<RawRecipe>, ApiError>;

    /// Detailed ingredient list for one recipe.
    async fn ingredient_detail(&self, recipe_id: i64) -> Result<Vec<RawIngredient>, ApiError>;
}

/// Production [`RecipeApi`] over the Spoonacular HTTP API.
#[derive(Debug, Clone)]
pub struct SpoonacularApi {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SpoonacularApi {
    /// Construct with a fixed per-call timeout. An empty key is allowed: the
    /// remote will reject calls and the wrapper layer fails closed.
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, timeout_secs, SPOONACULAR_BASE_URL)
    }

    /// Same as [`SpoonacularApi::new`] with an overridable base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        timeout_secs: u64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl RecipeApi for SpoonacularApi {
    async fn search(&self, query: &str, number: u32) -> Result<Vec<RawRecipe>, ApiError> {
        let number = number.to_string();
        let params = [
            ("apiKey", self.api_key.as_str()),
            ("query", query),
            ("number", number.as_str()),
            ("addRecipeInformation", "true"),
            ("fillIngredients", "true"),
            ("instructionsRequired", "false"),
        ];
        let body: SearchResponse = self.get_json("/recipes/complexSearch", &params).await?;
        Ok(body.results)
    }

    async fn ingredient_detail(&self, recipe_id: i64) -> Result<Vec<RawIngredient>, ApiError> {
        let path = format!("/recipes/{recipe_id}/ingredientWidget.json");
        let params = [("apiKey", self.api_key.as_str())];
        let body: IngredientWidgetResponse = self.get_json(&path, &params).await?;
        Ok(body.ingredients)
    }
}

// ── Policy layer ─────────────────────────────────────────────────────────────

/// Recipe-lookup client: error-containing wrapper over a [`RecipeApi`].
///
/// Every method is independently fallible but non-raising: transport errors
/// are logged and converted to empty results at this boundary, so the
/// orchestrator never sees an `Err` from a lookup.
#[derive(Clone)]
pub struct RecipeLookup {
    api: Arc<dyn RecipeApi>,
    search_results: u32,
}

impl RecipeLookup {
    pub fn new(api: Arc<dyn RecipeApi>, search_results: u32) -> Self {
        Self {
            api,
            search_results: search_results.max(1),
        }
    }

    /// Search for recipes by dish name. Returns an empty list on any error.
    pub async fn search_by_name(&self, dish_name: &str) -> Vec<RawRecipe> {
        debug!(dish = dish_name, "searching recipe database");
        match self.api.search(dish_name, self.search_results).await {
            Ok(recipes) => {
                info!(dish = dish_name, hits = recipes.len(), "recipe search complete");
                recipes
            }
            Err(e) => {
                error!(dish = dish_name, error = %e, "recipe search failed");
                Vec::new()
            }
        }
    }

    /// Fetch the detailed ingredient list for one recipe. Returns an empty
    /// list on any error.
    pub async fn fetch_ingredient_detail(&self, recipe_id: i64) -> Vec<RawIngredient> {
        match self.api.ingredient_detail(recipe_id).await {
            Ok(ingredients) => ingredients,
            Err(e) => {
                error!(recipe_id, error = %e, "ingredient detail fetch failed");
                Vec::new()
            }
        }
    }

    /// Pull ingredient names out of recipe search hits: `name` with
    /// `originalName` fallback, lowercased, deduplicated, sorted.
    pub fn extract_ingredient_names(recipes: &[RawRecipe]) -> Vec<String> {
        let mut names = BTreeSet::new();
        for recipe in recipes {
            for ingredient in &recipe.extended_ingredients {
                let name = ingredient.resolved_name().trim().to_lowercase();
                if !name.is_empty() {
                    names.insert(name);
                }
            }
        }
        names.into_iter().collect()
    }

    /// Full lookup for one dish: search, extract, derive confidence.
    ///
    /// When the search hits recipes whose inline ingredient lists are all
    /// empty, the ingredient-detail endpoint for the first hit is consulted
    /// before giving up. `found` reflects the search outcome, not the
    /// extraction: a hit with no usable ingredients is still `found = true`.
    pub async fn find_ingredients_for_dish(&self, dish_name: &str) -> RecipeLookupResult {
        let recipes = self.search_by_name(dish_name).await;

        if recipes.is_empty() {
            warn!(dish = dish_name, "no recipes found");
            return RecipeLookupResult {
                dish_name: dish_name.to_string(),
                ingredients: Vec::new(),
                found: false,
                recipe_count: 0,
                confidence: 0.0,
            };
        }

        let mut ingredients = Self::extract_ingredient_names(&recipes);

        if ingredients.is_empty() {
            if let Some(id) = recipes[0].id {
                let detail = self.fetch_ingredient_detail(id).await;
                ingredients = Self::extract_ingredient_names(&[RawRecipe {
                    extended_ingredients: detail,
                    ..Default::default()
                }]);
            }
        }

        let recipe_count = recipes.len();
        RecipeLookupResult {
            dish_name: dish_name.to_string(),
            ingredients,
            found: true,
            recipe_count,
            confidence: (recipe_count as f64 / 3.0).min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureApi {
        recipes: Vec<RawRecipe>,
        detail: Vec<RawIngredient>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl RecipeApi for FixtureApi {
        async fn search(&self, _query: &str, _number: u32) -> Result<Vec<RawRecipe>, ApiError> {
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(self.recipes.clone())
        }

        async fn ingredient_detail(&self, _id: i64) -> Result<Vec<RawIngredient>, ApiError> {
            if self.fail {
                return Err(ApiError::EmptyResponse);
            }
            Ok(self.detail.clone())
        }
    }

    fn recipe(id: i64, names: &[&str]) -> RawRecipe {
        RawRecipe {
            id: Some(id),
            title: "t".into(),
            extended_ingredients: names
                .iter()
                .map(|n| RawIngredient {
                    name: n.to_string(),
                    original_name: String::new(),
                })
                .collect(),
        }
    }

    fn lookup(api: FixtureApi) -> RecipeLookup {
        RecipeLookup::new(Arc::new(api), 5)
    }

    #[test]
    fn extract_lowercases_dedupes_and_sorts() {
        let recipes = vec![recipe(1, &["Tomato", "Basil"]), recipe(2, &["tomato", "Olive Oil"])];
        assert_eq!(
            RecipeLookup::extract_ingredient_names(&recipes),
            vec!["basil", "olive oil", "tomato"]
        );
    }

    #[test]
    fn extract_falls_back_to_original_name() {
        let recipes = vec![RawRecipe {
            id: Some(1),
            title: String::new(),
            extended_ingredients: vec![RawIngredient {
                name: "  ".into(),
                original_name: "Fresh Oregano".into(),
            }],
        }];
        assert_eq!(RecipeLookup::extract_ingredient_names(&recipes), vec!["fresh oregano"]);
    }

    #[tokio::test]
    async fn find_derives_confidence_from_hit_count() {
        let l = lookup(FixtureApi {
            recipes: vec![recipe(1, &["a"]), recipe(2, &["b"])],
            detail: vec![],
            fail: false,
        });
        let r = l.find_ingredients_for_dish("stew").await;
        assert!(r.found);
        assert_eq!(r.recipe_count, 2);
        assert!((r.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn find_confidence_caps_at_one() {
        let l = lookup(FixtureApi {
            recipes: vec![recipe(1, &["a"]), recipe(2, &["b"]), recipe(3, &["c"]), recipe(4, &["d"])],
            detail: vec![],
            fail: false,
        });
        let r = l.find_ingredients_for_dish("stew").await;
        assert_eq!(r.confidence, 1.0);
    }

    #[tokio::test]
    async fn find_miss_short_circuits_with_zero_confidence() {
        let l = lookup(FixtureApi {
            recipes: vec![],
            detail: vec![],
            fail: false,
        });
        let r = l.find_ingredients_for_dish("unknown dish").await;
        assert!(!r.found);
        assert!(r.ingredients.is_empty());
        assert_eq!(r.recipe_count, 0);
        assert_eq!(r.confidence, 0.0);
    }

    #[tokio::test]
    async fn find_uses_detail_endpoint_when_inline_ingredients_empty() {
        let l = lookup(FixtureApi {
            recipes: vec![recipe(7, &[])],
            detail: vec![RawIngredient {
                name: "Saffron".into(),
                original_name: String::new(),
            }],
            fail: false,
        });
        let r = l.find_ingredients_for_dish("paella").await;
        assert!(r.found);
        assert_eq!(r.ingredients, vec!["saffron"]);
    }

    #[tokio::test]
    async fn transport_errors_are_contained() {
        let l = lookup(FixtureApi {
            recipes: vec![],
            detail: vec![],
            fail: true,
        });
        let r = l.find_ingredients_for_dish("stew").await;
        assert!(!r.found);
        assert_eq!(r.confidence, 0.0);
        assert!(l.fetch_ingredient_detail(1).await.is_empty());
    }
}
