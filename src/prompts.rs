//! Prompt templates for the four chat-completion contracts.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: each prompt is a versioned contract paired
//!    with the parser in [`crate::pipeline::llm`] that reads its JSON shape.
//!    Changing a field name means touching this file and that parser, nothing
//!    else.
//!
//! 2. **Testability**: unit tests can inspect the built prompt strings
//!    directly without spinning up a real model, making contract regressions
//!    easy to catch.
//!
//! Every prompt instructs the model to respond with exactly one JSON object;
//! the callers request `response_format: json_object` so the reply is
//! machine-parseable.

/// System message for the OCR-text analysis call.
pub const ANALYZE_OCR_SYSTEM: &str = "You are an expert at analyzing restaurant menu text and \
     extracting dish information. Focus on identifying complete dish names and any ingredients \
     explicitly mentioned.";

/// System message for the dish-name simplification call.
pub const SIMPLIFY_DISH_SYSTEM: &str = "You are an expert at simplifying dish names for recipe \
     database searches. Focus on removing descriptive adjectives while keeping the core dish \
     identity.";

/// System message for the ingredient sanity-check call.
pub const SANITY_CHECK_SYSTEM: &str = "You are a culinary expert performing quality control on \
     recipe ingredients. Remove any ingredients that are clearly inappropriate or unrelated to \
     the dish.";

/// System message for the missing-ingredient suggestion call.
pub const SUGGEST_MISSING_SYSTEM: &str = "You are a culinary expert specializing in identifying \
     commonly omitted ingredients. Focus on ingredients that restaurants typically use but don't \
     list on menus.";

/// Build the user prompt for the OCR-text analysis call.
///
/// Expected reply shape:
/// `{"dishes": [{"name", "mentioned_ingredients", "cooking_method",
/// "confidence"}], "overall_confidence", "text_quality"}`.
pub fn analyze_ocr_prompt(ocr_text: &str) -> String {
    format!(
        r#"Analyze this OCR text from a restaurant menu and extract dish names and any ingredients mentioned:

OCR Text:
{ocr_text}

Extract and structure the information. Look for:
1. Dish/menu item names
2. Any ingredients explicitly mentioned
3. Cooking methods or preparation styles

Respond with JSON in this exact format:
{{
  "dishes": [
    {{
      "name": "dish name",
      "mentioned_ingredients": ["ingredient1", "ingredient2"],
      "cooking_method": "method if mentioned",
      "confidence": 0.9
    }}
  ],
  "overall_confidence": 0.8,
  "text_quality": "good/fair/poor"
}}"#
    )
}

/// Build the user prompt for the dish-name simplification call.
///
/// Expected reply shape: `{"alternative_name", "reasoning"}`.
pub fn simplify_dish_prompt(dish_name: &str) -> String {
    format!(
        r#"Analyze this dish name and provide a simpler, more searchable alternative:

Dish Name: {dish_name}

The goal is to create a simplified version that would have better results in a recipe database search.
For example:
- "Grandma's Famous Chocolate Chip Cookies" -> "Chocolate Chip Cookies"
- "BBQ Bacon Cheeseburger Deluxe" -> "BBQ Bacon Cheeseburger"
- "Traditional Italian Margherita Pizza" -> "Margherita Pizza"

Respond with JSON in this exact format:
{{
  "alternative_name": "simplified name",
  "reasoning": "Brief explanation of the simplification"
}}"#
    )
}

/// Build the user prompt for the ingredient sanity-check call.
///
/// Expected reply shape:
/// `{"verified_ingredients", "removed_ingredients", "reasoning"}`.
pub fn sanity_check_prompt(dish_name: &str, ingredients: &[String]) -> String {
    format!(
        r#"Perform a sanity check on these ingredients for the dish:

Dish Name: {dish_name}

Ingredients from recipe database:
{}

Analyze if these ingredients make sense for this dish:
1. Are any ingredients completely unrelated to this dish?
2. Are there any obvious mistakes or incorrect ingredients?
3. Are all ingredients appropriate for the cooking style/cuisine?

Remove any ingredients that don't belong and provide the verified list.

Respond with JSON in this exact format:
{{
  "verified_ingredients": ["ingredient1", "ingredient2", ...],
  "removed_ingredients": ["removed1", "removed2", ...],
  "reasoning": "Brief explanation of what was removed and why"
}}"#,
        ingredients.join(", ")
    )
}

/// Build the user prompt for the missing-ingredient suggestion call.
///
/// Expected reply shape:
/// `{"suggested_ingredients", "reasoning", "confidence"}` with at most 8
/// suggestions (also enforced by the parser).
pub fn suggest_missing_prompt(
    dish_name: &str,
    verified: &[String],
    mentioned: &[String],
    ocr_text: &str,
) -> String {
    format!(
        r#"Suggest additional ingredients for this dish that are commonly missing from menus:

Dish Name: {dish_name}

Verified ingredients from recipe database:
{}

Ingredients mentioned in menu:
{}

Original OCR text (context):
{ocr_text}

Focus on suggesting ingredients that are:
1. Common toppings and garnishes
2. Base ingredients (oils, seasonings, etc.)
3. Typical accompaniments
4. Ingredients that are often assumed/not mentioned

Avoid suggesting ingredients that are already in the verified list.
Maximum 8 additional ingredients.

Respond with JSON in this exact format:
{{
  "suggested_ingredients": ["ingredient1", "ingredient2", ...],
  "reasoning": "Brief explanation of why these ingredients are commonly included",
  "confidence": 0.8
}}

Keep ingredients as simple names (e.g., "olive oil", "garlic", "parsley").
Confidence should be between 0.0 and 1.0."#,
        join_or_none(verified),
        join_or_none(mentioned),
    )
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_prompt_embeds_text_and_contract_fields() {
        let p = analyze_ocr_prompt("Pad Thai with shrimp");
        assert!(p.contains("Pad Thai with shrimp"));
        assert!(p.contains("\"dishes\""));
        assert!(p.contains("\"mentioned_ingredients\""));
        assert!(p.contains("\"text_quality\""));
    }

    #[test]
    fn simplify_prompt_embeds_dish_name() {
        let p = simplify_dish_prompt("Grandma's Famous Lasagna");
        assert!(p.contains("Grandma's Famous Lasagna"));
        assert!(p.contains("\"alternative_name\""));
    }

    #[test]
    fn sanity_prompt_joins_ingredients() {
        let p = sanity_check_prompt("Carbonara", &["egg".into(), "guanciale".into()]);
        assert!(p.contains("egg, guanciale"));
        assert!(p.contains("\"verified_ingredients\""));
        assert!(p.contains("\"removed_ingredients\""));
    }

    #[test]
    fn suggest_prompt_marks_empty_lists_as_none() {
        let p = suggest_missing_prompt("Tacos", &[], &[], "tacos al pastor");
        assert!(p.contains("Verified ingredients from recipe database:\nNone"));
        assert!(p.contains("Ingredients mentioned in menu:\nNone"));
        assert!(p.contains("Maximum 8"));
    }
}
