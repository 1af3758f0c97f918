//! Pipeline stages for OCR-to-ingredients processing.
//!
//! Each submodule implements exactly one concern. Keeping stages separate
//! makes each independently testable and lets us swap the remote-API
//! implementations (via the `RecipeApi` / `ChatApi` seams) without touching
//! the merge rules or the orchestrator.
//!
//! ## Data Flow
//!
//! ```text
//! normalize ──▶ llm (analyze) ──▶ recipes ──▶ llm (verify/suggest) ──▶ merge
//! (cleanup)     (dish extraction)  (lookup)    (sanity + missing)      (union)
//! ```
//!
//! 1. [`normalize`]: deterministic OCR-text cleanup and heuristic dish-name
//!    seed extraction; pure functions, no I/O
//! 2. [`llm`]: four chat-completion contracts with per-call error containment
//! 3. [`recipes`]: recipe-database lookup with error containment and
//!    confidence derivation
//! 4. [`merge`]: lowercase/trim/dedupe/sort union of ingredient lists

pub mod llm;
pub mod merge;
pub mod normalize;
pub mod recipes;
