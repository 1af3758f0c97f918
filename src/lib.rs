//! # menu2ingredients
//!
//! Extract dish names from restaurant-menu OCR text and assemble a
//! deduplicated, confidence-scored ingredient list per dish by reconciling
//! two remote sources: a recipe-search database and a chat-completion model.
//!
//! ## Pipeline
//!
//! ```text
//! OCR text ──▶ analyze (model) ──▶ per dish:
//!                                    lookup (recipe DB, one simplified-name retry)
//!                                    ──▶ sanity check (model, fail-open)
//!                                    ──▶ suggest missing (model, capped at 8)
//!                                    ──▶ merge (lowercase ∪, sorted)
//!          ──▶ summary statistics
//! ```
//!
//! Remote failures never abort a request: each client contains its own
//! errors behind typed defaults, and a panic inside one dish degrades only
//! that dish. The only hard request failure is a malformed request body.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use menu2ingredients::{process_ocr_text, Clients, ServiceConfig};
//!
//! # async fn run() {
//! let config = ServiceConfig::default();
//! let clients = Clients::from_config(&config);
//! let output = process_ocr_text(&clients, "Margherita Pizza $12.99").await;
//! println!("{} dishes", output.total_dishes);
//! # }
//! ```
//!
//! The HTTP surface lives in [`server`]: `POST /api/process-ocr` and
//! `GET /api/health`.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;
pub mod server;

pub use config::{Environment, ServiceConfig, ServiceConfigBuilder};
pub use error::{ApiError, DishError, Menu2IngredientsError};
pub use output::{DishResult, OcrAnalysis, ProcessOutput, ProcessingSummary};
pub use process::{process_ocr_text, Clients};
pub use server::{router, serve, AppState};
