/*!
 * # vertrans - translation quality verification
 *
 * A Rust library that scores machine-translated technical text against its
 * original and attaches explanatory notes for readers.
 *
 * ## Features
 *
 * - Formula integrity checks with deterministic repair of stripped math markup
 * - Paragraph-level meaning preservation scored by an LLM judge
 * - Claim preservation and internal logic checks
 * - Corroboration of claims against a knowledge base (Wikipedia by default)
 * - Concept enrichment notes in the target language
 * - Judgments served by:
 *   - Ollama (local LLM)
 *   - Anthropic API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `verification`: The verification engine:
 *   - `verification::formula`: Math token integrity and repair
 *   - `verification::semantic`: Meaning preservation and glossary usage
 *   - `verification::logic`: Claim preservation and internal logic
 *   - `verification::research`: External corroboration
 *   - `verification::enrichment`: Concept notes
 *   - `verification::verifier`: Per-section driver
 * - `knowledge`: Knowledge-base clients
 * - `file_utils`: Section file operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::anthropic`: Anthropic API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod knowledge;
pub mod language_utils;
pub mod providers;
pub mod verification;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunMode, RunSummary};
pub use errors::{AppError, JudgeError, KnowledgeBaseError, ProviderError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use verification::{Section, SectionVerifier, VerificationReport, VerifierOptions, VerifyModule};
