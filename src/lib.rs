//! # doc-qa
//!
//! Ask natural-language questions about PDF documents and get answers
//! with page-level citations.
//!
//! doc-qa extracts page text from a PDF, retrieves the passages most
//! relevant to a question, assembles them into a character-budgeted
//! context for a generative model, and derives verifiable citations
//! linking the answer back to source pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌───────────────────────────┐
//! │   PDF    │──▶│ DocumentIndex │──▶│ Segment → Score → Retrieve │
//! │ extract  │   │  (pages/doc)  │   └──────────┬────────────────┘
//! └──────────┘   └───────────────┘              ▼
//!                                      ┌────────────────┐
//!                      ┌───────────────│ Context window │
//!                      ▼               └────────────────┘
//!                ┌──────────┐   answer   ┌───────────┐
//!                │  Model   │──────────▶ │ Citations │
//!                │ (Gemini) │            └───────────┘
//!                └──────────┘
//! ```
//!
//! Retrieval, context assembly, and citation extraction are synchronous,
//! deterministic, CPU-bound computations over immutable page snapshots;
//! the model call is the only asynchronous step.
//!
//! ## Quick Start
//!
//! ```bash
//! dqa ask paper.pdf "what method does the paper propose?"
//! dqa search paper.pdf "evaluation"      # inspect ranked passages
//! dqa context paper.pdf "evaluation"    # inspect the assembled context
//! dqa summarize paper.pdf
//! dqa serve api                          # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF page-text extraction |
//! | [`index`] | In-memory document index |
//! | [`segment`] | Sentence segmentation |
//! | [`search`] | Relevance scoring and passage retrieval |
//! | [`context`] | Budgeted context window assembly |
//! | [`citations`] | Post-hoc citation extraction |
//! | [`model`] | Generative model provider abstraction |
//! | [`service`] | Query orchestration |
//! | [`server`] | HTTP JSON API |

pub mod citations;
pub mod config;
pub mod context;
pub mod extract;
pub mod index;
pub mod model;
pub mod models;
pub mod search;
pub mod segment;
pub mod server;
pub mod service;
