//! # Listing Rank
//!
//! Relevance scoring and ranking-quality evaluation for an internship
//! listings search index.
//!
//! The scoring engine lives in [`listing_rank_core`]; this crate adds the
//! file-based surfaces around it: loading listings and ranked runs, TOML
//! configuration, reports, and label export.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │  JSON files  │──▶│ listing-rank-core  │──▶│   Reports    │
//! │ hits / runs  │   │ score + evaluate   │   │ table/json/  │
//! └──────────────┘   └────────────────────┘   │ csv / jsonl  │
//!                                             └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lrank score "python" --documents hits.json --explain
//! lrank rerank "qa" --documents hits.json --limit 10
//! lrank evaluate --run bm25.json --baseline previous.json
//! lrank labels --run bm25.json --output labels.jsonl
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Documents and run file loading |
//! | [`score`] | Scoring and re-ranking |
//! | [`eval_cmd`] | Run evaluation and baseline comparison |
//! | [`report`] | Table, JSON and CSV rendering |
//! | [`labels`] | Training label export |
//! | [`categories`] | Query taxonomy diagnostics |

pub mod categories;
pub mod config;
pub mod corpus;
pub mod eval_cmd;
pub mod labels;
pub mod report;
pub mod score;
