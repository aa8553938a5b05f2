//! # Topic Feeds
//!
//! A news aggregation pipeline that collects articles from configured
//! source websites and upstream feeds, normalizes them into per-topic item
//! lists, and serializes each topic to RSS 2.0, Atom, and JSON Feed files
//! plus a static homepage listing every generated feed.
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Indexing**: discover candidate article URLs from each source's
//!    index page or upstream feed
//! 2. **Parsing**: fetch every candidate and extract normalized metadata
//!    (title, description, image, video, publish date)
//! 3. **Aggregation**: merge per topic area, dedup by canonical URL, sort
//!    newest-first, cap
//! 4. **Output**: write validated RSS/Atom/JSON files per area, derive the
//!    "all", "videos", and "tech-leaders" feeds, regenerate the homepage
//!
//! ## Usage
//!
//! ```sh
//! topic_feeds -c feeds.yaml -o ./site
//! ```
//!
//! Failure policy: everything caused by external data (dead hosts, odd
//! markup, bad dates) is logged and skipped at the smallest possible scope;
//! only internal invariant violations — generated XML that does not parse —
//! abort a run.

pub mod aggregate;
pub mod article;
pub mod cli;
pub mod config;
pub mod http;
pub mod links;
pub mod models;
pub mod outputs;
pub mod urls;
pub mod utils;
