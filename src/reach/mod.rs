//! Reach computation pipeline.
//!
//! 1. **Parsing** (`parser`) - validates the post URL and extracts the post id
//! 2. **Aggregation** (`result`) - accumulates resharers into running counters
//! 3. **Orchestration** (`importer`) - sequences upstream calls and mapping
//! 4. **Memoization** (`cache`) - TTL cache with single-flight population
//! 5. **Progress** (`progress`) - optional observer for long-running fetches
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use tweet_reach::reach::Importer;
//!
//! let importer = Importer::new(api, ReachConfig::from_env());
//! let result = importer
//!     .compute_reach("https://twitter.com/jack/status/20")
//!     .await?;
//!
//! println!("{}", result.reach_description());
//! ```

pub mod cache;
pub mod error;
pub mod humanize;
pub mod importer;
pub mod parser;
pub mod progress;
pub mod result;

pub use cache::{ReachCache, ReachCacheStats};
pub use error::ReachError;
pub use importer::Importer;
pub use parser::{InvalidPostId, extract_post_id, is_valid_url, require_post_id};
pub use progress::{NoProgress, ReachProgress};
pub use result::{ReachResult, ReachStatus};
