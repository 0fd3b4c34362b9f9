//! Promo-link discovery crawler
//!
//! This module contains the discovery engine:
//! - `task`: crawl tasks with structural identity
//! - `seeder`: race id → initial candidate requests
//! - `queue`: FIFO frontier with visited-set dedup and a request budget
//! - `fetcher`: one HTTP request per task, partial-update headers
//! - `extractor`: pure link/directive extraction from fetched bodies
//! - `merger`: per-URL folding of repeated discoveries
//! - `coordinator`: the crawl loop tying it all together

pub mod coordinator;
pub mod extractor;
pub mod fetcher;
pub mod merger;
pub mod queue;
pub mod seeder;
pub mod task;

pub use coordinator::{collect_promo_links, discover, ProgressSink};
pub use extractor::{extract_first_int, ListingScanner, PromoLink, ScanResult};
pub use fetcher::{fetch_task, fetch_text, FetchOutcome, PARTIAL_UPDATE_HEADERS};
pub use merger::LinkMerger;
pub use queue::TaskQueue;
pub use seeder::seed_frontier;
pub use task::{Method, Payload, Task};
