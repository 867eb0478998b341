//! Movie recommendations from co-rating communities.
//!
//! Ratings become a weighted movie graph, a capacity-capped single-phase
//! Louvain splits it into small communities, and recommendations are drawn by
//! a best-first walk that never leaves the seed movies' communities.

pub mod comm_table;
pub mod community_algo;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod graph;
pub mod loader;
pub mod logger;
pub mod network;
pub mod recommend;

pub use community_algo::{CommunityDetector, DetectionSummary};
pub use error::{GraphError, Result};
pub use network::MovieNetwork;
pub use recommend::get_best_movies;
