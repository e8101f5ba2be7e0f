//! Core Module - Investigation Logic
//!
//! Evidence graph, pattern heuristics, reputation aggregation and the
//! prosecution / defense / judge stages, tied together by the pipeline.

pub mod defense;
pub mod evidence;
pub mod graph;
pub mod judge;
pub mod patterns;
pub mod pipeline;
pub mod prosecution;
pub mod reputation;

pub use defense::Defender;
pub use evidence::{ChainSnapshot, EvidenceStage};
pub use graph::{GraphBuild, GraphBuilder};
pub use judge::Judge;
pub use patterns::{PatternDetector, PatternScan};
pub use pipeline::Investigator;
pub use prosecution::Prosecutor;
pub use reputation::ReputationAggregator;
