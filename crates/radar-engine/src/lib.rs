//! Pain extraction, clustering, ideation, scoring, and the workflows that
//! sequence them.

pub mod cluster;
pub mod completion;
pub mod error;
pub mod extractor;
pub mod filtering;
pub mod ideas;
pub mod pipeline;
pub mod scorer;

pub use cluster::{ClusterEngine, GroupingStrategy, TfidfAverageLinkage};
pub use completion::{
    completion_from_config, CompletionService, DisabledCompletion, OpenAiCompletion,
};
pub use error::{ClusterError, CompletionError, PipelineError};
pub use extractor::{PainExtraction, PainExtractor};
pub use filtering::{apply_manual_filters, dedupe_by_identity};
pub use ideas::{IdeaCandidate, IdeaGenerator, IdeaType};
pub use pipeline::{PipelineOrchestrator, PipelineSettings, PipelineSummary, TrendSummary};
pub use scorer::{score, score_for_cluster, ValidationScores};
