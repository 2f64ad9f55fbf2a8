// Resume review: prompt building, completion recovery, feedback normalization.
// All model calls go through llm_client::CompletionBackend, never a concrete provider.

pub mod comparison;
pub mod feedback;
pub mod handlers;
pub mod keywords;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod recovery;
pub mod rewrite;
