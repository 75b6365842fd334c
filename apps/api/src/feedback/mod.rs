// Resume feedback: validation, the model adapter, strict decoding of its
// output, persistence and the HTTP surface over all of it.
// All model calls go through llm_client via `LlmAnalyzer`.

pub mod analysis;
pub mod analyzer;
pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod store;
