// Library interface for newsbrief modules
// This allows tests and other binaries to import modules

pub mod gateway;
pub mod ingestion;
pub mod llm;
pub mod normalize;
pub mod recency;
pub mod server;
pub mod sessions;
