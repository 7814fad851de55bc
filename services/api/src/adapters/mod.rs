pub mod extractor;
pub mod generation_llm;

pub use extractor::FormatExtractor;
pub use generation_llm::OpenAiGenerationAdapter;
