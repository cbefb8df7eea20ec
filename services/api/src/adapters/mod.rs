pub mod edital_llm;
pub mod extract_llm;
pub mod store;

pub use edital_llm::OpenAiEditalAdapter;
pub use extract_llm::OpenAiExtractionAdapter;
pub use store::MemStore;
