pub mod openai;

pub use openai::CompletionClient;
