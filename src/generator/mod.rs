pub mod adapter;
pub mod knowledge_base;
pub mod postprocess;

pub use adapter::{ContentGenerator, OpenAiGenerator, TemplateContext};
pub use knowledge_base::load_kb_snippets;
pub use postprocess::post_process;
