pub mod content;
pub mod publish;
pub mod storyboard;

pub use content::{GeneratedContent, QuestionFeedback, QuizAnswer, QuizQuestion, QuizSpec};
pub use publish::{ContentHandle, ModuleRef, PublishResult};
pub use storyboard::{ContentKind, ResolvedPageMeta, StoryboardBlock, TextNode};
