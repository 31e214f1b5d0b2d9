pub mod api;
pub mod client;
pub mod publisher;
pub mod quiz;

pub use api::{CanvasApi, RemoteModule};
pub use client::HttpCanvasClient;
pub use publisher::{CanvasPublisher, PublishDefaults};
pub use quiz::{ClassicQuizEngine, NewQuizEngine, QuizEngine, QuizEngineKind, QuizShell};
