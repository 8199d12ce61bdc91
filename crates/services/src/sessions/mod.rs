mod progress;
mod service;
mod view;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use progress::QuizProgress;
pub use service::{QuizPhase, QuizSession};
pub use view::ReviewItem;
pub use workflow::{QuizAnswerResult, QuizLoopService};
