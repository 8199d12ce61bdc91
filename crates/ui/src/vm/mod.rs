mod quiz_vm;

pub use quiz_vm::{QuizIntent, QuizVm, list_quizzes, start_quiz};
