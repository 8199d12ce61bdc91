use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::QuizId;
use quiz_core::time::fixed_clock;
use services::{AppServices, PersistenceDispatcher, QuizConfig, QuizLoopService, QuizPhase};
use storage::repository::{
    InMemoryRepository, ProgressRepository, QuizSourceRepository, Storage, StorageError,
};

const CAPITALS: &str = "\
question_number,question,options,correct_option
1,Capital of France?,Paris|Lyon|Nice,Paris
2,Capital of Spain?,Madrid|Seville,Madrid
3,Capital of Italy?,Rome|Milan|Turin,Rome
";

const PAIR: &str = "\
question_number,question,options,correct_option
1,2+2?,3|4,4
2,3+3?,5|6,6
";

fn quiz(id: &str) -> QuizId {
    QuizId::new(id).unwrap()
}

fn services_over(repo: &InMemoryRepository, config: &QuizConfig) -> (Arc<QuizLoopService>, PersistenceDispatcher) {
    let (services, dispatcher) =
        AppServices::from_storage(Storage::from_in_memory(repo.clone()), config, fixed_clock());
    (services.quiz_loop(), dispatcher)
}

#[tokio::test]
async fn answering_every_question_scores_full_marks() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("capitals"), CAPITALS).unwrap();
    let (quiz_loop, dispatcher) = services_over(&repo, &QuizConfig::default());

    let mut session = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    for answer in ["Paris", "Madrid", "Rome"] {
        quiz_loop.next(&mut session, Some(answer.into())).unwrap();
    }

    assert_eq!(session.phase(), QuizPhase::Completed);
    assert_eq!(session.score().to_string(), "3/3");
    assert!(session.incorrect_answers().is_empty());

    let stats = dispatcher.shutdown().await;
    assert_eq!(stats.committed, 3);
}

#[tokio::test]
async fn restarted_quiz_resumes_from_the_beginning() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("capitals"), CAPITALS).unwrap();
    let (quiz_loop, dispatcher) = services_over(&repo, &QuizConfig::default());

    let mut session = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    quiz_loop.next(&mut session, Some("Paris".into())).unwrap();
    quiz_loop.next(&mut session, Some("Seville".into())).unwrap();
    dispatcher.handle().drain().await;

    let resumed = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    assert_eq!(resumed.cursor(), 2);
    assert_eq!(resumed.answers().len(), 2);

    quiz_loop.restart(&mut session);
    assert_eq!(session.cursor(), 0);
    assert!(session.answers().is_empty());
    dispatcher.handle().drain().await;

    let resumed = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    assert_eq!(resumed.cursor(), 0);
    assert!(resumed.answers().is_empty());
    assert_eq!(repo.snapshot(&quiz("capitals")).unwrap(), Some(b"{}".to_vec()));
}

#[tokio::test]
async fn later_flush_wins() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("capitals"), CAPITALS).unwrap();
    let (quiz_loop, dispatcher) = services_over(&repo, &QuizConfig::default());

    let mut session = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    quiz_loop.next(&mut session, Some("Lyon".into())).unwrap();
    quiz_loop.previous(&mut session);
    quiz_loop.next(&mut session, Some("Paris".into())).unwrap();
    dispatcher.handle().drain().await;

    let stored: serde_json::Value =
        serde_json::from_slice(&repo.snapshot(&quiz("capitals")).unwrap().unwrap()).unwrap();
    assert_eq!(stored, serde_json::json!({"0": {"selected": "Paris"}}));
    assert_eq!(repo.write_history().unwrap().len(), 2);
}

#[tokio::test]
async fn partial_quiz_scores_only_recorded_answers() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("math"), PAIR).unwrap();
    let (quiz_loop, _dispatcher) = services_over(&repo, &QuizConfig::default());

    let mut right = quiz_loop.start_quiz(quiz("math")).await.unwrap();
    quiz_loop.next(&mut right, Some("4".into())).unwrap();
    right.go_to(2);
    assert!(right.is_complete());
    assert_eq!(right.score().to_string(), "1/2");
    assert!(right.incorrect_answers().is_empty());

    let mut wrong = quiz_loop.start_quiz(quiz("math")).await.unwrap();
    wrong.go_to(0);
    quiz_loop.next(&mut wrong, Some("3".into())).unwrap();
    wrong.go_to(2);
    assert_eq!(wrong.score().to_string(), "0/2");
    let review = wrong.incorrect_answers();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].number, "1");
    assert_eq!(review[0].your_answer.as_deref(), Some("3"));
}

#[tokio::test]
async fn skipped_question_is_recorded_and_reviewed() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("math"), PAIR).unwrap();
    let (quiz_loop, _dispatcher) = services_over(&repo, &QuizConfig::default());

    let mut session = quiz_loop.start_quiz(quiz("math")).await.unwrap();
    quiz_loop.next(&mut session, None).unwrap();
    quiz_loop.next(&mut session, Some("6".into())).unwrap();

    assert_eq!(session.score().to_string(), "1/2");
    let review = session.incorrect_answers();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].your_answer, None);
    assert_eq!(review[0].correct_answer, "4");
}

struct FailingProgress;

#[async_trait]
impl ProgressRepository for FailingProgress {
    async fn read_snapshot(&self, _quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::Unauthorized)
    }

    async fn write_snapshot(&self, _quiz_id: &QuizId, _content: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Connection("remote unavailable".into()))
    }
}

#[tokio::test]
async fn persistence_failures_never_reach_the_taker() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("math"), PAIR).unwrap();
    let sources: Arc<dyn QuizSourceRepository> = Arc::new(repo);
    let storage = Storage {
        sources,
        progress: Arc::new(FailingProgress),
    };
    let (services, dispatcher) =
        AppServices::from_storage(storage, &QuizConfig::default(), fixed_clock());
    let quiz_loop = services.quiz_loop();

    let mut session = quiz_loop.start_quiz(quiz("math")).await.unwrap();
    assert_eq!(session.cursor(), 0);
    quiz_loop.next(&mut session, Some("4".into())).unwrap();
    quiz_loop.next(&mut session, Some("6".into())).unwrap();
    assert_eq!(session.score().to_string(), "2/2");

    let stats = dispatcher.shutdown().await;
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.committed, 0);
}

/// Commits like a remote backend: each write takes a while to land.
struct SlowProgress {
    inner: InMemoryRepository,
    delay: Duration,
}

#[async_trait]
impl ProgressRepository for SlowProgress {
    async fn read_snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.read_snapshot(quiz_id).await
    }

    async fn write_snapshot(&self, quiz_id: &QuizId, content: &[u8]) -> Result<(), StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.write_snapshot(quiz_id, content).await
    }
}

#[tokio::test]
async fn reentering_a_quiz_keeps_answers_still_being_written() {
    let repo = InMemoryRepository::new();
    repo.insert_source(quiz("capitals"), CAPITALS).unwrap();
    let storage = Storage {
        sources: Arc::new(repo.clone()),
        progress: Arc::new(SlowProgress {
            inner: repo.clone(),
            delay: Duration::from_millis(100),
        }),
    };
    let (services, dispatcher) =
        AppServices::from_storage(storage, &QuizConfig::default(), fixed_clock());
    let quiz_loop = services.quiz_loop();

    let mut first = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    quiz_loop.next(&mut first, Some("Paris".into())).unwrap();
    quiz_loop.next(&mut first, Some("Seville".into())).unwrap();

    let mut again = quiz_loop.start_quiz(quiz("capitals")).await.unwrap();
    assert_eq!(again.cursor(), 2);
    assert_eq!(again.answers().len(), 2);

    quiz_loop.next(&mut again, Some("Rome".into())).unwrap();
    dispatcher.shutdown().await;

    let stored: serde_json::Value =
        serde_json::from_slice(&repo.snapshot(&quiz("capitals")).unwrap().unwrap()).unwrap();
    assert_eq!(
        stored,
        serde_json::json!({
            "0": {"selected": "Paris"},
            "1": {"selected": "Seville"},
            "2": {"selected": "Rome"},
        })
    );
}

#[tokio::test]
async fn missing_quiz_fails_to_start() {
    let repo = InMemoryRepository::new();
    let (quiz_loop, _dispatcher) = services_over(&repo, &QuizConfig::default());

    let err = quiz_loop.start_quiz(quiz("absent")).await.unwrap_err();
    assert!(matches!(err, services::SessionError::Load(_)));
}
