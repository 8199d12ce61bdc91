use quiz_core::model::QuizId;
use services::QuizConfig;

use crate::vm::QuizIntent;
use super::test_harness::{ViewHarness, ViewKind, setup_view_harness, setup_view_harness_with_config};

const CAPITALS: &str = "\
question_number,question,options,correct_option
1,Capital of France?,Paris|Lyon,Paris
2,Capital of Spain?,Madrid|Seville,Madrid
";

async fn loaded(mut harness: ViewHarness) -> ViewHarness {
    harness.rebuild();
    // Starting a quiz waits on the progress writer before reading.
    harness.drive_async().await;
    harness.drive_async().await;
    harness.settle();
    harness
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_quizzes() {
    let harness = setup_view_harness(
        ViewKind::Home,
        &[("capitals", CAPITALS), ("algebra", CAPITALS)],
    );
    let harness = loaded(harness).await;

    let html = harness.render();
    assert!(html.contains("Choose a quiz"), "missing heading in {html}");
    assert!(html.contains("algebra"), "missing quiz in {html}");
    assert!(html.contains("capitals"), "missing quiz in {html}");
    assert!(html.contains("Start"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_shows_banner_without_quizzes() {
    let harness = loaded(setup_view_harness(ViewKind::Home, &[])).await;

    let html = harness.render();
    assert!(html.contains("No quizzes found"), "missing banner in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let harness = loaded(setup_view_harness(ViewKind::Quiz("capitals"), &[("capitals", CAPITALS)])).await;

    let html = harness.render();
    assert!(html.contains("capitals Quiz"), "missing title in {html}");
    assert!(html.contains("Question 1"), "missing header in {html}");
    assert!(html.contains("Capital of France?"), "missing prompt in {html}");
    assert!(html.contains("Lyon"), "missing option in {html}");
    assert!(html.contains("Next"), "missing next in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_answers_to_results_and_restarts() {
    let mut harness =
        loaded(setup_view_harness(ViewKind::Quiz("capitals"), &[("capitals", CAPITALS)])).await;
    let dispatch = harness.handles().dispatch();

    dispatch.call(QuizIntent::Select(0));
    dispatch.call(QuizIntent::Next);
    harness.settle();
    let html = harness.render();
    assert!(html.contains("Question 2"), "did not advance in {html}");

    dispatch.call(QuizIntent::Select(1));
    dispatch.call(QuizIntent::Next);
    harness.settle();
    let html = harness.render();
    assert!(html.contains("Your score: 1/2"), "missing score in {html}");
    assert!(html.contains("Review Incorrect Answers"), "missing review in {html}");
    assert!(html.contains("Your answer: Seville"), "missing wrong answer in {html}");
    assert!(html.contains("Correct answer: Madrid"), "missing correct answer in {html}");

    dispatch.call(QuizIntent::Restart);
    harness.settle();
    let html = harness.render();
    assert!(html.contains("Question 1"), "did not restart in {html}");

    harness.dispatcher.handle().drain().await;
    let id = QuizId::new("capitals").unwrap();
    assert_eq!(harness.repo.snapshot(&id).unwrap(), Some(b"{}".to_vec()));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reviews_questions_sharing_a_number() {
    const REPEATED: &str = "\
question_number,question,options,correct_option
1,Capital of Peru?,Lima|Cusco,Lima
1,Capital of Chile?,Santiago|Valparaiso,Santiago
";
    let mut harness =
        loaded(setup_view_harness(ViewKind::Quiz("andes"), &[("andes", REPEATED)])).await;
    let handles = harness.handles();
    let dispatch = handles.dispatch();

    for _ in 0..2 {
        dispatch.call(QuizIntent::Select(1));
        dispatch.call(QuizIntent::Next);
    }
    harness.settle();
    let html = harness.render();
    assert!(html.contains("Your score: 0/2"), "missing score in {html}");
    assert!(html.contains("Your answer: Cusco"), "missing first review in {html}");
    assert!(html.contains("Your answer: Valparaiso"), "missing second review in {html}");

    let vm = handles.vm();
    let guard = vm.read();
    let quiz = guard.as_ref().expect("quiz loaded");
    let indices: Vec<usize> = quiz.review().iter().map(|item| item.index.value()).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_preselects_recorded_answer_on_previous() {
    let mut harness =
        loaded(setup_view_harness(ViewKind::Quiz("capitals"), &[("capitals", CAPITALS)])).await;
    let handles = harness.handles();
    let dispatch = handles.dispatch();

    dispatch.call(QuizIntent::Select(1));
    dispatch.call(QuizIntent::Next);
    dispatch.call(QuizIntent::Previous);
    harness.settle();

    let vm = handles.vm();
    let guard = vm.read();
    let quiz = guard.as_ref().expect("quiz loaded");
    assert_eq!(quiz.session().cursor(), 0);
    assert_eq!(quiz.selected(), Some(1));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_requires_selection_when_configured() {
    let config = QuizConfig {
        require_selection: true,
        ..QuizConfig::default()
    };
    let mut harness = loaded(setup_view_harness_with_config(
        ViewKind::Quiz("capitals"),
        &[("capitals", CAPITALS)],
        &config,
    ))
    .await;

    harness.handles().dispatch().call(QuizIntent::Next);
    harness.settle();
    let html = harness.render();
    assert!(html.contains("Select an answer before continuing."), "missing warning in {html}");
    assert!(html.contains("Question 1"), "should not advance in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_shows_error_for_missing_quiz() {
    let harness = loaded(setup_view_harness(ViewKind::Quiz("absent"), &[])).await;

    let html = harness.render();
    assert!(html.contains("This quiz could not be loaded."), "missing error in {html}");
    assert!(html.contains("Back to quizzes"), "missing back button in {html}");
}
