use quiz_core::model::{ProgressMap, QuestionIndex, QuestionSet, QuizId};
use storage::repository::Storage;

const CAPITALS: &str = "\
question_number,question,options,correct_option
1,Capital of France?,Paris|Lyon,Paris
2,Capital of Spain?,Madrid|Seville,Madrid
";

#[tokio::test]
async fn local_storage_roundtrips_sources_and_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("capitals.csv"), CAPITALS).expect("write source");
    std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write other");

    let storage = Storage::local(dir.path());
    let ids = storage.sources.list_sources().await.unwrap();
    let quiz_id = QuizId::new("capitals").unwrap();
    assert_eq!(ids, vec![quiz_id.clone()]);

    let text = storage.sources.read_source(&quiz_id).await.unwrap();
    let questions = QuestionSet::from_csv_str(&text).unwrap();
    assert_eq!(questions.len(), 2);

    assert_eq!(storage.progress.read_snapshot(&quiz_id).await.unwrap(), None);

    let mut map = ProgressMap::new();
    map.record(QuestionIndex::new(0), Some("Paris".into()));
    map.record(QuestionIndex::new(1), None);
    let bytes = serde_json::to_vec(&map).unwrap();
    storage.progress.write_snapshot(&quiz_id, &bytes).await.unwrap();

    let on_disk = std::fs::read_to_string(dir.path().join("capitals_progress.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(json, serde_json::json!({"0": {"selected": "Paris"}, "1": {"selected": null}}));

    let restored = storage.progress.read_snapshot(&quiz_id).await.unwrap().unwrap();
    let restored: ProgressMap = serde_json::from_slice(&restored).unwrap();
    assert_eq!(restored, map);
}
