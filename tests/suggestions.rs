mod common;

use common::{add, app};
use dict_engine::services::{submission_service, suggest_service};
use dict_engine::models::{Submission, SubmittedEntry};
use dict_engine::Error;

#[tokio::test]
async fn prefix_suggestions_from_trie_and_store() {
    let t = app();
    let s = &t.state;
    add(s, "english", "Apple").await;
    add(s, "english", "apricot").await;
    add(s, "english", "banana").await;
    suggest_service::rebuild(s).await.unwrap();

    let mut words = suggest_service::suggest(s, "english", "AP").await.unwrap();
    words.sort();
    assert_eq!(words, vec!["apple", "apricot"]);

    // 建树之后新增的词条由存储层补足
    add(s, "english", "apex").await;
    let words = suggest_service::suggest(s, "english", "ape").await.unwrap();
    assert_eq!(words, vec!["apex"]);

    assert!(suggest_service::suggest(s, "italian", "ap").await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_entries_are_not_suggested() {
    let t = app();
    let s = &t.state;
    let sub = Submission {
        entry: SubmittedEntry::new("english", &["Quince"]),
        definition: None,
        relation: Default::default(),
    };
    submission_service::submit(s, sub).await.unwrap();
    suggest_service::rebuild(s).await.unwrap();

    assert!(suggest_service::suggest(s, "english", "qu").await.unwrap().is_empty());
}

#[tokio::test]
async fn suggestion_limits_and_errors() {
    let mut t = app();
    for i in 0..15 {
        add(&t.state, "english", &format!("cat{}", i)).await;
    }
    add(&t.state, "english", "catalog").await;
    suggest_service::rebuild(&t.state).await.unwrap();

    // 数字被归一化掉, cat0..cat14 都变成 "cat"
    let words = suggest_service::suggest(&t.state, "english", "cat").await.unwrap();
    assert_eq!(words.len(), 2);
    assert!(words.contains(&"cat".to_string()));
    assert!(words.contains(&"catalog".to_string()));

    assert!(matches!(
        suggest_service::suggest(&t.state, "english", " 42 ").await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        suggest_service::suggest(&t.state, "klingon", "qa").await,
        Err(Error::Validation(_))
    ));

    t.state.config.search.suggestions = false;
    assert!(suggest_service::suggest(&t.state, "english", "cat").await.unwrap().is_empty());
}
