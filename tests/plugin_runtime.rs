mod common;

use common::{add, app, page, query};
use dict_engine::services::search_service;
use dict_engine::tokenizer::TokenizeError;
use dict_engine::Error;

#[tokio::test]
async fn script_failure_only_fails_that_request() {
    let t = app();
    let s = &t.state;
    let e = add(s, "custom", "fine words").await;

    let err = search_service::search(s, &query("custom", "boom"), &page(1, 10), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Tokenization(TokenizeError::Script(_))));
    assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    // 调度表和后续请求不受影响
    let res = search_service::search(s, &query("custom", "fine"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.entries[0].id, e.id);
    assert!(s.langs.contains("custom"));
}

#[tokio::test]
async fn script_tokens_are_stored_with_weights() {
    let t = app();
    let e = add(&t.state, "custom", "Wonderful day").await;

    assert!(e.tokens.contains("'wonderful':"));
    assert!(e.tokens.contains("'wond':"));
    assert!(e.tokens.contains("'day':"));
}

#[tokio::test]
async fn concurrent_searches_share_one_script() {
    let t = std::sync::Arc::new(app());
    add(&t.state, "custom", "Wonderful").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let t = t.clone();
        handles.push(tokio::spawn(async move {
            search_service::search(&t.state, &query("custom", "wonders"), &page(1, 10), false)
                .await
                .map(|r| r.total)
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap(), 1);
    }
}
