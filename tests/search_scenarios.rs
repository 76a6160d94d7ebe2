mod common;

use common::{add, app, app_with_cache, link, page, query};
use dict_engine::models::{Query, Relation};
use dict_engine::services::{entry_service, glossary_service, search_service};
use dict_engine::Error;

#[tokio::test]
async fn apple_returns_both_definitions_in_weight_order() {
    let t = app();
    let s = &t.state;

    let apple = add(s, "english", "Apple").await;
    let fruit = add(s, "english", "round, red or yellow, edible fruit of a small tree").await;
    let pomo = add(s, "italian", "il pomo.").await;
    link(s, &apple, &fruit, &["noun"]).await;
    link(s, &apple, &pomo, &["noun"]).await;

    let res = search_service::search(s, &query("english", "apple"), &page(1, 10), false)
        .await
        .unwrap();

    assert_eq!(res.total, 1);
    assert_eq!(res.entries.len(), 1);

    let defs: Vec<&str> = res.entries[0].relations.iter().map(|e| e.head()).collect();
    assert_eq!(defs, vec!["round, red or yellow, edible fruit of a small tree", "il pomo."]);

    let weights: Vec<f64> = res.entries[0]
        .relations
        .iter()
        .map(|e| e.relation.as_ref().unwrap().weight)
        .collect();
    assert!(weights[0] < weights[1]);
}

#[tokio::test]
async fn to_lang_filters_definitions() {
    let t = app();
    let s = &t.state;

    let apple = add(s, "english", "Apple").await;
    let fruit = add(s, "english", "a fruit").await;
    let pomo = add(s, "italian", "il pomo.").await;
    link(s, &apple, &fruit, &["noun"]).await;
    link(s, &apple, &pomo, &["noun"]).await;

    let mut q = query("english", "apple");
    q.to_lang = "italian".into();
    let res = search_service::search(s, &q, &page(1, 10), false).await.unwrap();

    assert_eq!(res.entries[0].relations.len(), 1);
    assert_eq!(res.entries[0].relations[0].head(), "il pomo.");
}

#[tokio::test]
async fn parents_without_definitions_get_empty_list() {
    let t = app();
    let s = &t.state;
    add(s, "english", "Lonely").await;

    let res = search_service::search(s, &query("english", "lonely"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.total, 1);
    assert!(res.entries[0].relations.is_empty());
}

#[tokio::test]
async fn unknown_type_is_a_validation_error() {
    let t = app();
    let s = &t.state;
    add(s, "english", "Apple").await;

    let mut q = query("english", "apple");
    q.types = vec!["bogus".into()];
    let err = search_service::search(s, &q, &page(1, 10), false).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn bad_requests_are_rejected_before_search() {
    let t = app();
    let s = &t.state;

    let cases = [
        query("english", "   "),
        query("klingon", "apple"),
        Query {
            to_lang: "klingon".into(),
            ..query("english", "apple")
        },
    ];
    for q in cases {
        let err = search_service::search(s, &q, &page(1, 10), false).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{:?}", q);
    }
}

#[tokio::test]
async fn exact_match_ranks_before_fulltext() {
    let t = app();
    let s = &t.state;

    add(s, "english", "running shoes for trails").await;
    add(s, "english", "a runner's guide").await;
    add(s, "english", "Run").await;

    let res = search_service::search(s, &query("english", "run"), &page(1, 10), false)
        .await
        .unwrap();

    assert_eq!(res.entries[0].head(), "Run");
    assert!(res.entries.iter().any(|e| e.head() == "running shoes for trails"));

    let ranks: Vec<f64> = res.entries.iter().map(|e| e.rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn type_filter_applies_to_parents() {
    let t = app();
    let s = &t.state;

    let walk = add(s, "english", "walk").await;
    let walk_def = add(s, "english", "to move on foot").await;
    link(s, &walk, &walk_def, &["verb"]).await;

    let walker = add(s, "english", "walk of fame").await;
    let walker_def = add(s, "english", "a path").await;
    link(s, &walker, &walker_def, &["noun"]).await;

    let mut q = query("english", "walk");
    q.types = vec!["verb".into()];
    let res = search_service::search(s, &q, &page(1, 10), false).await.unwrap();

    assert_eq!(res.total, 1);
    assert_eq!(res.entries[0].head(), "walk");
}

#[tokio::test]
async fn total_is_stable_across_pages() {
    let t = app();
    let s = &t.state;
    for i in 0..15 {
        add(s, "english", &format!("apple variety {}", i)).await;
    }

    let q = query("english", "apple");
    let first = search_service::search(s, &q, &page(1, 10), false).await.unwrap();
    let second = search_service::search(s, &q, &page(2, 10), false).await.unwrap();
    let all = search_service::search(s, &q, &page(1, 50), false).await.unwrap();

    assert_eq!(first.total, 15);
    assert_eq!(second.total, 15);
    assert_eq!(all.total, 15);
    assert_eq!(first.entries.len(), 10);
    assert_eq!(second.entries.len(), 5);
    assert_eq!(all.entries.len(), 15);
    assert_eq!(first.total_pages, 2);

    // 两页合起来不重复且覆盖全部
    let mut ids: Vec<i64> = first.entries.iter().chain(second.entries.iter()).map(|e| e.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 15);
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    let t = app();
    let s = &t.state;
    add(s, "english", "apple").await;

    let q = query("english", "apple");
    let res = search_service::search(s, &q, &page(i64::MAX, 10), true).await.unwrap();
    assert!(res.entries.is_empty());
    assert_eq!(res.total, 1);

    let words = glossary_service::words(s, "english", "A", &page(i64::MAX, 10), true)
        .await
        .unwrap();
    assert!(words.words.is_empty());
}

#[tokio::test]
async fn round_trip_builtin_tokenizer() {
    let t = app();
    let s = &t.state;
    let e = add(s, "english", "Thoroughly amazing dictionaries").await;

    let res = search_service::search(s, &query("english", "Thoroughly amazing dictionaries"), &page(1, 10), false)
        .await
        .unwrap();
    assert!(res.entries.iter().any(|x| x.id == e.id));

    // 只靠词干匹配
    let res = search_service::search(s, &query("english", "dictionary"), &page(1, 10), false)
        .await
        .unwrap();
    assert!(res.entries.iter().any(|x| x.id == e.id));
}

#[tokio::test]
async fn round_trip_phonetic_tokenizer() {
    let t = app();
    let s = &t.state;
    let e = add(s, "malayalam", "മരം").await;
    assert!(!e.tokens.is_empty());

    let res = search_service::search(s, &query("malayalam", "മരം"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.entries[0].id, e.id);

    // 拉丁转写与原文共享音形键
    let res = search_service::search(s, &query("malayalam", "maram"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.total, 1);
    assert_eq!(res.entries[0].id, e.id);
}

#[tokio::test]
async fn round_trip_script_tokenizer() {
    let t = app();
    let s = &t.state;
    let e = add(s, "custom", "Wonderful").await;

    let res = search_service::search(s, &query("custom", "Wonderful"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.entries[0].id, e.id);

    // 通过前缀 token 命中
    let res = search_service::search(s, &query("custom", "wonders"), &page(1, 10), false)
        .await
        .unwrap();
    assert_eq!(res.total, 1);
    assert!(res.entries[0].rank > 0.0);
}

#[tokio::test]
async fn public_results_hide_ids_and_are_cached() {
    let t = app_with_cache();
    let s = &t.state;

    let apple = add(s, "english", "Apple").await;
    let fruit = add(s, "english", "a fruit").await;
    link(s, &apple, &fruit, &["noun"]).await;

    let q = query("english", "apple");
    let res = search_service::search(s, &q, &page(1, 10), true).await.unwrap();
    assert_eq!(res.entries[0].id, 0);
    assert_eq!(res.entries[0].relations[0].id, 0);
    assert_eq!(res.entries[0].relations[0].relation.as_ref().unwrap().id, 0);

    // 删除后公开查询仍命中缓存, 管理端查询看到实时结果
    entry_service::delete_entry(s, apple.id, true).await.unwrap();
    let cached = search_service::search(s, &q, &page(1, 10), true).await.unwrap();
    assert_eq!(cached.total, 1);
    assert_eq!(cached.entries[0].relations.len(), 1);

    let live = search_service::search(s, &q, &page(1, 10), false).await.unwrap();
    assert_eq!(live.total, 0);
}

#[tokio::test]
async fn reorder_in_current_order_changes_nothing() {
    let t = app();
    let s = &t.state;

    let head = add(s, "english", "set").await;
    let mut ids = Vec::new();
    for (i, w) in [5.0, 10.0, 20.0].into_iter().enumerate() {
        let def = add(s, "english", &format!("meaning {}", i)).await;
        let r = Relation {
            weight: w,
            ..Default::default()
        };
        ids.push(entry_service::insert_relation(s, head.id, def.id, r).await.unwrap());
    }

    let weights = |e: &dict_engine::models::Entry| -> Vec<(i64, f64)> {
        e.relations
            .iter()
            .map(|r| {
                let rel = r.relation.as_ref().unwrap();
                (rel.id, rel.weight)
            })
            .collect()
    };

    entry_service::reorder_relations(s, &ids).await.unwrap();
    let e = entry_service::get_entry(s, head.id, "").await.unwrap();
    assert_eq!(weights(&e), vec![(ids[0], 5.0), (ids[1], 10.0), (ids[2], 20.0)]);

    let new_order = vec![ids[2], ids[0], ids[1]];
    entry_service::reorder_relations(s, &new_order).await.unwrap();
    let e = entry_service::get_entry(s, head.id, "").await.unwrap();
    assert_eq!(weights(&e), vec![(ids[2], 1.0), (ids[0], 2.0), (ids[1], 3.0)]);
}

#[tokio::test]
async fn reorder_across_parents_changes_nothing() {
    let t = app();
    let s = &t.state;

    let a = add(s, "english", "alpha").await;
    let b = add(s, "english", "beta").await;
    let d1 = add(s, "english", "first").await;
    let d2 = add(s, "english", "second").await;
    let r1 = link(s, &a, &d1, &[]).await;
    let r2 = link(s, &b, &d2, &[]).await;

    assert!(entry_service::reorder_relations(s, &[r2, r1]).await.is_err());

    let e = entry_service::get_entry(s, a.id, "").await.unwrap();
    assert_eq!(e.relations[0].relation.as_ref().unwrap().weight, 1.0);
}

#[tokio::test]
async fn deleting_a_definition_needs_force() {
    let t = app();
    let s = &t.state;

    let head = add(s, "english", "Apple").await;
    let def = add(s, "english", "a fruit").await;
    link(s, &head, &def, &["noun"]).await;

    let parents = entry_service::get_parents(s, def.id).await.unwrap();
    assert_eq!(parents[0].id, head.id);

    let err = entry_service::delete_entry(s, def.id, false).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // 删除父词条只去掉关系, 释义保留
    entry_service::delete_entry(s, head.id, false).await.unwrap();
    let def = entry_service::get_entry(s, def.id, "").await.unwrap();
    assert!(entry_service::get_parents(s, def.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_fills_defaults() {
    let t = app();
    let s = &t.state;

    let e = add(s, "english", "  apple  ").await;
    assert_eq!(e.content, vec!["apple"]);
    assert_eq!(e.initial, "A");
    assert!(!e.guid.is_empty());
    assert_eq!(e.weight, 1.0);

    let by_guid = entry_service::get_entry(s, 0, &e.guid).await.unwrap();
    assert_eq!(by_guid.id, e.id);

    let err = entry_service::insert_entry(s, dict_engine::models::Entry::new("english", &[" "]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = entry_service::insert_entry(s, dict_engine::models::Entry::new("klingon", &["qapla"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // 手工给出的 tokens 格式不对是客户端错误
    let mut bad = dict_engine::models::Entry::new("english", &["pear"]);
    bad.tokens = "'unterminated".into();
    let err = entry_service::insert_entry(s, bad).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn glossary_and_stats() {
    let t = app();
    let s = &t.state;

    let apple = add(s, "english", "Apple").await;
    let banana = add(s, "english", "banana").await;
    let fruit = add(s, "italian", "frutta").await;
    link(s, &apple, &fruit, &["noun"]).await;
    link(s, &banana, &fruit, &["noun"]).await;
    add(s, "english", "orphan").await;

    let initials = glossary_service::initials(s, "english").await.unwrap();
    assert_eq!(initials, vec!["A", "B"]);

    let words = glossary_service::words(s, "english", "A", &page(1, 10), true).await.unwrap();
    assert_eq!(words.total, 1);
    assert_eq!(words.words[0].content, vec!["Apple"]);
    assert_eq!(words.words[0].id, 0);

    let stats = glossary_service::stats(s).await.unwrap();
    assert_eq!(stats.entries, 4);
    assert_eq!(stats.relations, 2);
    assert_eq!(stats.languages.get("english"), Some(&3));

    assert!(matches!(
        glossary_service::initials(s, "klingon").await,
        Err(Error::Validation(_))
    ));
}
