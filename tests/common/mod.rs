#![allow(dead_code)]

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

use dict_engine::cache::MemoryCache;
use dict_engine::config::Config;
use dict_engine::models::{Entry, Pagination, Query, Relation};
use dict_engine::services::entry_service;
use dict_engine::store::{MemStore, PgStore, Store};
use dict_engine::tokenizer::LangTable;
use dict_engine::AppState;

/// 测试用插件: 小写整词 + 四字母前缀, 输入 "boom" 时抛错
pub const TEST_SCRIPT: &str = r#"
local function prefix(w)
    if utf8.len(w) > 4 then
        return string.sub(w, 1, utf8.offset(w, 5) - 1)
    end
    return nil
end

function tokenize(text, lang)
    local out = {}
    for w in utils.words(string.lower(text)) do
        table.insert(out, w .. ":1")
        local p = prefix(w)
        if p then
            table.insert(out, p .. ":3")
        end
    end
    return out
end

function to_query(text, lang)
    if utils.trim(text) == "boom" then
        error("cannot handle boom")
    end
    local terms = {}
    for w in utils.words(string.lower(text)) do
        local p = prefix(w)
        if p then
            table.insert(terms, "(" .. w .. " | " .. p .. ")")
        else
            table.insert(terms, w)
        end
    end
    return table.concat(terms, " & ")
end
"#;

pub struct TestApp {
    pub state: AppState,
    // 插件目录需要活到测试结束
    _dir: TempDir,
    /// Postgres 测试用的独立 schema, 结束时删除
    pg: Option<(PgPool, String)>,
}

impl TestApp {
    pub async fn finish(self) {
        if let Some((pool, schema)) = self.pg {
            let _ = pool.execute(format!("DROP SCHEMA {} CASCADE", schema).as_str()).await;
        }
    }
}

pub fn app() -> TestApp {
    app_with_store(Arc::new(MemStore::new()))
}

/// 连接 `DATABASE_URL`, 在一个新建的 schema 里建表; 未设置时返回 None
pub async fn pg_app() -> Option<TestApp> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let schema = format!("dict_test_{}", uuid::Uuid::new_v4().simple());
    let admin = PgPool::connect(&url).await.unwrap();
    admin
        .execute(format!("CREATE SCHEMA {}", schema).as_str())
        .await
        .unwrap();

    let opts = PgConnectOptions::from_str(&url)
        .unwrap()
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_with(opts)
        .await
        .unwrap();
    let store = PgStore::new(pool);
    store.migrate().await.unwrap();

    let mut t = app_with_store(Arc::new(store));
    t.pg = Some((admin, schema));
    Some(t)
}

pub fn app_with_store(store: Arc<dyn Store>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("custom.lua"), TEST_SCRIPT).unwrap();

    let raw = format!(
        r#"
[app]
tokenizers_dir = "{}"
enable_submissions = true

[lang.english]
name = "English"
tokenizer = "english"
tokenizer_type = "builtin"
types = {{ noun = "Noun", verb = "Verb" }}

[lang.italian]
name = "Italiano"
tokenizer = "italian"
tokenizer_type = "builtin"
types = {{ noun = "Sostantivo" }}

[lang.malayalam]
name = "Malayalam"
tokenizer = "malayalam"
tokenizer_type = "phonetic"
num_keys = 2

[lang.custom]
name = "Custom"
tokenizer = "custom"
tokenizer_type = "script"
"#,
        dir.path().display()
    );

    let config = Config::from_toml_str(&raw).unwrap();
    let langs = LangTable::build(&config).unwrap();
    let state = AppState::new(config, langs, store);

    TestApp {
        state,
        _dir: dir,
        pg: None,
    }
}

pub fn app_with_cache() -> TestApp {
    let TestApp { state, _dir, pg } = app();
    let state = state.with_cache(Arc::new(MemoryCache::new(None, 100)));
    TestApp { state, _dir, pg }
}

pub async fn add(state: &AppState, lang: &str, content: &str) -> Entry {
    entry_service::insert_entry(state, Entry::new(lang, &[content]))
        .await
        .unwrap()
}

pub async fn link(state: &AppState, from: &Entry, to: &Entry, types: &[&str]) -> i64 {
    let r = Relation {
        types: types.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };
    entry_service::insert_relation(state, from.id, to.id, r).await.unwrap()
}

pub fn query(from: &str, q: &str) -> Query {
    Query {
        query: q.to_string(),
        from_lang: from.to_string(),
        to_lang: "*".to_string(),
        ..Default::default()
    }
}

pub fn page(n: i64, per_page: i64) -> Pagination {
    Pagination::new(Some(n), Some(per_page), 10, 50)
}
