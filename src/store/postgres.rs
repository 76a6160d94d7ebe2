use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{Executor, FromRow};
use std::collections::{BTreeMap, HashSet};

use super::{IndexTokens, Indexed, RelationParams, SearchParams, Store, StoreError};
use crate::models::{Comment, Entry, GlossaryWord, RelatedEntry, Relation, Stats, Status};
use crate::services::rank::simple_tokens;

const SCHEMA: &str = include_str!("../../migrations/schema.sql");

/// 词条的公共列, tsvector 以文本形式取出
const ENTRY_COLS: &str = "e.id, e.guid, e.content, e.initial, e.weight, e.tokens::TEXT AS tokens, \
    e.lang, e.tags, e.phones, e.notes, e.meta, e.status, e.created_at, e.updated_at";

/// 直接匹配与分词匹配两个 CTE 的并集, 窗口函数给出分页前的总数
///
/// $1 原始查询, $2 内置词典名, $3 预生成查询, $4 语言, $5 标签, $6 状态,
/// $7 offset, $8 limit, $9 类型, $10 前缀长度, $11 完全匹配加成, $12 简单词
const SEARCH_SQL: &str = r#"
WITH q AS (
    SELECT COALESCE(
        PLAINTO_TSQUERY(NULLIF($2, '')::REGCONFIG, $1),
        NULLIF($3, '')::TSQUERY
    ) AS query
),
filtered AS (
    SELECT e.* FROM entries e
    WHERE e.lang = $4
        AND e.status = $6
        AND (CARDINALITY($5::TEXT[]) = 0 OR e.tags && $5::TEXT[])
        AND (CARDINALITY($9::TEXT[]) = 0 OR EXISTS (
            SELECT 1 FROM relations r WHERE r.from_id = e.id AND r.types && $9::TEXT[]
        ))
),
direct AS (
    SELECT f.*,
        (LEAST(CHAR_LENGTH(f.content[1]), $10::INT) - $10::INT)::FLOAT8
        - (CASE WHEN LOWER(LEFT(f.content[1], $10::INT)) = LOWER(LEFT($1, $10::INT))
            THEN $11::FLOAT8 ELSE 0 END) AS rank
    FROM filtered f
    WHERE LOWER(LEFT(f.content[1], $10::INT)) = LOWER(LEFT($1, $10::INT))
        OR REGEXP_SPLIT_TO_ARRAY(LOWER(ARRAY_TO_STRING(f.content, ' ')), '\s+') && $12::TEXT[]
),
fulltext AS (
    SELECT f.*, (1 - TS_RANK(f.tokens, q.query))::FLOAT8 AS rank
    FROM filtered f, q
    WHERE q.query IS NOT NULL
        AND f.tokens @@ q.query
        AND f.id NOT IN (SELECT id FROM direct)
),
combined AS (
    SELECT * FROM direct
    UNION ALL
    SELECT * FROM fulltext
)
SELECT c.id, c.guid, c.content, c.initial, c.weight, c.tokens::TEXT AS tokens,
    c.lang, c.tags, c.phones, c.notes, c.meta, c.status, c.created_at, c.updated_at,
    c.rank, COUNT(*) OVER () AS total
FROM combined c
ORDER BY c.rank, c.id
OFFSET $7 LIMIT $8
"#;

const SEARCH_RELATIONS_SQL: &str = r#"
SELECT r.from_id,
    e.id, e.guid, e.content, e.initial, e.weight, e.tokens::TEXT AS tokens,
    e.lang, e.tags, e.phones, e.notes, e.meta, e.status, e.created_at, e.updated_at,
    r.id AS relation_id, r.types AS relation_types, r.tags AS relation_tags,
    r.notes AS relation_notes, r.weight AS relation_weight, r.status AS relation_status,
    r.created_at AS relation_created_at, r.updated_at AS relation_updated_at
FROM relations r
JOIN entries e ON e.id = r.to_id
WHERE r.from_id = ANY($1::BIGINT[])
    AND ($2 = '' OR e.lang = $2)
    AND (CARDINALITY($3::TEXT[]) = 0 OR r.types && $3::TEXT[])
    AND (CARDINALITY($4::TEXT[]) = 0 OR r.tags && $4::TEXT[])
    AND r.status = $5
    AND e.status = $5
ORDER BY r.from_id, r.weight, r.id
"#;

/// weight 为 0 时追加到同语言末尾; 有 dict 时由数据库生成 tsvector
const INSERT_ENTRY_SQL: &str = r#"
INSERT INTO entries (guid, content, initial, weight, tokens, lang, tags, phones, notes, meta, status)
VALUES (
    $1, $2, $3,
    CASE WHEN $4::FLOAT8 = 0
        THEN COALESCE((SELECT MAX(weight) FROM entries WHERE lang = $6), 0) + 1
        ELSE $4::FLOAT8 END,
    COALESCE(TO_TSVECTOR(NULLIF($5, '')::REGCONFIG, ARRAY_TO_STRING($2::TEXT[], ' ')), $12::TSVECTOR),
    $6, $7, $8, $9, $10, $11
)
RETURNING id
"#;

const UPDATE_ENTRY_SQL: &str = r#"
UPDATE entries SET
    content = $2,
    initial = $3,
    weight = CASE WHEN $4::FLOAT8 = 0 THEN weight ELSE $4::FLOAT8 END,
    tokens = COALESCE(TO_TSVECTOR(NULLIF($5, '')::REGCONFIG, ARRAY_TO_STRING($2::TEXT[], ' ')), $11::TSVECTOR),
    lang = $6,
    tags = $7,
    phones = $8,
    notes = $9,
    meta = $10,
    status = $12,
    updated_at = NOW()
WHERE id = $1
"#;

const INSERT_RELATION_SQL: &str = r#"
INSERT INTO relations (from_id, to_id, types, tags, notes, weight, status)
VALUES (
    $1, $2, $3, $4, $5,
    CASE WHEN $6::FLOAT8 = 0
        THEN COALESCE((SELECT MAX(weight) FROM relations WHERE from_id = $1), 0) + 1
        ELSE $6::FLOAT8 END,
    $7
)
RETURNING id
"#;

/// 关系检索的一行: 父词条 id + 子词条 + 关系列
#[derive(Debug, FromRow)]
struct RelationRow {
    from_id: i64,
    #[sqlx(flatten)]
    entry: Entry,
    relation_id: i64,
    relation_types: Vec<String>,
    relation_tags: Vec<String>,
    relation_notes: String,
    relation_weight: f64,
    relation_status: Status,
    relation_created_at: Option<DateTime<Utc>>,
    relation_updated_at: Option<DateTime<Utc>>,
}

impl From<RelationRow> for RelatedEntry {
    fn from(row: RelationRow) -> Self {
        let mut entry = row.entry;
        entry.relation = Some(Relation {
            id: row.relation_id,
            types: row.relation_types,
            tags: row.relation_tags,
            notes: row.relation_notes,
            weight: row.relation_weight,
            status: row.relation_status,
            created_at: row.relation_created_at,
            updated_at: row.relation_updated_at,
        });
        RelatedEntry {
            from_id: row.from_id,
            entry,
        }
    }
}

/// (内置词典名, 预生成 tsvector), 二者只有一个非空
fn index_args(idx: &IndexTokens) -> (&str, &str) {
    match idx {
        IndexTokens::Native { dict } => (dict.as_str(), ""),
        IndexTokens::Precomputed(t) => ("", t.as_str()),
    }
}

async fn insert_entry(conn: &mut PgConnection, e: &Indexed) -> Result<i64, StoreError> {
    let (dict, tokens) = index_args(&e.index);
    let en = &e.entry;

    sqlx::query_scalar::<_, i64>(INSERT_ENTRY_SQL)
        .bind(&en.guid)
        .bind(&en.content)
        .bind(&en.initial)
        .bind(en.weight)
        .bind(dict)
        .bind(&en.lang)
        .bind(&en.tags)
        .bind(&en.phones)
        .bind(&en.notes)
        .bind(&en.meta)
        .bind(en.status)
        .bind(tokens)
        .fetch_one(&mut *conn)
        .await
        .map_err(StoreError::from_sqlx)
}

async fn insert_relation(
    conn: &mut PgConnection,
    from_id: i64,
    to_id: i64,
    r: &Relation,
) -> Result<i64, StoreError> {
    sqlx::query_scalar::<_, i64>(INSERT_RELATION_SQL)
        .bind(from_id)
        .bind(to_id)
        .bind(&r.types)
        .bind(&r.tags)
        .bind(&r.notes)
        .bind(r.weight)
        .bind(r.status)
        .fetch_one(&mut *conn)
        .await
        .map_err(StoreError::from_sqlx)
}

/// guid 不存在时不插入任何行, fetch_one 得到 RowNotFound
const INSERT_COMMENT_SQL: &str = "
WITH f AS (SELECT id FROM entries WHERE guid = $1),
     t AS (SELECT id FROM entries WHERE guid = NULLIF($2, ''))
INSERT INTO comments (from_id, to_id, comments)
SELECT f.id, (SELECT id FROM t), $3 FROM f
WHERE $2 = '' OR EXISTS (SELECT 1 FROM t)
RETURNING id";

/// 影响 0 行视为未找到
fn affected(rows: u64) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

/// Postgres 存储, 使用原生全文检索
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// 建表 (幂等)
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!(">>> 初始化数据库表结构");
        self.pool.execute(SCHEMA).await?;
        tracing::info!("<<< 表结构就绪");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn search_page(&self, p: &SearchParams) -> Result<Vec<Entry>, StoreError> {
        sqlx::query_as::<_, Entry>(SEARCH_SQL)
            .bind(&p.raw_query)
            .bind(&p.builtin_dict)
            .bind(&p.precomputed_query)
            .bind(&p.lang)
            .bind(&p.tags)
            .bind(p.status)
            .bind(p.offset)
            .bind(p.limit)
            .bind(&p.types)
            .bind(p.rank.prefix_len as i32)
            .bind(p.rank.bonus)
            .bind(simple_tokens(&p.raw_query))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn search(&self, p: &SearchParams) -> Result<(Vec<Entry>, i64), StoreError> {
        let rows = self.search_page(p).await?;
        if let Some(first) = rows.first() {
            let total = first.total;
            return Ok((rows, total));
        }
        if p.offset == 0 {
            return Ok((rows, 0));
        }

        // 超出末页时窗口总数取不到, 用第一页补查
        let first_page = SearchParams {
            offset: 0,
            limit: 1,
            ..p.clone()
        };
        let total = self
            .search_page(&first_page)
            .await?
            .first()
            .map(|e| e.total)
            .unwrap_or(0);
        Ok((rows, total))
    }

    async fn search_relations(&self, p: &RelationParams) -> Result<Vec<RelatedEntry>, StoreError> {
        if p.parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RelationRow>(SEARCH_RELATIONS_SQL)
            .bind(&p.parent_ids)
            .bind(p.to_lang.as_deref().unwrap_or(""))
            .bind(&p.types)
            .bind(&p.tags)
            .bind(p.status)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(rows.into_iter().map(RelatedEntry::from).collect())
    }

    async fn get_entry(&self, id: i64, guid: &str) -> Result<Entry, StoreError> {
        let sql = format!(
            "SELECT {} FROM entries e WHERE CASE WHEN $1 > 0 THEN e.id = $1 ELSE e.guid = $2 END",
            ENTRY_COLS
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .bind(guid)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get_parent_entries(&self, id: i64) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            "SELECT {} FROM entries e JOIN relations r ON r.from_id = e.id \
             WHERE r.to_id = $1 ORDER BY e.weight, e.id",
            ENTRY_COLS
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_entry(&self, e: &Indexed) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut conn, e).await
    }

    async fn update_entry(&self, id: i64, e: &Indexed) -> Result<(), StoreError> {
        let (dict, tokens) = index_args(&e.index);
        let en = &e.entry;

        let res = sqlx::query(UPDATE_ENTRY_SQL)
            .bind(id)
            .bind(&en.content)
            .bind(&en.initial)
            .bind(en.weight)
            .bind(dict)
            .bind(&en.lang)
            .bind(&en.tags)
            .bind(&en.phones)
            .bind(&en.notes)
            .bind(&en.meta)
            .bind(tokens)
            .bind(en.status)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        affected(res.rows_affected())
    }

    async fn delete_entry(&self, id: i64) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        affected(res.rows_affected())
    }

    async fn insert_relation(&self, from_id: i64, to_id: i64, r: &Relation) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_relation(&mut conn, from_id, to_id, r).await
    }

    async fn update_relation(&self, id: i64, r: &Relation) -> Result<(), StoreError> {
        let res = sqlx::query(
            "UPDATE relations SET types = $2, tags = $3, notes = $4, \
             weight = CASE WHEN $5::FLOAT8 = 0 THEN weight ELSE $5::FLOAT8 END, \
             status = $6, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&r.types)
        .bind(&r.tags)
        .bind(&r.notes)
        .bind(r.weight)
        .bind(r.status)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        affected(res.rows_affected())
    }

    async fn delete_relation(&self, id: i64) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM relations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        affected(res.rows_affected())
    }

    async fn reorder_relations(&self, ids: &[i64]) -> Result<(), StoreError> {
        if ids.iter().collect::<HashSet<_>>().len() != ids.len() {
            return Err(StoreError::Constraint("duplicate relation ids".into()));
        }

        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, (i64, i64, f64)>(
            "SELECT id, from_id, weight FROM relations WHERE id = ANY($1::BIGINT[]) \
             ORDER BY weight, id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        if rows.len() != ids.len() {
            return Err(StoreError::NotFound);
        }
        if rows.windows(2).any(|w| w[0].1 != w[1].1) {
            return Err(StoreError::Constraint("relations belong to different entries".into()));
        }

        // 已经是当前顺序, 不改动
        if rows.iter().map(|r| r.0).eq(ids.iter().copied()) {
            return Ok(());
        }

        sqlx::query(
            "UPDATE relations AS r SET weight = v.pos, updated_at = NOW() \
             FROM UNNEST($1::BIGINT[]) WITH ORDINALITY AS v(id, pos) WHERE r.id = v.id",
        )
        .bind(ids)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_initials(&self, lang: &str) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT e.initial FROM entries e \
             WHERE e.lang = $1 AND e.status = 'enabled' AND e.initial <> '' \
             AND EXISTS (SELECT 1 FROM relations r WHERE r.from_id = e.id) \
             ORDER BY e.initial",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_glossary_words(
        &self,
        lang: &str,
        initial: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<GlossaryWord>, i64), StoreError> {
        const FILTER: &str = "FROM entries e WHERE e.lang = $1 AND e.initial = $2 \
            AND e.status = 'enabled' \
            AND EXISTS (SELECT 1 FROM relations r WHERE r.from_id = e.id)";

        let words = sqlx::query_as::<_, GlossaryWord>(&format!(
            "SELECT e.id, e.guid, e.content, COUNT(*) OVER () AS total {} \
             ORDER BY e.weight, e.id OFFSET $3 LIMIT $4",
            FILTER
        ))
        .bind(lang)
        .bind(initial)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        let total = match words.first() {
            Some(w) => w.total,
            None => sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", FILTER))
                .bind(lang)
                .bind(initial)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from_sqlx)?,
        };
        Ok((words, total))
    }

    async fn get_stats(&self) -> Result<Stats, StoreError> {
        let langs = sqlx::query_as::<_, (String, i64)>(
            "SELECT lang, COUNT(*) FROM entries GROUP BY lang",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        let relations = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM relations")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        let languages: BTreeMap<String, i64> = langs.into_iter().collect();
        Ok(Stats {
            entries: languages.values().sum(),
            relations,
            languages,
        })
    }

    async fn get_pending_entries(
        &self,
        lang: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Entry>, i64), StoreError> {
        let sql = format!(
            "SELECT {}, COUNT(*) OVER () AS total FROM entries e \
             WHERE e.status = 'pending' AND ($1 = '' OR e.lang = $1) \
             AND NOT EXISTS (SELECT 1 FROM relations r WHERE r.to_id = e.id) \
             ORDER BY e.created_at DESC, e.id DESC OFFSET $2 LIMIT $3",
            ENTRY_COLS
        );
        let rows = sqlx::query_as::<_, Entry>(&sql)
            .bind(lang.unwrap_or(""))
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        let total = rows.first().map(|e| e.total).unwrap_or(0);
        Ok((rows, total))
    }

    async fn insert_submission(
        &self,
        head: &Indexed,
        definition: Option<(&Indexed, &Relation)>,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut head = head.clone();
        head.entry.status = Status::Pending;
        let id = insert_entry(&mut tx, &head).await?;

        if let Some((def, rel)) = definition {
            let mut def = def.clone();
            def.entry.status = Status::Pending;
            let to_id = insert_entry(&mut tx, &def).await?;

            let mut rel = rel.clone();
            rel.status = Status::Pending;
            insert_relation(&mut tx, id, to_id, &rel).await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn approve_submission(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM entries WHERE id = $1 AND status = 'pending' FOR UPDATE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        for sql in [
            "UPDATE entries SET status = 'enabled', updated_at = NOW() \
             WHERE status = 'pending' AND id IN \
             (SELECT to_id FROM relations WHERE from_id = $1 AND status = 'pending')",
            "UPDATE relations SET status = 'enabled', updated_at = NOW() \
             WHERE from_id = $1 AND status = 'pending'",
            "UPDATE entries SET status = 'enabled', updated_at = NOW() WHERE id = $1",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn reject_submission(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM entries WHERE id = $1 AND status = 'pending' FOR UPDATE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        for sql in [
            // 只删除不再被其他词条引用的待审释义
            "DELETE FROM entries e WHERE e.status = 'pending' AND e.id IN \
             (SELECT to_id FROM relations WHERE from_id = $1 AND status = 'pending') \
             AND NOT EXISTS (SELECT 1 FROM relations r WHERE r.to_id = e.id AND r.from_id <> $1)",
            "DELETE FROM relations WHERE from_id = $1 AND status = 'pending'",
            "DELETE FROM entries WHERE id = $1",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_all_pending(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for sql in [
            "DELETE FROM relations WHERE status = 'pending'",
            "DELETE FROM entries WHERE status = 'pending'",
            "DELETE FROM comments",
        ] {
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_comment(&self, from_guid: &str, to_guid: &str, comments: &str) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(INSERT_COMMENT_SQL)
            .bind(from_guid)
            .bind(to_guid)
            .bind(comments)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get_comments(&self) -> Result<Vec<Comment>, StoreError> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.from_id, c.to_id, c.comments, c.created_at, \
             f.guid AS from_guid, t.guid AS to_guid \
             FROM comments c \
             JOIN entries f ON f.id = c.from_id \
             LEFT JOIN entries t ON t.id = c.to_id \
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn delete_comment(&self, id: i64) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        affected(res.rows_affected())
    }

    async fn get_words(&self, lang: &str) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT content[1] FROM entries WHERE lang = $1 AND status = 'enabled'",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_suggestions(&self, lang: &str, prefix: &str, limit: i64) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT content[1] FROM entries \
             WHERE lang = $1 AND status = 'enabled' AND STARTS_WITH(LOWER(content[1]), $2) \
             ORDER BY weight, id LIMIT $3",
        )
        .bind(lang)
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }
}
