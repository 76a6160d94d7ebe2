//! 存储驱动
//!
//! 两种实现共用一个接口:
//! - [`PgStore`]: Postgres, 原生全文检索 (tsvector/tsquery)
//! - [`MemStore`]: 进程内的文档/数组字段存储, 用于测试和 `--memory` 模式

mod memory;
mod postgres;
mod stopwords;
pub mod tsquery;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::models::{Comment, Entry, GlossaryWord, RelatedEntry, Relation, Stats, Status};
use crate::services::rank::RankParams;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("not found")]
    NotFound,
}

impl StoreError {
    /// 把 sqlx 错误细分为 未找到 / 约束冲突 / 其他
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                StoreError::Constraint(db.message().to_string())
            }
            e => StoreError::Db(e),
        }
    }
}

/// 写入时词条的索引方式
#[derive(Debug, Clone, PartialEq)]
pub enum IndexTokens {
    /// 由存储引擎按词典名对 content 做词干分析
    Native { dict: String },
    /// 已序列化好的 tsvector 文本
    Precomputed(String),
}

/// 待写入的词条及其索引方式
#[derive(Debug, Clone)]
pub struct Indexed {
    pub entry: Entry,
    pub index: IndexTokens,
}

/// 检索参数, 对应存储层的位置参数:
/// (raw_query, builtin_dict, precomputed_query, lang, tags, status, offset, limit)
/// 外加类型过滤和排序常量
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub raw_query: String,
    /// 内置词典名, 使用外部分词器时为空
    pub builtin_dict: String,
    /// 外部分词器生成的查询表达式, 使用内置词典时为空
    pub precomputed_query: String,
    pub lang: String,
    pub types: Vec<String>,
    pub tags: Vec<String>,
    pub status: Status,
    pub offset: i64,
    pub limit: i64,
    pub rank: RankParams,
}

/// 一批父词条的释义检索参数
#[derive(Debug, Clone)]
pub struct RelationParams {
    pub parent_ids: Vec<i64>,
    /// None 表示任意语言
    pub to_lang: Option<String>,
    pub types: Vec<String>,
    pub tags: Vec<String>,
    pub status: Status,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// 直接匹配与分词匹配的并集, 按 rank 升序分页, 同时返回总数
    async fn search(&self, p: &SearchParams) -> Result<(Vec<Entry>, i64), StoreError>;

    /// 一次查询取回所有父词条的释义, 按 (from_id, 关系权重) 排序
    async fn search_relations(&self, p: &RelationParams) -> Result<Vec<RelatedEntry>, StoreError>;

    /// 按 id 或 guid 获取词条 (id 为 0 时用 guid)
    async fn get_entry(&self, id: i64, guid: &str) -> Result<Entry, StoreError>;

    /// 以该词条为释义的所有父词条
    async fn get_parent_entries(&self, id: i64) -> Result<Vec<Entry>, StoreError>;

    async fn insert_entry(&self, e: &Indexed) -> Result<i64, StoreError>;
    async fn update_entry(&self, id: i64, e: &Indexed) -> Result<(), StoreError>;

    /// 删除词条及其出边, 不删除它指向的释义词条
    async fn delete_entry(&self, id: i64) -> Result<(), StoreError>;

    async fn insert_relation(&self, from_id: i64, to_id: i64, r: &Relation) -> Result<i64, StoreError>;
    async fn update_relation(&self, id: i64, r: &Relation) -> Result<(), StoreError>;
    async fn delete_relation(&self, id: i64) -> Result<(), StoreError>;

    /// 按给定顺序把同一父词条下的关系权重改写为 1..N, 全部成功或全部不变
    async fn reorder_relations(&self, ids: &[i64]) -> Result<(), StoreError>;

    async fn get_initials(&self, lang: &str) -> Result<Vec<String>, StoreError>;
    async fn get_glossary_words(
        &self,
        lang: &str,
        initial: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<GlossaryWord>, i64), StoreError>;

    async fn get_stats(&self) -> Result<Stats, StoreError>;

    /// 待审核的投稿词条 (不含投稿附带的释义词条)
    async fn get_pending_entries(
        &self,
        lang: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Entry>, i64), StoreError>;

    /// 在一个事务里写入投稿词条, 以及可选的释义词条和关系
    async fn insert_submission(
        &self,
        head: &Indexed,
        definition: Option<(&Indexed, &Relation)>,
    ) -> Result<i64, StoreError>;

    async fn approve_submission(&self, id: i64) -> Result<(), StoreError>;
    async fn reject_submission(&self, id: i64) -> Result<(), StoreError>;

    /// 删除所有待审核的词条、关系以及全部意见
    async fn delete_all_pending(&self) -> Result<(), StoreError>;

    /// 按 guid 记录意见, `to_guid` 为空表示针对词条本身; guid 不存在返回 NotFound
    async fn insert_comment(&self, from_guid: &str, to_guid: &str, comments: &str) -> Result<i64, StoreError>;

    /// 全部意见, 新的在前
    async fn get_comments(&self) -> Result<Vec<Comment>, StoreError>;
    async fn delete_comment(&self, id: i64) -> Result<(), StoreError>;

    /// 某语言所有已启用词条的词头, 用于构建自动补全
    async fn get_words(&self, lang: &str) -> Result<Vec<String>, StoreError>;

    /// 词头 (小写) 以 `prefix` 开头的已启用词条, 按权重排序
    async fn get_suggestions(&self, lang: &str, prefix: &str, limit: i64) -> Result<Vec<String>, StoreError>;
}
