use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// 词条/关系的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// 公开投稿, 等待审核
    Pending,
    #[default]
    Enabled,
    Disabled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Enabled => "enabled",
            Status::Disabled => "disabled",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "enabled" => Ok(Status::Enabled),
            "disabled" => Ok(Status::Disabled),
            _ => Err(format!("unknown status '{}'", s)),
        }
    }
}

fn empty_meta() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// 一个语言中的一个词/短语
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub guid: String,
    /// 一个或多个书写形式, 第一个是词头
    pub content: Vec<String>,
    /// 词汇表分组用的首字母, 为空时自动取 content 首字符
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub weight: f64,
    /// 序列化后的检索 token, 为空时写入时自动生成
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tokens: String,
    pub lang: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "empty_meta")]
    pub meta: serde_json::Value,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// 检索结果里挂载的释义词条
    #[sqlx(skip)]
    #[serde(default)]
    pub relations: Vec<Entry>,
    /// 仅在作为释义出现时填充, 描述与父词条的关系
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,

    #[sqlx(default)]
    #[serde(skip)]
    pub total: i64,
    #[sqlx(default)]
    #[serde(skip)]
    pub rank: f64,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: 0,
            guid: String::new(),
            content: Vec::new(),
            initial: String::new(),
            weight: 0.0,
            tokens: String::new(),
            lang: String::new(),
            tags: Vec::new(),
            phones: Vec::new(),
            notes: String::new(),
            meta: empty_meta(),
            status: Status::Enabled,
            created_at: None,
            updated_at: None,
            relations: Vec::new(),
            relation: None,
            total: 0,
            rank: 0.0,
        }
    }
}

impl Entry {
    pub fn new(lang: &str, content: &[&str]) -> Self {
        Self {
            lang: lang.to_string(),
            content: content.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// 词头, 即第一个书写形式
    pub fn head(&self) -> &str {
        self.content.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// 所有书写形式拼成一段文本, 用于分词
    pub fn content_text(&self) -> String {
        self.content.join(" ")
    }

    /// 对外公开的结果不暴露数字 id
    pub fn zero_ids(&mut self) {
        self.id = 0;
        if let Some(r) = self.relation.as_mut() {
            r.id = 0;
        }
        for child in self.relations.iter_mut() {
            child.zero_ids();
        }
    }
}

/// 父词条 -> 释义词条 的有向带权边
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Relation {
    #[serde(default)]
    pub id: i64,
    /// 关系类型 (词性等), 必须是该语言配置中的类型
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    /// 同一父词条下的排序, 0 表示自动追加到末尾
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 检索释义时带回的子词条及其所属父词条
#[derive(Debug, Clone)]
pub struct RelatedEntry {
    pub from_id: i64,
    pub entry: Entry,
}

/// 词汇表中的一个词
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlossaryWord {
    pub id: i64,
    pub guid: String,
    pub content: Vec<String>,
    #[sqlx(default)]
    #[serde(skip)]
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub entries: i64,
    pub relations: i64,
    pub languages: BTreeMap<String, i64>,
}

/// 公开投稿里的词条, 只接受这些字段
/// (tokens/guid/weight/meta 等由服务端生成, 不允许匿名用户指定)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmittedEntry {
    pub content: Vec<String>,
    pub lang: String,
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl SubmittedEntry {
    pub fn new(lang: &str, content: &[&str]) -> Self {
        Self {
            lang: lang.to_string(),
            content: content.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl From<SubmittedEntry> for Entry {
    fn from(s: SubmittedEntry) -> Self {
        Entry {
            content: s.content,
            lang: s.lang,
            initial: s.initial,
            tags: s.tags,
            phones: s.phones,
            notes: s.notes,
            status: Status::Pending,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmittedRelation {
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl From<SubmittedRelation> for Relation {
    fn from(s: SubmittedRelation) -> Self {
        Relation {
            types: s.types,
            tags: s.tags,
            notes: s.notes,
            status: Status::Pending,
            ..Default::default()
        }
    }
}

/// 公开投稿: 一个新词条, 可选带一个释义
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub entry: SubmittedEntry,
    #[serde(default)]
    pub definition: Option<SubmittedEntry>,
    #[serde(default)]
    pub relation: SubmittedRelation,
}

/// 公开用户对词条的意见, 可指向其中一条释义
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub from_id: i64,
    pub to_id: Option<i64>,
    pub comments: String,
    pub created_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub from_guid: Option<String>,
    #[sqlx(default)]
    pub to_guid: Option<String>,
}

/// 提交意见的请求, 词条用 guid 指定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentReq {
    pub from_guid: String,
    #[serde(default)]
    pub to_guid: String,
    pub comments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let e: Entry = serde_json::from_str(r#"{"content": ["Apple"], "lang": "english"}"#).unwrap();
        assert_eq!(e.status, Status::Enabled);
        assert_eq!(e.head(), "Apple");
        assert!(e.meta.is_object());
        assert!(e.relations.is_empty());
    }

    #[test]
    fn test_relations_serialized_as_empty_list() {
        let e = Entry::new("english", &["Apple"]);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["relations"], serde_json::json!([]));
        assert!(v.get("relation").is_none());
        assert!(v.get("total").is_none());
    }

    #[test]
    fn test_zero_ids() {
        let mut child = Entry::new("italian", &["il pomo."]);
        child.id = 7;
        child.relation = Some(Relation { id: 3, ..Default::default() });

        let mut e = Entry::new("english", &["Apple"]);
        e.id = 1;
        e.relations.push(child);
        e.zero_ids();

        assert_eq!(e.id, 0);
        assert_eq!(e.relations[0].id, 0);
        assert_eq!(e.relations[0].relation.as_ref().unwrap().id, 0);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        assert!("deleted".parse::<Status>().is_err());
        assert_eq!(Status::Disabled.as_str(), "disabled");
    }
}
