use serde::{Deserialize, Serialize};

use super::entry::{Entry, GlossaryWord, Status};

/// 表示 "任意目标语言" 的通配符
pub const ANY_LANG: &str = "*";

/// 一次检索请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub query: String,
    pub from_lang: String,
    /// 空或 `*` 表示任意语言
    #[serde(default)]
    pub to_lang: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

impl Query {
    /// 目标语言过滤条件, None 表示不过滤
    pub fn to_lang_filter(&self) -> Option<&str> {
        match self.to_lang.trim() {
            "" | ANY_LANG => None,
            l => Some(l),
        }
    }

    pub fn status(&self) -> Status {
        self.status.unwrap_or_default()
    }
}

/// 页码/每页条数 -> offset/limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    /// 页码从 1 开始, 每页条数限制在 [1, max_per_page]
    pub fn new(page: Option<i64>, per_page: Option<i64>, default_per_page: i64, max_per_page: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = match per_page {
            Some(n) if n >= 1 => n.min(max_per_page),
            _ => default_per_page,
        };

        Self {
            page,
            per_page,
            offset: (page - 1).saturating_mul(per_page),
            limit: per_page,
        }
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.per_page - 1) / self.per_page
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub entries: Vec<Entry>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl SearchResults {
    pub fn empty(pg: &Pagination) -> Self {
        Self {
            entries: Vec::new(),
            page: pg.page,
            per_page: pg.per_page,
            total: 0,
            total_pages: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryPage {
    pub words: Vec<GlossaryWord>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}
