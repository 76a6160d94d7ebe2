//! 排序规则
//!
//! 结果是两组互不重复的候选的并集, 按 rank 升序:
//! - 直接匹配: rank = 词头长度 - 前缀长度 (越短越靠前), 词头完全相同再减去 bonus
//! - 分词匹配: rank = 1 - 相关度

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::models::Entry;

/// 去掉后参与 "simple" 直接匹配的英文停用词
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "if", "in", "into",
    "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    pub prefix_len: usize,
    pub bonus: f64,
}

impl From<&SearchConfig> for RankParams {
    fn from(c: &SearchConfig) -> Self {
        Self {
            prefix_len: c.direct_prefix_len,
            bonus: c.direct_match_bonus,
        }
    }
}

impl Default for RankParams {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

/// 截取前缀后小写
pub fn normalize_head(s: &str, prefix_len: usize) -> String {
    s.chars().take(prefix_len).collect::<String>().to_lowercase()
}

/// 小写按空白切分, 去掉停用词和重复
pub fn simple_tokens(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for w in text.to_lowercase().split_whitespace() {
        if STOPWORDS.contains(&w) || out.iter().any(|o| o == w) {
            continue;
        }
        out.push(w.to_string());
    }
    out
}

/// 词条所有书写形式的小写词集合
pub fn content_words(content: &[String]) -> HashSet<String> {
    content
        .iter()
        .flat_map(|c| c.to_lowercase().split_whitespace().map(String::from).collect::<Vec<_>>())
        .collect()
}

pub fn direct_rank(head: &str, exact: bool, p: &RankParams) -> f64 {
    let len = head.chars().count().min(p.prefix_len) as f64;
    let rank = len - p.prefix_len as f64;
    if exact {
        rank - p.bonus
    } else {
        rank
    }
}

pub fn token_rank(relevance: f64) -> f64 {
    1.0 - relevance.clamp(0.0, 1.0)
}

fn by_rank(a: &Entry, b: &Entry) -> Ordering {
    a.rank.total_cmp(&b.rank).then(a.id.cmp(&b.id))
}

/// 合并两组候选: 去掉已在直接匹配中出现的分词匹配, 排序后分页
pub fn merge_ranked(direct: Vec<Entry>, token: Vec<Entry>, offset: i64, limit: i64) -> (Vec<Entry>, i64) {
    let seen: HashSet<i64> = direct.iter().map(|e| e.id).collect();

    let mut all = direct;
    all.extend(token.into_iter().filter(|e| !seen.contains(&e.id)));
    all.sort_by(by_rank);

    let total = all.len() as i64;
    let page: Vec<Entry> = all
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .map(|mut e| {
            e.total = total;
            e
        })
        .collect();

    (page, total)
}
