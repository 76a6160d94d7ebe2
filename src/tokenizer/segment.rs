use jieba_rs::Jieba;
use once_cell::sync::Lazy;

use super::{quote_term, Token, TokenizeError, Tokenize};

// 词库只在第一次使用时加载一次
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

/// jieba 分词, 适用于没有空格分词的中文等语言
#[derive(Debug, Clone, Default)]
pub struct SegmentTokenizer;

impl SegmentTokenizer {
    pub fn new() -> Self {
        Self
    }

    fn words(text: &str) -> Vec<String> {
        JIEBA
            .cut(text, false)
            .into_iter()
            .filter_map(clean)
            .collect()
    }
}

/// 去掉空白和纯标点
fn clean(w: &str) -> Option<String> {
    let w = w.trim();
    if w.chars().any(|c| c.is_alphanumeric()) {
        Some(w.to_lowercase())
    } else {
        None
    }
}

impl Tokenize for SegmentTokenizer {
    fn to_tokens(&self, text: &str, _lang: &str) -> Result<Vec<Token>, TokenizeError> {
        // 精确切分的词最具体, 搜索引擎模式切出的子词次之
        let mut out: Vec<Token> = Self::words(text).into_iter().map(|w| Token::new(w, 1)).collect();
        for w in JIEBA.cut_for_search(text, false).into_iter().filter_map(clean) {
            out.push(Token::new(w, 2));
        }
        Ok(out)
    }

    fn to_query(&self, text: &str, _lang: &str) -> Result<String, TokenizeError> {
        let mut terms: Vec<String> = Vec::new();
        for w in Self::words(text) {
            let t = quote_term(&w);
            if !terms.contains(&t) {
                terms.push(t);
            }
        }
        Ok(terms.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_and_drops_punctuation() {
        let t = SegmentTokenizer::new();
        let tokens = t.to_tokens("数据字典，", "chinese").unwrap();
        assert!(!tokens.is_empty());
        assert!(tokens.iter().all(|t| t.token != "，"));
        assert!(tokens.iter().any(|t| t.weight == 1));
    }

    #[test]
    fn test_query_terms_are_indexed() {
        let t = SegmentTokenizer::new();
        let text = "中文分词";
        let tokens = t.to_tokens(text, "chinese").unwrap();
        let query = t.to_query(text, "chinese").unwrap();

        for term in query.split(" | ") {
            let bare = term.trim_matches('\'');
            assert!(tokens.iter().any(|t| t.token == bare), "{} not indexed", bare);
        }
    }

    #[test]
    fn test_empty_text() {
        let t = SegmentTokenizer::new();
        assert_eq!(t.to_query("  ，。", "chinese").unwrap(), "");
    }
}
