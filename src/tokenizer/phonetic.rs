use super::{quote_term, Token, TokenizeError, Tokenize};
use crate::phonetic::{self, Script};

/// 基于音形哈希的分词器
#[derive(Debug, Clone)]
pub struct PhoneticTokenizer {
    script: Script,
    /// 生成查询时取几级键 (1-3), 从最精确开始
    num_keys: usize,
}

impl PhoneticTokenizer {
    pub fn new(script: Script, num_keys: usize) -> Self {
        Self {
            script,
            num_keys: num_keys.clamp(1, 3),
        }
    }

    pub fn script(&self) -> Script {
        self.script
    }
}

impl Tokenize for PhoneticTokenizer {
    fn to_tokens(&self, text: &str, _lang: &str) -> Result<Vec<Token>, TokenizeError> {
        let mut out = Vec::new();
        for word in text.split_whitespace() {
            let k = phonetic::encode(word, self.script);
            if k.is_empty() {
                continue;
            }
            out.push(Token::new(k.key0, 3));
            out.push(Token::new(k.key1, 2));
            out.push(Token::new(k.key2, 1));
        }
        Ok(out)
    }

    /// 每个词取 key2, key1, key0 去重后的前 num_keys 个 OR 起来,
    /// 多个词之间 AND
    fn to_query(&self, text: &str, _lang: &str) -> Result<String, TokenizeError> {
        let mut groups = Vec::new();

        for word in text.split_whitespace() {
            let k = phonetic::encode(word, self.script);
            if k.is_empty() {
                continue;
            }

            let mut keys: Vec<String> = Vec::with_capacity(3);
            for key in [k.key2, k.key1, k.key0] {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys.truncate(self.num_keys);

            let terms: Vec<String> = keys.iter().map(|k| quote_term(k)).collect();
            groups.push(terms.join(" | "));
        }

        Ok(match groups.len() {
            0 => String::new(),
            1 => groups.remove(0),
            _ => groups
                .iter()
                .map(|g| format!("({})", g))
                .collect::<Vec<_>>()
                .join(" & "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_weighted_by_tier() {
        let t = PhoneticTokenizer::new(Script::Kannada, 2);
        let tokens = t.to_tokens("ಕನ್ನಡ", "kannada").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("KNT", 3),
                Token::new("KN2T1", 2),
                Token::new("KN2T1", 1),
            ]
        );
    }

    #[test]
    fn test_query_takes_distinct_keys() {
        // key2 == key1, 去重后只剩两个
        let t = PhoneticTokenizer::new(Script::Kannada, 3);
        assert_eq!(t.to_query("ಕನ್ನಡ", "kannada").unwrap(), "KN2T1 | KNT");

        let t = PhoneticTokenizer::new(Script::Kannada, 2);
        assert_eq!(t.to_query("ಕಿವಿ", "kannada").unwrap(), "K4V4 | KV");

        let t = PhoneticTokenizer::new(Script::Kannada, 1);
        assert_eq!(t.to_query("ಕಿವಿ", "kannada").unwrap(), "K4V4");
    }

    #[test]
    fn test_multi_word_query() {
        let t = PhoneticTokenizer::new(Script::Malayalam, 1);
        assert_eq!(t.to_query("മരം അവൻ", "malayalam").unwrap(), "(MR3) & (AVN)");
    }

    #[test]
    fn test_unrecognized_is_empty() {
        let t = PhoneticTokenizer::new(Script::Malayalam, 2);
        assert!(t.to_tokens("123 !!", "malayalam").unwrap().is_empty());
        assert_eq!(t.to_query("123", "malayalam").unwrap(), "");
    }
}
