//! 按语言的前缀树自动补全
//!
//! 启动时从存储里取出各语言的词头建树, 之后新增的词条由存储层前缀查询补足。

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use trie_rs::{Trie, TrieBuilder};

/// 小写, 连字符换成空格, 去掉数字
pub fn normalize_word(s: &str) -> String {
    s.to_lowercase()
        .replace('-', " ")
        .chars()
        .filter(|c| !c.is_numeric())
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Default)]
pub struct Autocomplete {
    tries: RwLock<HashMap<String, Trie<u8>>>,
}

impl Autocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用给定词表重建某语言的树, 返回去重后的词数
    pub fn build(&self, lang: &str, words: &[String]) -> usize {
        let words: BTreeSet<String> = words
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty())
            .collect();

        let mut tries = self.tries.write();
        if words.is_empty() {
            tries.remove(lang);
            return 0;
        }

        let mut b = TrieBuilder::new();
        for w in &words {
            b.push(w);
        }
        tries.insert(lang.to_string(), b.build());
        words.len()
    }

    /// 以 `prefix` 开头的词, 最多 `num` 个
    pub fn query(&self, lang: &str, prefix: &str, num: usize) -> Vec<String> {
        let word = normalize_word(prefix);
        if word.is_empty() || num == 0 {
            return Vec::new();
        }

        let tries = self.tries.read();
        match tries.get(lang) {
            Some(trie) => trie.predictive_search(&word).take(num).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("Well-Known 42"), "well known");
        assert_eq!(normalize_word("  Apple "), "apple");
    }

    #[test]
    fn test_prefix_query() {
        let ac = Autocomplete::new();
        assert_eq!(ac.build("english", &words(&["Apple", "apply", "apple", "banana"])), 3);

        let mut hits = ac.query("english", "AP", 10);
        hits.sort();
        assert_eq!(hits, vec!["apple", "apply"]);
        assert_eq!(ac.query("english", "ap", 1).len(), 1);
        assert!(ac.query("english", "z", 10).is_empty());
        assert!(ac.query("italian", "ap", 10).is_empty());
        assert!(ac.query("english", "42", 10).is_empty());
    }

    #[test]
    fn test_rebuild_replaces() {
        let ac = Autocomplete::new();
        ac.build("english", &words(&["apple"]));
        ac.build("english", &words(&["avocado"]));
        assert_eq!(ac.query("english", "a", 10), vec!["avocado"]);

        ac.build("english", &[]);
        assert!(ac.query("english", "a", 10).is_empty());
    }
}
