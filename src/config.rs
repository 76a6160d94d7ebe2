use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// 配置文件 (TOML) 的完整结构
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
    /// 语言 id -> 语言配置
    #[serde(default)]
    pub lang: BTreeMap<String, LangConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tokenizers_dir: String,
    pub enable_submissions: bool,
    /// 词典方向, 如 [["english", "italian"]]
    pub dicts: Vec<[String; 2]>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tokenizers_dir: "tokenizers".to_string(),
            enable_submissions: false,
            dicts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// 检索排序参数, 都是经验值
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 词头归一化时截取的字符数
    pub direct_prefix_len: usize,
    /// 词头完全匹配时额外减去的排名分
    pub direct_match_bonus: f64,
    pub default_per_page: i64,
    pub max_per_page: i64,
    /// 音形分词器生成查询时默认取几级键
    pub num_query_keys: usize,
    /// 是否提供自动补全
    pub suggestions: bool,
    pub num_suggestions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            direct_prefix_len: 50,
            direct_match_bonus: 10000.0,
            default_per_page: 10,
            max_per_page: 50,
            num_query_keys: 2,
            suggestions: true,
            num_suggestions: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: String,
    pub max_items: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: "72h".to_string(),
            max_items: 10000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        parse_duration(&self.ttl)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub timeout_ms: u64,
    pub memory_limit_mb: usize,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 200,
            memory_limit_mb: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// 存储引擎自带的词干分析器, tokenizer 为词典名
    Builtin,
    /// 音形哈希, tokenizer 为文字名
    Phonetic,
    /// Lua 插件, tokenizer 为脚本文件名
    Script,
    /// jieba 中文分词
    Segmenter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LangConfig {
    pub name: String,
    pub tokenizer: String,
    pub tokenizer_type: TokenizerKind,
    #[serde(default)]
    pub num_keys: Option<usize>,
    /// 关系类型 id -> 显示名, 例如 noun = "Noun"
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

impl Config {
    /// 读取并校验配置文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::info!(">>> 加载配置: {}", path.display());

        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("读取 {} 失败: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, Error> {
        let cfg: Config = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.lang.is_empty() {
            return Err(Error::Config("no languages configured".into()));
        }

        for (id, l) in &self.lang {
            if let Some(n) = l.num_keys {
                if !(1..=3).contains(&n) {
                    return Err(Error::Config(format!("lang.{}: num_keys must be 1-3", id)));
                }
            }
        }
        if !(1..=3).contains(&self.search.num_query_keys) {
            return Err(Error::Config("search.num_query_keys must be 1-3".into()));
        }

        for [from, to] in &self.app.dicts {
            for l in [from, to] {
                if !self.lang.contains_key(l) {
                    return Err(Error::Config(format!("dict references unknown language '{}'", l)));
                }
            }
        }

        if self.cache.enabled && self.cache.ttl().is_none() {
            return Err(Error::Config(format!("invalid cache ttl '{}'", self.cache.ttl)));
        }

        Ok(())
    }
}

/// 解析 `30s` / `15m` / `72h` / `1d` 形式的时长
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let unit = s.chars().last()?;
    let n: u64 = s[..s.len() - unit.len_utf8()].parse().ok()?;

    let secs = match unit {
        's' => n,
        'm' => n * 60,
        'h' => n * 3600,
        'd' => n * 86400,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[app]
dicts = [["english", "italian"]]

[search]
direct_prefix_len = 40

[lang.english]
name = "English"
tokenizer = "english"
tokenizer_type = "builtin"
types = { noun = "Noun", verb = "Verb" }

[lang.italian]
name = "Italiano"
tokenizer = "italian"
tokenizer_type = "builtin"
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.lang.len(), 2);
        assert_eq!(cfg.search.direct_prefix_len, 40);
        assert_eq!(cfg.search.direct_match_bonus, 10000.0);
        assert_eq!(cfg.db.max_connections, 5);
        assert_eq!(cfg.lang["english"].tokenizer_type, TokenizerKind::Builtin);
        assert!(cfg.lang["english"].types.contains_key("noun"));
    }

    #[test]
    fn test_rejects_unknown_dict_lang() {
        let raw = SAMPLE.replace(r#"["english", "italian"]"#, r#"["english", "german"]"#);
        assert!(matches!(Config::from_toml_str(&raw), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_bad_num_keys() {
        let raw = format!("{}\nnum_keys = 4\n", SAMPLE);
        assert!(Config::from_toml_str(&raw).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Config::from_toml_str("").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("72h"), Some(Duration::from_secs(72 * 3600)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("h"), None);
    }
}
