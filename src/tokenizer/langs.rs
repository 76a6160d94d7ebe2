use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::{
    PhoneticTokenizer, PluginLimits, ScriptTokenizer, SegmentTokenizer, TokenizeError, Tokenizer,
    BUILTIN_DICTS,
};
use crate::config::{Config, TokenizerKind};
use crate::phonetic::Script;

/// 一个已配置的语言及其分词器
#[derive(Debug)]
pub struct Lang {
    pub id: String,
    pub name: String,
    /// 关系类型 id -> 显示名
    pub types: BTreeMap<String, String>,
    pub tokenizer: Tokenizer,
}

impl Lang {
    pub fn has_type(&self, t: &str) -> bool {
        self.types.contains_key(t)
    }
}

/// 语言 -> 分词器 的调度表, 启动时构建一次, 之后只读
#[derive(Debug, Default)]
pub struct LangTable {
    langs: HashMap<String, Lang>,
}

impl LangTable {
    /// 按配置解析每种语言的分词器, 任何一个失败都应中止启动
    pub fn build(cfg: &Config) -> Result<Self, TokenizeError> {
        let limits = PluginLimits::from(&cfg.plugins);
        let dir = Path::new(&cfg.app.tokenizers_dir);
        let mut langs = HashMap::with_capacity(cfg.lang.len());

        for (id, l) in &cfg.lang {
            let name = l.tokenizer.trim();
            let tokenizer = match l.tokenizer_type {
                TokenizerKind::Builtin => {
                    if !BUILTIN_DICTS.contains(&name) {
                        return Err(TokenizeError::UnknownTokenizer(name.to_string()));
                    }
                    Tokenizer::Builtin { name: name.to_string() }
                }
                TokenizerKind::Phonetic => {
                    let script = Script::from_name(name)
                        .ok_or_else(|| TokenizeError::UnknownTokenizer(name.to_string()))?;
                    let num_keys = l.num_keys.unwrap_or(cfg.search.num_query_keys);
                    Tokenizer::Phonetic(PhoneticTokenizer::new(script, num_keys))
                }
                TokenizerKind::Script => {
                    let file = if name.ends_with(".lua") {
                        name.to_string()
                    } else {
                        format!("{}.lua", name)
                    };
                    let path = dir.join(file);
                    if !path.is_file() {
                        return Err(TokenizeError::UnknownTokenizer(path.display().to_string()));
                    }
                    Tokenizer::Script(ScriptTokenizer::from_file(&path, limits)?)
                }
                TokenizerKind::Segmenter => {
                    if name != "jieba" {
                        return Err(TokenizeError::UnknownTokenizer(name.to_string()));
                    }
                    Tokenizer::Segmenter(SegmentTokenizer::new())
                }
            };

            tracing::info!(
                "<<< 语言 {} ({}) 使用分词器 {}:{}",
                id,
                l.name,
                tokenizer.kind(),
                name
            );
            langs.insert(
                id.clone(),
                Lang {
                    id: id.clone(),
                    name: l.name.clone(),
                    types: l.types.clone(),
                    tokenizer,
                },
            );
        }

        Ok(Self { langs })
    }

    pub fn get(&self, id: &str) -> Option<&Lang> {
        self.langs.get(id)
    }

    /// 同 `get`, 但未知语言返回错误
    pub fn resolve(&self, id: &str) -> Result<&Lang, TokenizeError> {
        self.get(id).ok_or_else(|| TokenizeError::UnknownLang(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.langs.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lang> {
        self.langs.values()
    }

    pub fn len(&self) -> usize {
        self.langs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.langs.is_empty()
    }
}
