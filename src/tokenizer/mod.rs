//! 分词器抽象
//!
//! 每种语言在启动时绑定到唯一一个分词器:
//! - `Builtin`: 交给存储引擎按词典名做词干分析, 本地不产出 token
//! - `Phonetic`: 音形哈希, 产出带权重的三级键
//! - `Script`: Lua 插件脚本
//! - `Segmenter`: jieba 中文分词

pub mod langs;
mod phonetic;
mod script;
mod segment;

pub use langs::{Lang, LangTable};
pub use phonetic::PhoneticTokenizer;
pub use script::{PluginLimits, ScriptTokenizer};
pub use segment::SegmentTokenizer;

/// 存储引擎内置的词典名
pub const BUILTIN_DICTS: &[&str] = &[
    "simple",
    "arabic",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "greek",
    "hungarian",
    "italian",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "tamil",
    "turkish",
];

/// tsvector 允许的最大位置
const MAX_POSITION: usize = 16383;

/// 分词产出的中间结果, weight 3 最宽泛, 1 最精确
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub weight: u8,
}

impl Token {
    pub fn new(token: impl Into<String>, weight: u8) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("script error: {0}")]
    Script(String),
    #[error("script timed out")]
    Timeout,
    #[error("unknown language '{0}'")]
    UnknownLang(String),
    #[error("unknown tokenizer '{0}'")]
    UnknownTokenizer(String),
    #[error("bad token '{0}'")]
    BadToken(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mlua::Error> for TokenizeError {
    fn from(e: mlua::Error) -> Self {
        TokenizeError::Script(e.to_string())
    }
}

/// 分词能力接口
pub trait Tokenize: Send + Sync {
    /// 写入时使用: 文本 -> 带权重的 token
    fn to_tokens(&self, text: &str, lang: &str) -> Result<Vec<Token>, TokenizeError>;

    /// 检索时使用: 文本 -> 存储引擎的查询表达式
    fn to_query(&self, text: &str, lang: &str) -> Result<String, TokenizeError>;
}

#[derive(Debug)]
pub enum Tokenizer {
    Builtin { name: String },
    Phonetic(PhoneticTokenizer),
    Script(ScriptTokenizer),
    Segmenter(SegmentTokenizer),
}

impl Tokenizer {
    /// 委托给存储引擎时的词典名
    pub fn builtin_dict(&self) -> Option<&str> {
        match self {
            Tokenizer::Builtin { name } => Some(name),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Tokenizer::Builtin { .. } => "builtin",
            Tokenizer::Phonetic(_) => "phonetic",
            Tokenizer::Script(_) => "script",
            Tokenizer::Segmenter(_) => "segmenter",
        }
    }
}

impl Tokenize for Tokenizer {
    fn to_tokens(&self, text: &str, lang: &str) -> Result<Vec<Token>, TokenizeError> {
        match self {
            Tokenizer::Builtin { .. } => Ok(Vec::new()),
            Tokenizer::Phonetic(t) => t.to_tokens(text, lang),
            Tokenizer::Script(t) => t.to_tokens(text, lang),
            Tokenizer::Segmenter(t) => t.to_tokens(text, lang),
        }
    }

    fn to_query(&self, text: &str, lang: &str) -> Result<String, TokenizeError> {
        match self {
            Tokenizer::Builtin { .. } => Ok(String::new()),
            Tokenizer::Phonetic(t) => t.to_query(text, lang),
            Tokenizer::Script(t) => t.to_query(text, lang),
            Tokenizer::Segmenter(t) => t.to_query(text, lang),
        }
    }
}

/// 权重 -> tsvector 标签, 1 最精确对应 A
pub fn weight_label(weight: u8) -> char {
    match weight {
        1 => 'A',
        2 => 'B',
        3 => 'C',
        _ => 'D',
    }
}

/// 序列化为 tsvector 文本: `'tok':1A 'tok2':2C`, 重复 token 保留第一次出现
pub fn serialize_tokens(tokens: &[Token]) -> String {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tokens.len());

    for t in tokens {
        if t.token.is_empty() || !seen.insert(t.token.as_str()) {
            continue;
        }
        let pos = (out.len() + 1).min(MAX_POSITION);
        out.push(format!(
            "'{}':{}{}",
            t.token.replace('\'', "''"),
            pos,
            weight_label(t.weight)
        ));
    }
    out.join(" ")
}

/// 解析插件返回的 `token` 或 `token:<1-3>`
pub fn parse_weighted(raw: &str) -> Result<Token, TokenizeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TokenizeError::BadToken(raw.to_string()));
    }

    if let Some((tok, w)) = raw.rsplit_once(':') {
        if !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()) {
            return match w.parse::<u8>() {
                Ok(n @ 1..=3) if !tok.is_empty() => Ok(Token::new(tok, n)),
                _ => Err(TokenizeError::BadToken(raw.to_string())),
            };
        }
    }
    Ok(Token::new(raw, 1))
}

/// 查询表达式中的词项, 含特殊字符时加引号
pub fn quote_term(term: &str) -> String {
    if !term.is_empty() && term.chars().all(|c| c.is_ascii_alphanumeric()) {
        term.to_string()
    } else {
        format!("'{}'", term.replace('\'', "''"))
    }
}
