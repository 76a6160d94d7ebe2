//! 音形哈希引擎
//!
//! 把某一文字 (或其拉丁转写) 的单词归约成三级可比较的音形键:
//! `key2` 最细 (保留叠辅音、卷舌/齿音区分、元音音质),
//! `key1` 去掉元音音质数字, `key0` 再去掉叠辅音/卷舌数字, 召回最广。
//!
//! 纯函数, 不会失败; 完全无法识别的输入返回空键。

mod latin;
mod tables;

use once_cell::sync::Lazy;
use serde::Serialize;

use tables::{Glyphs, ScriptTable, KANNADA, MALAYALAM};

/// 元音音质数字, key1 去掉
const QUALITY_DIGITS: &[char] = &['4', '5', '6', '7', '8', '9'];
/// 叠辅音/卷舌数字, key0 再去掉
const DISTINCTION_DIGITS: &[char] = &['1', '2'];

/// 支持音形编码的文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Kannada,
    Malayalam,
}

impl Script {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "kannada" | "kn" => Some(Script::Kannada),
            "malayalam" | "ml" => Some(Script::Malayalam),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Script::Kannada => "kannada",
            Script::Malayalam => "malayalam",
        }
    }

    fn table(&self) -> &'static ScriptTable {
        match self {
            Script::Kannada => &KANNADA,
            Script::Malayalam => &MALAYALAM,
        }
    }

    fn compiled(&self) -> &'static CompiledScript {
        match self {
            Script::Kannada => &COMPILED_KANNADA,
            Script::Malayalam => &COMPILED_MALAYALAM,
        }
    }

    /// 字符是否落在该文字的 Unicode 区块内
    pub fn contains(&self, c: char) -> bool {
        let t = self.table();
        (t.first..=t.last).contains(&c)
    }
}

/// 三级音形键, 从粗到细
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhoneticKeys {
    pub key0: String,
    pub key1: String,
    pub key2: String,
}

impl PhoneticKeys {
    pub fn is_empty(&self) -> bool {
        self.key0.is_empty()
    }

    /// 由最细的 key2 推导出另外两级
    pub fn from_key2(key2: String) -> Self {
        let key1 = reduce_key1(&key2);
        let key0 = reduce_key0(&key1);
        Self { key0, key1, key2 }
    }
}

/// key2 -> key1: 去掉元音音质数字
pub fn reduce_key1(key2: &str) -> String {
    key2.chars().filter(|c| !QUALITY_DIGITS.contains(c)).collect()
}

/// key1 -> key0: 去掉叠辅音/卷舌数字
pub fn reduce_key0(key1: &str) -> String {
    key1.chars().filter(|c| !DISTINCTION_DIGITS.contains(c)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Native,
    Latin,
    Unrecognized,
}

/// 按 Unicode 区间探测输入是原生文字还是拉丁转写
fn detect(word: &str, script: Script) -> InputMode {
    if word.chars().any(|c| script.contains(c)) {
        InputMode::Native
    } else if word.chars().any(|c| c.is_ascii_alphabetic()) {
        InputMode::Latin
    } else {
        InputMode::Unrecognized
    }
}

/// 编码一个单词
pub fn encode(word: &str, script: Script) -> PhoneticKeys {
    let key2 = match detect(word, script) {
        InputMode::Native => script.compiled().process(word),
        InputMode::Latin => latin::process(word),
        InputMode::Unrecognized => String::new(),
    };
    PhoneticKeys::from_key2(key2)
}

/// 一组按顺序执行的替换, 每组内部已按字形长度从长到短排好
type Stage = Vec<(String, String)>;

/// 预先展开好的替换流水线
struct CompiledScript {
    script: Script,
    stages: Vec<Stage>,
    modifiers: Stage,
}

static COMPILED_KANNADA: Lazy<CompiledScript> = Lazy::new(|| CompiledScript::new(Script::Kannada));
static COMPILED_MALAYALAM: Lazy<CompiledScript> =
    Lazy::new(|| CompiledScript::new(Script::Malayalam));

impl CompiledScript {
    fn new(script: Script) -> Self {
        let t = script.table();
        let stages = vec![
            modified_stage(t.compounds, t.modifiers),
            bracket_stage(t.compounds),
            modified_stage(t.consonants, t.modifiers),
            modified_stage(t.vowels, t.modifiers),
            bracket_stage(t.consonants),
            bracket_stage(t.vowels),
            bracket_stage(t.terminals),
        ];
        let modifiers = longest_first(t.modifiers.iter().map(|(g, v)| (g.to_string(), v.to_string())));

        Self { script, stages, modifiers }
    }

    fn process(&self, word: &str) -> String {
        let mut s: String = word.chars().filter(|c| self.script.contains(*c)).collect();

        // 已替换的部分都用 {..} 包住, 后续单字形替换不会命中组合内部
        for stage in &self.stages {
            s = apply(s, stage);
        }
        s = apply(s, &self.modifiers);

        // 丢掉括号等残留
        s.retain(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        s
    }
}

fn apply(mut s: String, stage: &Stage) -> String {
    for (from, to) in stage {
        if s.contains(from.as_str()) {
            s = s.replace(from.as_str(), to);
        }
    }
    s
}

fn bracket_stage(glyphs: Glyphs) -> Stage {
    longest_first(glyphs.iter().map(|(g, v)| (g.to_string(), format!("{{{}}}", v))))
}

/// 字形 + 元音符号 的组合, 例如 ಕ್ಕ + ಿ -> {K24}
fn modified_stage(glyphs: Glyphs, modifiers: Glyphs) -> Stage {
    longest_first(glyphs.iter().flat_map(|(g, v)| {
        modifiers
            .iter()
            .map(move |(m, mv)| (format!("{}{}", g, m), format!("{{{}{}}}", v, mv)))
    }))
}

fn longest_first(items: impl Iterator<Item = (String, String)>) -> Stage {
    let mut out: Stage = items.collect();
    // 稳定排序: 等长时保持表中的顺序
    out.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kannada_native() {
        let k = encode("ಕನ್ನಡ", Script::Kannada);
        assert_eq!(k.key2, "KN2T1");
        assert_eq!(k.key1, "KN2T1");
        assert_eq!(k.key0, "KNT");
    }

    #[test]
    fn test_vowel_signs_become_quality_digits() {
        let k = encode("ಕಿವಿ", Script::Kannada);
        assert_eq!(k.key2, "K4V4");
        assert_eq!(k.key1, "KV");
        assert_eq!(k.key0, "KV");
    }

    #[test]
    fn test_modified_compound() {
        // ಕ್ಕಿ: 叠辅音后面紧跟元音符号
        let k = encode("ಅಕ್ಕಿ", Script::Kannada);
        assert_eq!(k.key2, "AK24");
        assert_eq!(k.key1, "AK2");
        assert_eq!(k.key0, "AK");
    }

    #[test]
    fn test_malayalam_anusvara_and_chillu() {
        assert_eq!(encode("മരം", Script::Malayalam).key2, "MR3");
        assert_eq!(encode("അവൻ", Script::Malayalam).key2, "AVN");
        assert_eq!(encode("എന്റെ", Script::Malayalam).key2, "ENT16");
    }

    #[test]
    fn test_strips_foreign_codepoints() {
        let a = encode("ಕನ್ನಡ!! 123", Script::Kannada);
        let b = encode("ಕನ್ನಡ", Script::Kannada);
        assert_eq!(a, b);
    }

    #[test]
    fn test_latin_and_native_share_keys() {
        let native = encode("മരം", Script::Malayalam);
        let latin = encode("maram", Script::Malayalam);
        assert_eq!(native, latin);

        let native = encode("ಕನ್ನಡ", Script::Kannada);
        let latin = encode("Kannada", Script::Kannada);
        assert_eq!(native.key0, latin.key0);
    }

    #[test]
    fn test_unrecognized_is_empty() {
        assert!(encode("", Script::Kannada).is_empty());
        assert!(encode("1234 !!", Script::Malayalam).is_empty());
        // 其他文字
        assert!(encode("中文", Script::Kannada).is_empty());
    }

    #[test]
    fn test_script_names() {
        assert_eq!(Script::from_name("Kannada"), Some(Script::Kannada));
        assert_eq!(Script::from_name("ml"), Some(Script::Malayalam));
        assert_eq!(Script::from_name("tamil"), None);
    }
}
