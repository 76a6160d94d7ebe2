//! 拉丁转写输入的音形编码
//!
//! 产出的键与原生文字的键在同一个空间里, 可以互相匹配。

use once_cell::sync::Lazy;

/// 辅音及辅音组合, 按长度从长到短匹配, 等长时按表中顺序
const CONSONANTS: &[(&str, &str)] = &[
    ("ksh", "KS1"),
    ("chh", "C"),
    ("nth", "NT"),
    ("kk", "K2"),
    ("gg", "K2"),
    ("cc", "C2"),
    ("jj", "J2"),
    ("tt", "T2"),
    ("dd", "T2"),
    ("nn", "N2"),
    ("pp", "P2"),
    ("bb", "B2"),
    ("mm", "M2"),
    ("yy", "Y2"),
    ("ll", "L2"),
    ("vv", "V2"),
    ("ss", "S2"),
    ("rr", "R1"),
    ("ch", "C"),
    ("th", "T"),
    ("dh", "T"),
    ("sh", "S1"),
    ("zh", "Z"),
    ("kh", "K"),
    ("gh", "K"),
    ("jh", "J"),
    ("ph", "F"),
    ("bh", "B"),
    ("ng", "NG"),
    ("nj", "NJ"),
    ("k", "K"),
    ("g", "K"),
    ("c", "C"),
    ("j", "J"),
    ("t", "T"),
    ("d", "T"),
    ("n", "N"),
    ("p", "P"),
    ("f", "F"),
    ("b", "B"),
    ("m", "M"),
    ("y", "Y"),
    ("r", "R"),
    ("l", "L"),
    ("v", "V"),
    ("s", "S"),
    ("h", "H"),
    ("z", "Z"),
];

/// (拼写, 独立元音, 元音符号数字)
const VOWELS: &[(&str, &str, &str)] = &[
    ("aa", "A", ""),
    ("ai", "AI", "7"),
    ("ei", "AI", "7"),
    ("au", "O", "9"),
    ("ou", "O", "9"),
    ("ee", "I", "4"),
    ("ii", "I", "4"),
    ("oo", "U", "5"),
    ("uu", "U", "5"),
    ("a", "A", ""),
    ("i", "I", "4"),
    ("u", "U", "5"),
    ("e", "E", "6"),
    ("o", "O", "8"),
];

/// 与原生 anusvara 相同的鼻化符号
const NASAL: &str = "3";

static SORTED_CONSONANTS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut v = CONSONANTS.to_vec();
    v.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    v
});

static SORTED_VOWELS: Lazy<Vec<(&'static str, &'static str, &'static str)>> = Lazy::new(|| {
    let mut v = VOWELS.to_vec();
    v.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    v
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Consonant,
    /// 独立元音
    Vowel,
    /// 跟在辅音后面的元音符号
    Modifier,
}

/// 小写化并规整罕见字母, 只留下 [a-z]
fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match c {
            'w' => out.push('v'),
            'q' => out.push('k'),
            'x' => out.push_str("ks"),
            'a'..='z' => out.push(c),
            _ => {}
        }
    }
    out
}

pub(super) fn process(input: &str) -> String {
    let word = normalize(input);
    let mut out = String::new();
    let mut prev = Prev::Start;
    let mut i = 0;

    while i < word.len() {
        let rest = &word[i..];

        // 词尾裸 m 跟在 辅音+元音 之后, 折叠为鼻化符
        if rest == "m" && prev == Prev::Modifier {
            out.push_str(NASAL);
            break;
        }

        if let Some((pat, key)) = SORTED_CONSONANTS.iter().find(|(p, _)| rest.starts_with(p)) {
            out.push_str(key);
            prev = Prev::Consonant;
            i += pat.len();
            continue;
        }

        if let Some((pat, standalone, sign)) =
            SORTED_VOWELS.iter().find(|(p, _, _)| rest.starts_with(p))
        {
            if prev == Prev::Consonant {
                out.push_str(sign);
                prev = Prev::Modifier;
            } else {
                out.push_str(standalone);
                prev = Prev::Vowel;
            }
            i += pat.len();
            continue;
        }

        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Wax-Q 9"), "vaksk");
    }

    #[test]
    fn test_vowels_standalone_vs_modifier() {
        // a 在词首是独立元音, 在辅音后是元音符号
        assert_eq!(process("aane"), "AN6");
        assert_eq!(process("kivi"), "K4V4");
        assert_eq!(process("ooru"), "UR5");
        // 元音后面的元音仍然是独立元音
        assert_eq!(process("kaai"), "KI");
    }

    #[test]
    fn test_digraphs_longest_first() {
        assert_eq!(process("akshara"), "AKS1R");
        assert_eq!(process("pakka"), "PK2");
        assert_eq!(process("chaaya"), "CY");
    }

    #[test]
    fn test_trailing_m_is_nasal() {
        assert_eq!(process("maram"), "MR3");
        // 词首 m 不折叠
        assert_eq!(process("m"), "M");
        assert_eq!(process("amm"), "AM2");
    }
}
