//! 各文字的字形 -> 音形符号映射表
//!
//! 数字约定:
//! - `1` 卷舌/变体辅音 (ಟ, ಣ, ಳ, ഷ ...)
//! - `2` 叠辅音 (gemination)
//! - `3` 鼻化符 anusvara, 所有层级都保留
//! - `4`-`9` 元音符号的音质

pub(crate) type Glyphs = &'static [(&'static str, &'static str)];

/// 单个文字的原始映射表
pub(crate) struct ScriptTable {
    pub first: char,
    pub last: char,
    pub compounds: Glyphs,
    pub consonants: Glyphs,
    pub vowels: Glyphs,
    /// 词尾专用字形 (如马拉雅拉姆语 chillu)
    pub terminals: Glyphs,
    pub modifiers: Glyphs,
}

pub(crate) static KANNADA: ScriptTable = ScriptTable {
    first: '\u{0C80}',
    last: '\u{0CFF}',
    compounds: &[
        ("ಕ್ಷ", "KS1"),
        ("ಕ್ಕ", "K2"),
        ("ಗ್ಗ", "K2"),
        ("ಙ್ಙ", "NG2"),
        ("ಚ್ಚ", "C2"),
        ("ಜ್ಜ", "J2"),
        ("ಞ್ಞ", "NJ2"),
        ("ಟ್ಟ", "T12"),
        ("ಡ್ಡ", "T12"),
        ("ಣ್ಣ", "N12"),
        ("ತ್ತ", "T2"),
        ("ದ್ದ", "T2"),
        ("ದ್ಧ", "T2"),
        ("ನ್ನ", "N2"),
        ("ಪ್ಪ", "P2"),
        ("ಬ್ಬ", "B2"),
        ("ಮ್ಮ", "M2"),
        ("ಯ್ಯ", "Y2"),
        ("ಲ್ಲ", "L2"),
        ("ವ್ವ", "V2"),
        ("ಶ್ಶ", "S12"),
        ("ಸ್ಸ", "S2"),
        ("ಳ್ಳ", "L12"),
    ],
    consonants: &[
        ("ಕ", "K"),
        ("ಖ", "K"),
        ("ಗ", "K"),
        ("ಘ", "K"),
        ("ಙ", "NG"),
        ("ಚ", "C"),
        ("ಛ", "C"),
        ("ಜ", "J"),
        ("ಝ", "J"),
        ("ಞ", "NJ"),
        ("ಟ", "T1"),
        ("ಠ", "T1"),
        ("ಡ", "T1"),
        ("ಢ", "T1"),
        ("ಣ", "N1"),
        ("ತ", "T"),
        ("ಥ", "T"),
        ("ದ", "T"),
        ("ಧ", "T"),
        ("ನ", "N"),
        ("ಪ", "P"),
        ("ಫ", "F"),
        ("ಬ", "B"),
        ("ಭ", "B"),
        ("ಮ", "M"),
        ("ಯ", "Y"),
        ("ರ", "R"),
        ("ಱ", "R1"),
        ("ಲ", "L"),
        ("ವ", "V"),
        ("ಶ", "S1"),
        ("ಷ", "S1"),
        ("ಸ", "S"),
        ("ಹ", "H"),
        ("ಳ", "L1"),
        ("ೞ", "Z"),
    ],
    vowels: &[
        ("ಅ", "A"),
        ("ಆ", "A"),
        ("ಇ", "I"),
        ("ಈ", "I"),
        ("ಉ", "U"),
        ("ಊ", "U"),
        ("ಋ", "R"),
        ("ಎ", "E"),
        ("ಏ", "E"),
        ("ಐ", "AI"),
        ("ಒ", "O"),
        ("ಓ", "O"),
        ("ಔ", "O"),
    ],
    terminals: &[],
    modifiers: &[
        ("ಾ", ""),
        ("ಃ", ""),
        ("್", ""),
        ("ೕ", ""),
        ("ೖ", ""),
        ("ೃ", "R"),
        ("ಂ", "3"),
        ("ಿ", "4"),
        ("ೀ", "4"),
        ("ು", "5"),
        ("ೂ", "5"),
        ("ೆ", "6"),
        ("ೇ", "6"),
        ("ೈ", "7"),
        ("ೊ", "8"),
        ("ೋ", "8"),
        ("ೌ", "9"),
    ],
};

pub(crate) static MALAYALAM: ScriptTable = ScriptTable {
    first: '\u{0D00}',
    last: '\u{0D7F}',
    compounds: &[
        ("ക്ഷ", "KS1"),
        ("ണ്ട", "N1T1"),
        ("ന്റ", "NT1"),
        ("ന്ത", "NT"),
        ("ങ്ക", "NK"),
        ("ഞ്ച", "NJC"),
        ("മ്പ", "MP"),
        ("ക്ക", "K2"),
        ("ഗ്ഗ", "K2"),
        ("ങ്ങ", "NG2"),
        ("ച്ച", "C2"),
        ("ജ്ജ", "J2"),
        ("ഞ്ഞ", "NJ2"),
        ("ട്ട", "T12"),
        ("റ്റ", "T12"),
        ("ണ്ണ", "N12"),
        ("ത്ത", "T2"),
        ("ദ്ദ", "T2"),
        ("ദ്ധ", "T2"),
        ("ന്ന", "N2"),
        ("പ്പ", "P2"),
        ("ബ്ബ", "B2"),
        ("മ്മ", "M2"),
        ("യ്യ", "Y2"),
        ("ല്ല", "L2"),
        ("വ്വ", "V2"),
        ("ശ്ശ", "S12"),
        ("സ്സ", "S2"),
        ("ള്ള", "L12"),
    ],
    consonants: &[
        ("ക", "K"),
        ("ഖ", "K"),
        ("ഗ", "K"),
        ("ഘ", "K"),
        ("ങ", "NG"),
        ("ച", "C"),
        ("ഛ", "C"),
        ("ജ", "J"),
        ("ഝ", "J"),
        ("ഞ", "NJ"),
        ("ട", "T1"),
        ("ഠ", "T1"),
        ("ഡ", "T1"),
        ("ഢ", "T1"),
        ("ണ", "N1"),
        ("ത", "T"),
        ("ഥ", "T"),
        ("ദ", "T"),
        ("ധ", "T"),
        ("ന", "N"),
        ("പ", "P"),
        ("ഫ", "F"),
        ("ബ", "B"),
        ("ഭ", "B"),
        ("മ", "M"),
        ("യ", "Y"),
        ("ര", "R"),
        ("റ", "R1"),
        ("ല", "L"),
        ("വ", "V"),
        ("ശ", "S1"),
        ("ഷ", "S1"),
        ("സ", "S"),
        ("ഹ", "H"),
        ("ള", "L1"),
        ("ഴ", "Z"),
    ],
    vowels: &[
        ("അ", "A"),
        ("ആ", "A"),
        ("ഇ", "I"),
        ("ഈ", "I"),
        ("ഉ", "U"),
        ("ഊ", "U"),
        ("ഋ", "R"),
        ("എ", "E"),
        ("ഏ", "E"),
        ("ഐ", "AI"),
        ("ഒ", "O"),
        ("ഓ", "O"),
        ("ഔ", "O"),
    ],
    terminals: &[
        ("ൺ", "N1"),
        ("ൻ", "N"),
        ("ർ", "R"),
        ("ൽ", "L"),
        ("ൾ", "L1"),
        ("ൿ", "K"),
    ],
    modifiers: &[
        ("ാ", ""),
        ("ഃ", ""),
        ("്", ""),
        ("ൃ", "R"),
        ("ം", "3"),
        ("ി", "4"),
        ("ീ", "4"),
        ("ു", "5"),
        ("ൂ", "5"),
        ("െ", "6"),
        ("േ", "6"),
        ("ൈ", "7"),
        ("ൊ", "8"),
        ("ോ", "8"),
        ("ൌ", "9"),
        ("ൗ", "9"),
    ],
};
