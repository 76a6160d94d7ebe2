use dict_engine::phonetic::{encode, reduce_key0, reduce_key1, Script};
use proptest::prelude::*;

fn scripts() -> impl Strategy<Value = Script> {
    prop_oneof![Just(Script::Kannada), Just(Script::Malayalam)]
}

/// 混合原文字符, 拉丁字母和杂项字符的输入
fn words() -> impl Strategy<Value = String> {
    prop_oneof![
        "[\u{0C80}-\u{0CFF}]{0,12}",
        "[\u{0D00}-\u{0D7F}]{0,12}",
        "[a-zA-Z]{0,12}",
        ".{0,16}",
    ]
}

proptest! {
    #[test]
    fn encode_is_deterministic(w in words(), s in scripts()) {
        prop_assert_eq!(encode(&w, s), encode(&w, s));
    }

    #[test]
    fn keys_lose_detail_monotonically(w in words(), s in scripts()) {
        let k = encode(&w, s);
        prop_assert_eq!(reduce_key1(&k.key2), k.key1.clone());
        prop_assert_eq!(reduce_key0(&k.key1), k.key0.clone());
        prop_assert!(k.key0.len() <= k.key1.len());
        prop_assert!(k.key1.len() <= k.key2.len());
    }
}
