use crate::autocomplete::normalize_word;
use crate::error::Error;
use crate::AppState;

/// 从存储重建所有语言的前缀树
pub async fn rebuild(state: &AppState) -> Result<(), Error> {
    for lang in state.langs.iter() {
        let words = state.store.get_words(&lang.id).await?;
        let n = state.autocomplete.build(&lang.id, &words);
        tracing::info!("<<< 自动补全: {} 载入 {} 个词", lang.id, n);
    }
    Ok(())
}

/// 自动补全: 先查前缀树, 不够再用存储层前缀查询补足
pub async fn suggest(state: &AppState, lang: &str, q: &str) -> Result<Vec<String>, Error> {
    let prefix = normalize_word(q);
    if prefix.is_empty() {
        return Err(Error::validation("empty query"));
    }
    state.langs.resolve(lang)?;

    let cfg = &state.config.search;
    if !cfg.suggestions {
        return Ok(Vec::new());
    }

    let limit = cfg.num_suggestions;
    let mut out = state.autocomplete.query(lang, &prefix, limit);
    if out.len() >= limit {
        return Ok(out);
    }

    // 补全失败不影响已有结果
    match state
        .store
        .get_suggestions(lang, &prefix, limit as i64)
        .await
    {
        Ok(more) => {
            for w in more {
                let w = normalize_word(&w);
                if !w.is_empty() && !out.contains(&w) {
                    out.push(w);
                }
                if out.len() >= limit {
                    break;
                }
            }
        }
        Err(e) => tracing::warn!("--- 自动补全查询失败: {}", e),
    }
    Ok(out)
}
