use crate::cache;
use crate::error::Error;
use crate::models::{GlossaryPage, Pagination, Stats};
use crate::AppState;

fn check_lang(state: &AppState, lang: &str) -> Result<(), Error> {
    state.langs.resolve(lang)?;
    Ok(())
}

/// 某语言词汇表的所有首字母
pub async fn initials(state: &AppState, lang: &str) -> Result<Vec<String>, Error> {
    check_lang(state, lang)?;
    Ok(state.store.get_initials(lang).await?)
}

/// 按首字母分页列出词汇, 公开请求走缓存
pub async fn words(
    state: &AppState,
    lang: &str,
    initial: &str,
    pg: &Pagination,
    public: bool,
) -> Result<GlossaryPage, Error> {
    check_lang(state, lang)?;

    let key = cache::glossary_key(lang, initial, pg.offset, pg.limit);
    if public {
        if let Some(page) = state.cache_get::<GlossaryPage>(&key) {
            return Ok(page);
        }
    }

    let (mut words, total) = state
        .store
        .get_glossary_words(lang, initial, pg.offset, pg.limit)
        .await?;
    if public {
        words.iter_mut().for_each(|w| w.id = 0);
    }

    let page = GlossaryPage {
        words,
        page: pg.page,
        per_page: pg.per_page,
        total,
        total_pages: pg.total_pages(total),
    };
    if public {
        state.cache_put(&key, &page);
    }
    Ok(page)
}

pub async fn stats(state: &AppState) -> Result<Stats, Error> {
    Ok(state.store.get_stats().await?)
}
