use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, BTreeSet};

use super::tsquery::{self, TermDoc, TsQuery};
use super::{IndexTokens, Indexed, RelationParams, SearchParams, Store, StoreError};
use crate::models::{Comment, Entry, GlossaryWord, RelatedEntry, Relation, Stats, Status};
use super::stopwords;
use crate::services::rank::{
    content_words, direct_rank, merge_ranked, normalize_head, simple_tokens, token_rank,
};
use crate::tokenizer::{serialize_tokens, Token};

/// 内置词典名 -> 词干算法, `simple` 只做小写
fn algorithm(dict: &str) -> Option<Algorithm> {
    Some(match dict {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    })
}

/// 按词典切词, 去掉该词典的停用词后取词干
fn stems(dict: &str, text: &str) -> Vec<String> {
    let stemmer = algorithm(dict).map(Stemmer::create);
    let stop = stopwords::for_dict(dict);
    let mut out: Vec<String> = Vec::new();

    for w in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if stop.contains(&w) {
            continue;
        }
        let s = match &stemmer {
            Some(st) => st.stem(w).into_owned(),
            None => w.to_string(),
        };
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

/// plainto_tsquery 语义: 所有词干都要出现
fn plain_query(dict: &str, text: &str) -> Option<TsQuery> {
    stems(dict, text)
        .into_iter()
        .map(|s| TsQuery::Term {
            text: s,
            prefix: false,
        })
        .reduce(|a, b| TsQuery::And(Box::new(a), Box::new(b)))
}

#[derive(Debug, Clone)]
struct Stored {
    entry: Entry,
    terms: TermDoc,
}

#[derive(Debug, Clone)]
struct StoredRelation {
    from_id: i64,
    to_id: i64,
    rel: Relation,
}

#[derive(Debug, Clone, Default)]
struct Inner {
    entries: BTreeMap<i64, Stored>,
    relations: BTreeMap<i64, StoredRelation>,
    comments: BTreeMap<i64, Comment>,
    last_entry_id: i64,
    last_relation_id: i64,
    last_comment_id: i64,
}

fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().any(|x| b.contains(x))
}

impl Inner {
    fn has_outgoing(&self, id: i64) -> bool {
        self.relations.values().any(|r| r.from_id == id)
    }

    fn has_type(&self, id: i64, types: &[String]) -> bool {
        self.relations
            .values()
            .any(|r| r.from_id == id && overlaps(&r.rel.types, types))
    }

    fn index(e: &Entry, idx: &IndexTokens) -> Result<(String, TermDoc), StoreError> {
        match idx {
            IndexTokens::Native { dict } => {
                let tokens: Vec<Token> = stems(dict, &e.content_text())
                    .into_iter()
                    .map(|s| Token::new(s, 4))
                    .collect();
                let text = serialize_tokens(&tokens);
                let terms = tsquery::parse_vector(&text).map_err(StoreError::Constraint)?;
                Ok((text, terms))
            }
            IndexTokens::Precomputed(text) => {
                let terms = tsquery::parse_vector(text).map_err(StoreError::Constraint)?;
                Ok((text.clone(), terms))
            }
        }
    }

    fn insert_entry(&mut self, e: &Indexed) -> Result<i64, StoreError> {
        let mut entry = e.entry.clone();
        if entry.content.is_empty() {
            return Err(StoreError::Constraint("entry content is empty".into()));
        }
        if self.entries.values().any(|s| s.entry.guid == entry.guid) {
            return Err(StoreError::Constraint(format!("duplicate guid {}", entry.guid)));
        }

        let (tokens, terms) = Self::index(&entry, &e.index)?;
        if entry.weight == 0.0 {
            entry.weight = self
                .entries
                .values()
                .filter(|s| s.entry.lang == entry.lang)
                .map(|s| s.entry.weight)
                .fold(0.0, f64::max)
                + 1.0;
        }

        self.last_entry_id += 1;
        let now = Utc::now();
        entry.id = self.last_entry_id;
        entry.tokens = tokens;
        entry.created_at = Some(now);
        entry.updated_at = Some(now);
        entry.relations.clear();
        entry.relation = None;

        self.entries.insert(entry.id, Stored { entry, terms });
        Ok(self.last_entry_id)
    }

    fn insert_relation(&mut self, from_id: i64, to_id: i64, r: &Relation) -> Result<i64, StoreError> {
        if !self.entries.contains_key(&from_id) || !self.entries.contains_key(&to_id) {
            return Err(StoreError::Constraint("relation references a missing entry".into()));
        }
        if self
            .relations
            .values()
            .any(|x| x.from_id == from_id && x.to_id == to_id)
        {
            return Err(StoreError::Constraint(format!(
                "relation {} -> {} already exists",
                from_id, to_id
            )));
        }

        let mut rel = r.clone();
        if rel.weight == 0.0 {
            rel.weight = self
                .relations
                .values()
                .filter(|x| x.from_id == from_id)
                .map(|x| x.rel.weight)
                .fold(0.0, f64::max)
                + 1.0;
        }

        self.last_relation_id += 1;
        let now = Utc::now();
        rel.id = self.last_relation_id;
        rel.created_at = Some(now);
        rel.updated_at = Some(now);

        self.relations.insert(
            rel.id,
            StoredRelation {
                from_id,
                to_id,
                rel,
            },
        );
        Ok(self.last_relation_id)
    }

    /// 删除词条以及指向它或从它出发的关系
    fn remove_entry(&mut self, id: i64) -> bool {
        self.relations.retain(|_, r| r.from_id != id && r.to_id != id);
        self.comments.retain(|_, c| c.from_id != id && c.to_id != Some(id));
        self.entries.remove(&id).is_some()
    }
}

/// 进程内存储, 多步写入在副本上完成后整体替换
#[derive(Debug, Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在副本上执行, 成功才提交
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }
}

#[async_trait]
impl Store for MemStore {
    async fn search(&self, p: &SearchParams) -> Result<(Vec<Entry>, i64), StoreError> {
        let inner = self.inner.read();

        let query_head = normalize_head(&p.raw_query, p.rank.prefix_len);
        let query_words = simple_tokens(&p.raw_query);
        let tsq = if !p.builtin_dict.is_empty() {
            plain_query(&p.builtin_dict, &p.raw_query)
        } else if !p.precomputed_query.is_empty() {
            tsquery::parse_query(&p.precomputed_query)
                .map_err(|e| StoreError::Constraint(format!("bad query: {}", e)))?
        } else {
            None
        };

        let mut direct = Vec::new();
        let mut token = Vec::new();

        for s in inner.entries.values() {
            let e = &s.entry;
            if e.lang != p.lang || e.status != p.status {
                continue;
            }
            if !p.tags.is_empty() && !overlaps(&e.tags, &p.tags) {
                continue;
            }
            if !p.types.is_empty() && !inner.has_type(e.id, &p.types) {
                continue;
            }

            let head = e.head();
            let exact = normalize_head(head, p.rank.prefix_len) == query_head;
            let words = content_words(&e.content);

            if exact || query_words.iter().any(|w| words.contains(w)) {
                let mut hit = e.clone();
                hit.rank = direct_rank(head, exact, &p.rank);
                direct.push(hit);
            } else if let Some(score) = tsq.as_ref().and_then(|q| q.score(&s.terms)) {
                let mut hit = e.clone();
                hit.rank = token_rank(score);
                token.push(hit);
            }
        }

        Ok(merge_ranked(direct, token, p.offset, p.limit))
    }

    async fn search_relations(&self, p: &RelationParams) -> Result<Vec<RelatedEntry>, StoreError> {
        let inner = self.inner.read();
        let mut out = Vec::new();

        for r in inner.relations.values() {
            if !p.parent_ids.contains(&r.from_id) || r.rel.status != p.status {
                continue;
            }
            if !p.types.is_empty() && !overlaps(&r.rel.types, &p.types) {
                continue;
            }
            if !p.tags.is_empty() && !overlaps(&r.rel.tags, &p.tags) {
                continue;
            }
            let Some(child) = inner.entries.get(&r.to_id) else {
                continue;
            };
            if child.entry.status != p.status {
                continue;
            }
            if let Some(l) = &p.to_lang {
                if &child.entry.lang != l {
                    continue;
                }
            }

            let mut entry = child.entry.clone();
            entry.relation = Some(r.rel.clone());
            out.push(RelatedEntry {
                from_id: r.from_id,
                entry,
            });
        }

        out.sort_by(|a, b| {
            let (ra, rb) = (a.entry.relation.as_ref(), b.entry.relation.as_ref());
            a.from_id
                .cmp(&b.from_id)
                .then(
                    ra.map(|r| r.weight)
                        .unwrap_or(0.0)
                        .total_cmp(&rb.map(|r| r.weight).unwrap_or(0.0)),
                )
                .then(ra.map(|r| r.id).cmp(&rb.map(|r| r.id)))
        });
        Ok(out)
    }

    async fn get_entry(&self, id: i64, guid: &str) -> Result<Entry, StoreError> {
        let inner = self.inner.read();
        let found = if id != 0 {
            inner.entries.get(&id)
        } else {
            inner.entries.values().find(|s| s.entry.guid == guid)
        };
        found.map(|s| s.entry.clone()).ok_or(StoreError::NotFound)
    }

    async fn get_parent_entries(&self, id: i64) -> Result<Vec<Entry>, StoreError> {
        let inner = self.inner.read();
        let mut out: Vec<Entry> = inner
            .relations
            .values()
            .filter(|r| r.to_id == id)
            .filter_map(|r| inner.entries.get(&r.from_id))
            .map(|s| s.entry.clone())
            .collect();
        out.sort_by(|a, b| a.weight.total_cmp(&b.weight).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn insert_entry(&self, e: &Indexed) -> Result<i64, StoreError> {
        self.inner.write().insert_entry(e)
    }

    async fn update_entry(&self, id: i64, e: &Indexed) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if e.entry.content.is_empty() {
            return Err(StoreError::Constraint("entry content is empty".into()));
        }
        let (tokens, terms) = Inner::index(&e.entry, &e.index)?;
        let s = inner.entries.get_mut(&id).ok_or(StoreError::NotFound)?;

        let cur = &mut s.entry;
        let new = &e.entry;
        cur.content = new.content.clone();
        cur.initial = new.initial.clone();
        if new.weight != 0.0 {
            cur.weight = new.weight;
        }
        cur.tokens = tokens;
        cur.lang = new.lang.clone();
        cur.tags = new.tags.clone();
        cur.phones = new.phones.clone();
        cur.notes = new.notes.clone();
        cur.meta = new.meta.clone();
        cur.status = new.status;
        cur.updated_at = Some(Utc::now());
        s.terms = terms;
        Ok(())
    }

    async fn delete_entry(&self, id: i64) -> Result<(), StoreError> {
        if self.inner.write().remove_entry(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn insert_relation(&self, from_id: i64, to_id: i64, r: &Relation) -> Result<i64, StoreError> {
        self.inner.write().insert_relation(from_id, to_id, r)
    }

    async fn update_relation(&self, id: i64, r: &Relation) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let cur = &mut inner.relations.get_mut(&id).ok_or(StoreError::NotFound)?.rel;
        cur.types = r.types.clone();
        cur.tags = r.tags.clone();
        cur.notes = r.notes.clone();
        if r.weight != 0.0 {
            cur.weight = r.weight;
        }
        cur.status = r.status;
        cur.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_relation(&self, id: i64) -> Result<(), StoreError> {
        match self.inner.write().relations.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn reorder_relations(&self, ids: &[i64]) -> Result<(), StoreError> {
        self.transaction(|inner| {
            let mut current = Vec::with_capacity(ids.len());
            for id in ids {
                let r = inner.relations.get(id).ok_or(StoreError::NotFound)?;
                current.push((r.from_id, r.rel.weight, *id));
            }
            if current.windows(2).any(|w| w[0].0 != w[1].0) {
                return Err(StoreError::Constraint("relations belong to different entries".into()));
            }
            if ids.iter().collect::<BTreeSet<_>>().len() != ids.len() {
                return Err(StoreError::Constraint("duplicate relation ids".into()));
            }

            // 已经是当前顺序, 不改动
            let mut sorted = current.clone();
            sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
            if sorted.iter().map(|c| c.2).eq(ids.iter().copied()) {
                return Ok(());
            }

            let now = Utc::now();
            for (i, id) in ids.iter().enumerate() {
                if let Some(r) = inner.relations.get_mut(id) {
                    r.rel.weight = (i + 1) as f64;
                    r.rel.updated_at = Some(now);
                }
            }
            Ok(())
        })
    }

    async fn get_initials(&self, lang: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        let set: BTreeSet<String> = inner
            .entries
            .values()
            .map(|s| &s.entry)
            .filter(|e| {
                e.lang == lang
                    && e.status == Status::Enabled
                    && !e.initial.is_empty()
                    && inner.has_outgoing(e.id)
            })
            .map(|e| e.initial.clone())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn get_glossary_words(
        &self,
        lang: &str,
        initial: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<GlossaryWord>, i64), StoreError> {
        let inner = self.inner.read();
        let mut words: Vec<&Entry> = inner
            .entries
            .values()
            .map(|s| &s.entry)
            .filter(|e| {
                e.lang == lang
                    && e.initial == initial
                    && e.status == Status::Enabled
                    && inner.has_outgoing(e.id)
            })
            .collect();
        words.sort_by(|a, b| a.weight.total_cmp(&b.weight).then(a.id.cmp(&b.id)));

        let total = words.len() as i64;
        let page = words
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|e| GlossaryWord {
                id: e.id,
                guid: e.guid.clone(),
                content: e.content.clone(),
                total,
            })
            .collect();
        Ok((page, total))
    }

    async fn get_stats(&self) -> Result<Stats, StoreError> {
        let inner = self.inner.read();
        let mut languages = BTreeMap::new();
        for s in inner.entries.values() {
            *languages.entry(s.entry.lang.clone()).or_insert(0) += 1;
        }
        Ok(Stats {
            entries: inner.entries.len() as i64,
            relations: inner.relations.len() as i64,
            languages,
        })
    }

    async fn get_pending_entries(
        &self,
        lang: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Entry>, i64), StoreError> {
        let inner = self.inner.read();
        let mut out: Vec<Entry> = inner
            .entries
            .values()
            .map(|s| &s.entry)
            .filter(|e| {
                e.status == Status::Pending
                    && lang.map(|l| e.lang == l).unwrap_or(true)
                    && !inner.relations.values().any(|r| r.to_id == e.id)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = out.len() as i64;
        let page = out
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|mut e| {
                e.total = total;
                e
            })
            .collect();
        Ok((page, total))
    }

    async fn insert_submission(
        &self,
        head: &Indexed,
        definition: Option<(&Indexed, &Relation)>,
    ) -> Result<i64, StoreError> {
        self.transaction(|inner| {
            let mut head = head.clone();
            head.entry.status = Status::Pending;
            let id = inner.insert_entry(&head)?;

            if let Some((def, rel)) = definition {
                let mut def = def.clone();
                def.entry.status = Status::Pending;
                let to_id = inner.insert_entry(&def)?;

                let mut rel = rel.clone();
                rel.status = Status::Pending;
                inner.insert_relation(id, to_id, &rel)?;
            }
            Ok(id)
        })
    }

    async fn approve_submission(&self, id: i64) -> Result<(), StoreError> {
        self.transaction(|inner| {
            match inner.entries.get(&id) {
                Some(s) if s.entry.status == Status::Pending => {}
                _ => return Err(StoreError::NotFound),
            }

            let now = Utc::now();
            let targets: Vec<i64> = inner
                .relations
                .values()
                .filter(|r| r.from_id == id && r.rel.status == Status::Pending)
                .map(|r| r.to_id)
                .collect();

            for tid in targets.iter().chain(std::iter::once(&id)) {
                if let Some(s) = inner.entries.get_mut(tid) {
                    if s.entry.status == Status::Pending {
                        s.entry.status = Status::Enabled;
                        s.entry.updated_at = Some(now);
                    }
                }
            }
            for r in inner.relations.values_mut() {
                if r.from_id == id && r.rel.status == Status::Pending {
                    r.rel.status = Status::Enabled;
                    r.rel.updated_at = Some(now);
                }
            }
            Ok(())
        })
    }

    async fn reject_submission(&self, id: i64) -> Result<(), StoreError> {
        self.transaction(|inner| {
            match inner.entries.get(&id) {
                Some(s) if s.entry.status == Status::Pending => {}
                _ => return Err(StoreError::NotFound),
            }

            // 只删除不再被其他词条引用的待审释义
            let targets: Vec<i64> = inner
                .relations
                .values()
                .filter(|r| r.from_id == id && r.rel.status == Status::Pending)
                .map(|r| r.to_id)
                .filter(|tid| {
                    inner.entries.get(tid).map(|s| s.entry.status) == Some(Status::Pending)
                        && !inner
                            .relations
                            .values()
                            .any(|r| r.to_id == *tid && r.from_id != id)
                })
                .collect();

            for tid in targets {
                inner.remove_entry(tid);
            }
            inner
                .relations
                .retain(|_, r| !(r.from_id == id && r.rel.status == Status::Pending));
            inner.remove_entry(id);
            Ok(())
        })
    }

    async fn delete_all_pending(&self) -> Result<(), StoreError> {
        self.transaction(|inner| {
            inner.relations.retain(|_, r| r.rel.status != Status::Pending);
            let pending: Vec<i64> = inner
                .entries
                .values()
                .filter(|s| s.entry.status == Status::Pending)
                .map(|s| s.entry.id)
                .collect();
            for id in pending {
                inner.remove_entry(id);
            }
            inner.comments.clear();
            Ok(())
        })
    }

    async fn insert_comment(&self, from_guid: &str, to_guid: &str, comments: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.write();
        let find = |guid: &str| {
            inner
                .entries
                .values()
                .find(|s| s.entry.guid == guid)
                .map(|s| s.entry.id)
        };

        let from_id = find(from_guid).ok_or(StoreError::NotFound)?;
        let to_id = match to_guid {
            "" => None,
            g => Some(find(g).ok_or(StoreError::NotFound)?),
        };

        inner.last_comment_id += 1;
        let id = inner.last_comment_id;
        inner.comments.insert(
            id,
            Comment {
                id,
                from_id,
                to_id,
                comments: comments.to_string(),
                created_at: Some(Utc::now()),
                ..Default::default()
            },
        );
        Ok(id)
    }

    async fn get_comments(&self) -> Result<Vec<Comment>, StoreError> {
        let inner = self.inner.read();
        let guid = |id: i64| inner.entries.get(&id).map(|s| s.entry.guid.clone());

        let mut out: Vec<Comment> = inner
            .comments
            .values()
            .map(|c| Comment {
                from_guid: guid(c.from_id),
                to_guid: c.to_id.and_then(guid),
                ..c.clone()
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn delete_comment(&self, id: i64) -> Result<(), StoreError> {
        match self.inner.write().comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_words(&self, lang: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        let words: BTreeSet<String> = inner
            .entries
            .values()
            .filter(|s| s.entry.lang == lang && s.entry.status == Status::Enabled)
            .map(|s| s.entry.head().to_string())
            .collect();
        Ok(words.into_iter().collect())
    }

    async fn get_suggestions(&self, lang: &str, prefix: &str, limit: i64) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        let mut hits: Vec<&Entry> = inner
            .entries
            .values()
            .map(|s| &s.entry)
            .filter(|e| {
                e.lang == lang && e.status == Status::Enabled && e.head().to_lowercase().starts_with(prefix)
            })
            .collect();
        hits.sort_by(|a, b| a.weight.total_cmp(&b.weight).then(a.id.cmp(&b.id)));

        Ok(hits
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|e| e.head().to_string())
            .collect())
    }
}
