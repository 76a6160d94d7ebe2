//! 与 Postgres 兼容的 tsvector/tsquery 文本解析, 供内存存储使用
//!
//! 支持: 词项, 引号词项, `:*` 前缀匹配, `&`, `|`, `!`, 括号。

use std::collections::HashMap;

/// 词项 -> 最高的权重标签 (A 最高)
pub type TermDoc = HashMap<String, char>;

/// 与 ts_rank 默认权重一致: {D, C, B, A} = {0.1, 0.2, 0.4, 1.0}
pub fn label_score(label: char) -> f64 {
    match label {
        'A' => 1.0,
        'B' => 0.4,
        'C' => 0.2,
        _ => 0.1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsQuery {
    Term { text: String, prefix: bool },
    And(Box<TsQuery>, Box<TsQuery>),
    Or(Box<TsQuery>, Box<TsQuery>),
    Not(Box<TsQuery>),
}

impl TsQuery {
    /// 匹配时返回 [0, 1] 的相关度, 不匹配返回 None
    pub fn score(&self, doc: &TermDoc) -> Option<f64> {
        match self {
            TsQuery::Term { text, prefix: false } => doc.get(text).map(|l| label_score(*l)),
            TsQuery::Term { text, prefix: true } => doc
                .iter()
                .filter(|(t, _)| t.starts_with(text.as_str()))
                .map(|(_, l)| label_score(*l))
                .reduce(f64::max),
            TsQuery::And(a, b) => Some((a.score(doc)? + b.score(doc)?) / 2.0),
            TsQuery::Or(a, b) => match (a.score(doc), b.score(doc)) {
                (Some(x), Some(y)) => Some(x.max(y)),
                (x, y) => x.or(y),
            },
            TsQuery::Not(a) => match a.score(doc) {
                Some(_) => None,
                None => Some(0.0),
            },
        }
    }

    pub fn matches(&self, doc: &TermDoc) -> bool {
        self.score(doc).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Term(String, bool),
    And,
    Or,
    Not,
    Open,
    Close,
}

/// 读取一个词项 (引号或裸词), 返回词项和结束位置
fn read_term(chars: &[char], mut i: usize) -> Result<(String, usize), String> {
    let mut text = String::new();
    if chars[i] == '\'' {
        i += 1;
        loop {
            match chars.get(i) {
                None => return Err("unterminated quote".to_string()),
                Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                    text.push('\'');
                    i += 2;
                }
                Some('\'') => {
                    i += 1;
                    break;
                }
                Some(c) => {
                    text.push(*c);
                    i += 1;
                }
            }
        }
    } else {
        while let Some(c) = chars.get(i) {
            if c.is_whitespace() || "():&|!'".contains(*c) {
                break;
            }
            text.push(*c);
            i += 1;
        }
    }
    if text.is_empty() {
        return Err("empty term".to_string());
    }
    Ok((text, i))
}

fn lex(s: &str) -> Result<Vec<Tok>, String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '&' => {
                out.push(Tok::And);
                i += 1;
            }
            '|' => {
                out.push(Tok::Or);
                i += 1;
            }
            '!' => {
                out.push(Tok::Not);
                i += 1;
            }
            '(' => {
                out.push(Tok::Open);
                i += 1;
            }
            ')' => {
                out.push(Tok::Close);
                i += 1;
            }
            _ => {
                let (text, next) = read_term(&chars, i)?;
                i = next;

                // 权重/前缀修饰, 如 :* 或 :AB*
                let mut prefix = false;
                if chars.get(i) == Some(&':') {
                    i += 1;
                    while let Some(m) = chars.get(i) {
                        match m {
                            '*' => prefix = true,
                            'A'..='D' | 'a'..='d' => {}
                            _ => break,
                        }
                        i += 1;
                    }
                }
                out.push(Tok::Term(text, prefix));
            }
        }
    }
    Ok(out)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn or(&mut self) -> Result<TsQuery, String> {
        let mut left = self.and()?;
        while self.peek() == Some(&Tok::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = TsQuery::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<TsQuery, String> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Tok::And) {
            self.pos += 1;
            let right = self.unary()?;
            left = TsQuery::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<TsQuery, String> {
        let tok = self.peek().cloned();
        self.pos += 1;
        match tok {
            Some(Tok::Not) => Ok(TsQuery::Not(Box::new(self.unary()?))),
            Some(Tok::Open) => {
                let inner = self.or()?;
                if self.peek() != Some(&Tok::Close) {
                    return Err("missing ')'".to_string());
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Tok::Term(text, prefix)) => Ok(TsQuery::Term { text, prefix }),
            Some(t) => Err(format!("unexpected {:?}", t)),
            None => Err("unexpected end of query".to_string()),
        }
    }
}

/// 解析查询表达式, 空表达式返回 None
pub fn parse_query(s: &str) -> Result<Option<TsQuery>, String> {
    let toks = lex(s)?;
    if toks.is_empty() {
        return Ok(None);
    }

    let mut p = Parser { toks, pos: 0 };
    let q = p.or()?;
    if p.pos != p.toks.len() {
        return Err(format!("trailing input at token {}", p.pos));
    }
    Ok(Some(q))
}

/// 解析 tsvector 文本 `'tok':1A 'tok2':2B,3C`
pub fn parse_vector(s: &str) -> Result<TermDoc, String> {
    let chars: Vec<char> = s.chars().collect();
    let mut doc = TermDoc::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let (text, next) = read_term(&chars, i)?;
        i = next;

        // 没有标签的位置默认为 D
        let mut best = 'D';
        if chars.get(i) == Some(&':') {
            i += 1;
            while let Some(c) = chars.get(i) {
                if c.is_whitespace() {
                    break;
                }
                if ('A'..='D').contains(c) && *c < best {
                    best = *c;
                }
                i += 1;
            }
        }

        let slot = doc.entry(text).or_insert(best);
        if best < *slot {
            *slot = best;
        }
    }
    Ok(doc)
}
