//! Lua 分词插件的沙箱运行时
//!
//! 脚本必须定义两个全局函数:
//! - `tokenize(text, lang)` 返回 token 列表, 每项可带 `:<1-3>` 权重后缀
//! - `to_query(text, lang)` 返回查询表达式
//!
//! 只加载 string/table/math/utf8 标准库, 不提供文件/网络/进程能力。
//! 脚本加载完成后全局表被冻结, 每次调用都有执行时间上限。

use mlua::{Function, HookTriggers, Lua, LuaOptions, RegistryKey, StdLib, Table, Value};
use parking_lot::Mutex;
use regex::Regex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{parse_weighted, Token, TokenizeError, Tokenize};
use crate::config::PluginConfig;

/// 每执行这么多条指令检查一次超时
const HOOK_INSTRUCTIONS: u32 = 1000;

/// 基础库里需要移除的函数
const BLOCKED_GLOBALS: &[&str] = &[
    "dofile",
    "loadfile",
    "load",
    "require",
    "print",
    "collectgarbage",
    "rawset",
];

const PROTECTED_LIBS: &[&str] = &["string", "table", "math", "utf8"];

#[derive(Debug, Clone, Copy)]
pub struct PluginLimits {
    pub timeout: Duration,
    /// 字节
    pub memory_limit: usize,
}

impl Default for PluginLimits {
    fn default() -> Self {
        Self::from(&PluginConfig::default())
    }
}

impl From<&PluginConfig> for PluginLimits {
    fn from(c: &PluginConfig) -> Self {
        Self {
            timeout: Duration::from_millis(c.timeout_ms),
            memory_limit: c.memory_limit_mb * 1024 * 1024,
        }
    }
}

pub struct ScriptTokenizer {
    name: String,
    lua: Mutex<Lua>,
    tokenize_fn: RegistryKey,
    to_query_fn: RegistryKey,
    limits: PluginLimits,
}

impl std::fmt::Debug for ScriptTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptTokenizer")
            .field("name", &self.name)
            .field("limits", &self.limits)
            .finish()
    }
}

impl ScriptTokenizer {
    pub fn from_file(path: &Path, limits: PluginLimits) -> Result<Self, TokenizeError> {
        let code = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("script")
            .to_string();
        Self::from_source(&name, &code, limits)
    }

    pub fn from_source(name: &str, code: &str, limits: PluginLimits) -> Result<Self, TokenizeError> {
        let lua = Lua::new_with(
            StdLib::STRING | StdLib::TABLE | StdLib::MATH | StdLib::UTF8,
            LuaOptions::default(),
        )?;
        lua.set_memory_limit(limits.memory_limit)?;

        let (tokenize_fn, to_query_fn) = {
            let globals = lua.globals();
            for g in BLOCKED_GLOBALS {
                globals.raw_set(*g, Value::Nil)?;
            }
            for lib in PROTECTED_LIBS {
                let t: Table = globals.raw_get(*lib)?;
                globals.raw_set(*lib, read_only(&lua, t)?)?;
            }
            globals.raw_set("utils", read_only(&lua, utils_table(&lua)?)?)?;

            // 字符串方法 ("x"):upper() 走 string 元表, 同样换成只读代理并锁住元表
            let string_mt: Table = lua.load(r#"return getmetatable("")"#).eval()?;
            string_mt.raw_set("__index", globals.raw_get::<_, Table>("string")?)?;
            string_mt.raw_set("__metatable", false)?;

            guarded(&lua, limits.timeout, || lua.load(code).exec())?;

            let tokenize = entry_point(&globals, "tokenize")?;
            let to_query = entry_point(&globals, "to_query")?;
            freeze(&lua, &globals)?;

            (
                lua.create_registry_value(tokenize)?,
                lua.create_registry_value(to_query)?,
            )
        };

        tracing::info!("<<< 加载分词脚本: {}", name);
        Ok(Self {
            name: name.to_string(),
            lua: Mutex::new(lua),
            tokenize_fn,
            to_query_fn,
            limits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Tokenize for ScriptTokenizer {
    fn to_tokens(&self, text: &str, lang: &str) -> Result<Vec<Token>, TokenizeError> {
        let lua = self.lua.lock();
        let raw: Vec<String> = guarded(&lua, self.limits.timeout, || {
            let f: Function = lua.registry_value(&self.tokenize_fn)?;
            f.call((text, lang))
        })?;

        raw.iter().map(|s| parse_weighted(s)).collect()
    }

    fn to_query(&self, text: &str, lang: &str) -> Result<String, TokenizeError> {
        let lua = self.lua.lock();
        guarded(&lua, self.limits.timeout, || {
            let f: Function = lua.registry_value(&self.to_query_fn)?;
            f.call((text, lang))
        })
    }
}

fn entry_point<'lua>(globals: &Table<'lua>, name: &str) -> Result<Function<'lua>, TokenizeError> {
    let f: Option<Function> = globals.get(name)?;
    f.ok_or_else(|| TokenizeError::Script(format!("script does not define {}()", name)))
}

/// 在超时钩子保护下执行, 超时转换为 `TokenizeError::Timeout`
fn guarded<R>(
    lua: &Lua,
    timeout: Duration,
    f: impl FnOnce() -> mlua::Result<R>,
) -> Result<R, TokenizeError> {
    let deadline = Instant::now() + timeout;
    let timed_out = Arc::new(AtomicBool::new(false));
    let flag = timed_out.clone();

    let triggers = HookTriggers {
        every_nth_instruction: Some(HOOK_INSTRUCTIONS),
        ..Default::default()
    };
    let _ = lua.set_hook(triggers, move |_lua, _debug| {
        if Instant::now() >= deadline {
            flag.store(true, Ordering::Relaxed);
            return Err(mlua::Error::RuntimeError(
                "execution time limit exceeded".to_string(),
            ));
        }
        Ok(())
    });

    let res = f();
    lua.remove_hook();

    match res {
        Ok(v) => Ok(v),
        Err(_) if timed_out.load(Ordering::Relaxed) => Err(TokenizeError::Timeout),
        Err(e) => Err(e.into()),
    }
}

fn read_only_meta<'lua>(lua: &'lua Lua, backing: Table<'lua>) -> mlua::Result<Table<'lua>> {
    let mt = lua.create_table()?;
    mt.raw_set("__index", backing)?;
    mt.raw_set(
        "__newindex",
        lua.create_function(|_, (_, key, _): (Table, Value, Value)| -> mlua::Result<()> {
            Err(mlua::Error::RuntimeError(format!(
                "attempt to modify read-only table (key {:?})",
                key
            )))
        })?,
    )?;
    mt.raw_set("__metatable", false)?;
    Ok(mt)
}

/// 返回一个只读代理表
fn read_only<'lua>(lua: &'lua Lua, t: Table<'lua>) -> mlua::Result<Table<'lua>> {
    let proxy = lua.create_table()?;
    proxy.set_metatable(Some(read_only_meta(lua, t)?));
    Ok(proxy)
}

/// 把全局表的内容挪到后备表里, 全局表本身变成只读代理
fn freeze<'lua>(lua: &'lua Lua, globals: &Table<'lua>) -> mlua::Result<()> {
    let backing = lua.create_table()?;
    let mut keys = Vec::new();
    for pair in globals.clone().pairs::<Value, Value>() {
        let (k, v) = pair?;
        backing.raw_set(k.clone(), v)?;
        keys.push(k);
    }
    for k in keys {
        globals.raw_set(k, Value::Nil)?;
    }

    globals.set_metatable(Some(read_only_meta(lua, backing)?));
    Ok(())
}

/// 注入给脚本的 `utils` 工具函数
fn utils_table(lua: &Lua) -> mlua::Result<Table<'_>> {
    let t = lua.create_table()?;

    t.set(
        "words",
        lua.create_function(|lua, s: String| {
            let mut iter = s
                .split_whitespace()
                .map(String::from)
                .collect::<Vec<_>>()
                .into_iter();
            lua.create_function_mut(move |_, ()| Ok(iter.next()))
        })?,
    )?;

    t.set(
        "trim",
        lua.create_function(|_, s: String| Ok(s.trim().to_string()))?,
    )?;

    t.set(
        "split",
        lua.create_function(|_, (s, delim): (String, String)| {
            if delim.is_empty() {
                return Ok(vec![s]);
            }
            Ok(s.split(delim.as_str()).map(String::from).collect::<Vec<_>>())
        })?,
    )?;

    t.set(
        "replace_all",
        lua.create_function(|_, (s, old, new): (String, String, String)| {
            if old.is_empty() {
                return Ok(s);
            }
            Ok(s.replace(old.as_str(), &new))
        })?,
    )?;

    t.set(
        "replace_all_pattern",
        lua.create_function(|_, (s, pattern, repl): (String, String, String)| {
            let re = Regex::new(&pattern).map_err(|e| mlua::Error::RuntimeError(e.to_string()))?;
            Ok(re.replace_all(&s, repl.as_str()).into_owned())
        })?,
    )?;

    t.set(
        "filter_unicode_range",
        lua.create_function(|_, (s, min, max): (String, u32, u32)| {
            Ok(s
                .chars()
                .filter(|c| (min..=max).contains(&(*c as u32)))
                .collect::<String>())
        })?,
    )?;

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPPER: &str = r#"
function tokenize(text, lang)
    local out = {}
    for w in utils.words(text) do
        table.insert(out, string.upper(w) .. ":1")
    end
    return out
end

function to_query(text, lang)
    local out = {}
    for w in utils.words(text) do
        table.insert(out, string.upper(w))
    end
    return table.concat(out, " & ")
end
"#;

    fn load(code: &str) -> Result<ScriptTokenizer, TokenizeError> {
        ScriptTokenizer::from_source("test", code, PluginLimits::default())
    }

    #[test]
    fn test_calls_entry_points() {
        let t = load(UPPER).unwrap();
        assert_eq!(
            t.to_tokens("foo bar", "x").unwrap(),
            vec![Token::new("FOO", 1), Token::new("BAR", 1)]
        );
        assert_eq!(t.to_query("foo bar", "x").unwrap(), "FOO & BAR");
    }

    #[test]
    fn test_missing_entry_point() {
        let err = load("function tokenize(t, l) return {} end").unwrap_err();
        assert!(matches!(err, TokenizeError::Script(m) if m.contains("to_query")));
    }

    #[test]
    fn test_utils() {
        let code = r##"
function tokenize(text, lang)
    local parts = utils.split(utils.trim(text), ",")
    local out = {}
    for _, p in ipairs(parts) do
        p = utils.replace_all(p, "-", "")
        p = utils.replace_all_pattern(p, "[0-9]+", "#")
        table.insert(out, utils.filter_unicode_range(p, 35, 122))
    end
    return out
end
function to_query(text, lang) return text end
"##;
        let t = load(code).unwrap();
        let tokens = t.to_tokens("  a-b1,c22  ", "x").unwrap();
        assert_eq!(tokens, vec![Token::new("ab#", 1), Token::new("c#", 1)]);
    }

    #[test]
    fn test_no_io_or_os() {
        let code = r#"
function tokenize(text, lang)
    return { tostring(io), tostring(os), tostring(load), tostring(require), tostring(debug) }
end
function to_query(text, lang) return "" end
"#;
        let t = load(code).unwrap();
        let tokens = t.to_tokens("x", "x").unwrap();
        assert!(tokens.iter().all(|t| t.token == "nil"));
    }

    #[test]
    fn test_globals_frozen() {
        let code = r#"
function tokenize(text, lang)
    counter = 1
    return {}
end
function to_query(text, lang)
    utils.trim = nil
    return ""
end
"#;
        let t = load(code).unwrap();
        assert!(matches!(t.to_tokens("x", "x"), Err(TokenizeError::Script(_))));
        assert!(matches!(t.to_query("x", "x"), Err(TokenizeError::Script(_))));
    }

    #[test]
    fn test_timeout() {
        let code = r#"
function tokenize(text, lang)
    while true do end
end
function to_query(text, lang) return text end
"#;
        let limits = PluginLimits {
            timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let t = ScriptTokenizer::from_source("loop", code, limits).unwrap();
        assert!(matches!(t.to_tokens("x", "x"), Err(TokenizeError::Timeout)));
        // 超时之后脚本仍然可用
        assert_eq!(t.to_query("ok", "x").unwrap(), "ok");
    }

    #[test]
    fn test_string_metatable_locked() {
        let code = r##"
function tokenize(text, lang)
    local ok = pcall(function()
        getmetatable("").__index.upper = function() return "HIJACKED" end
    end)
    return { tostring(ok), tostring(getmetatable("")) }
end
function to_query(text, lang) return text:upper() end
"##;
        let t = load(code).unwrap();
        assert_eq!(t.to_query("abc", "x").unwrap(), "ABC");

        let tokens = t.to_tokens("x", "x").unwrap();
        assert_eq!(tokens, vec![Token::new("false", 1), Token::new("false", 1)]);
        // 上一次调用的修改不能影响后续调用
        assert_eq!(t.to_query("abc", "x").unwrap(), "ABC");
    }

    #[test]
    fn test_bad_weight_suffix() {
        let code = r#"
function tokenize(text, lang) return { "a:9" } end
function to_query(text, lang) return text end
"#;
        let t = load(code).unwrap();
        assert!(matches!(t.to_tokens("x", "x"), Err(TokenizeError::BadToken(_))));
    }
}
