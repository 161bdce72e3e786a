// Dashboard variable substitution
//
// The host owns dashboard variables; the adapter only asks for placeholders in
// the composed query to be rewritten. `TemplateSrv` is that seam, and
// `ScopedVarsTemplateSrv` is the implementation used when the backend runs on its own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value of one dashboard variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    Multi(Vec<String>),
}

impl VariableValue {
    fn render(&self, format: VariableFormat) -> String {
        match (self, format) {
            (VariableValue::Single(value), _) => value.clone(),
            (VariableValue::Multi(values), VariableFormat::Csv) => values.join(","),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for VariableValue {
    fn from(values: Vec<&str>) -> Self {
        VariableValue::Multi(values.into_iter().map(str::to_string).collect())
    }
}

pub type ScopedVars = HashMap<String, VariableValue>;

/// How multi-valued variables are flattened into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableFormat {
    Csv,
}

pub trait TemplateSrv: Send + Sync {
    fn replace(&self, text: &str, scoped_vars: &ScopedVars, format: VariableFormat) -> String;
}

/// Substitutes `$name`, `${name}`, `${name:format}` and `[[name]]` from the
/// request's scoped variables. Unknown names are left as written.
#[derive(Debug, Clone, Default)]
pub struct ScopedVarsTemplateSrv;

impl ScopedVarsTemplateSrv {
    pub fn new() -> Self {
        Self
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Placeholder found at the start of `rest`: (variable name, bytes consumed)
fn parse_placeholder(rest: &str) -> Option<(&str, usize)> {
    if let Some(body) = rest.strip_prefix("${") {
        let end = body.find('}')?;
        let inner = &body[..end];
        let name = inner.split(':').next().unwrap_or(inner);
        if name.is_empty() || !name.chars().all(is_name_char) {
            return None;
        }
        return Some((name, end + 3));
    }
    if let Some(body) = rest.strip_prefix("[[") {
        let end = body.find("]]")?;
        let inner = &body[..end];
        let name = inner.split(':').next().unwrap_or(inner);
        if name.is_empty() || !name.chars().all(is_name_char) {
            return None;
        }
        return Some((name, end + 4));
    }
    if let Some(body) = rest.strip_prefix('$') {
        let len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
        if len == 0 {
            return None;
        }
        return Some((&body[..len], len + 1));
    }
    None
}

impl TemplateSrv for ScopedVarsTemplateSrv {
    fn replace(&self, text: &str, scoped_vars: &ScopedVars, format: VariableFormat) -> String {
        let mut out = String::with_capacity(text.len());
        let mut idx = 0;

        while idx < text.len() {
            let rest = &text[idx..];
            if rest.starts_with('$') || rest.starts_with("[[") {
                if let Some((name, consumed)) = parse_placeholder(rest) {
                    if let Some(value) = scoped_vars.get(name) {
                        out.push_str(&value.render(format));
                        idx += consumed;
                        continue;
                    }
                }
            }
            let c = rest.chars().next().unwrap_or_default();
            out.push(c);
            idx += c.len_utf8();
        }

        out
    }
}
