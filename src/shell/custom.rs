//! Commands declared by scenario content
//!
//! Either a text template (`{arg1}`, `{args}`, `{cwd}`, `{user}`) or a table
//! keyed by the joined argument string.

use super::error::ShellError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CustomCommand {
    /// Canned output with placeholder substitution
    Text {
        #[serde(alias = "text")]
        template: String,
    },
    /// Output chosen by the arguments given
    Lookup {
        usage: String,
        #[serde(default)]
        entries: BTreeMap<String, String>,
    },
}

/// Values available to templates
pub struct TemplateContext<'a> {
    pub args: &'a [String],
    pub cwd: &'a str,
    pub user: &'a str,
}

/// Substitute placeholders. Missing `{argN}` become empty strings.
pub fn render_template(template: &str, ctx: &TemplateContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match placeholder(key, ctx) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn placeholder(key: &str, ctx: &TemplateContext<'_>) -> Option<String> {
    match key {
        "args" => Some(ctx.args.join(" ")),
        "cwd" => Some(ctx.cwd.to_string()),
        "user" => Some(ctx.user.to_string()),
        _ => {
            let n: usize = key.strip_prefix("arg")?.parse().ok()?;
            Some(n.checked_sub(1).and_then(|i| ctx.args.get(i)).cloned().unwrap_or_default())
        }
    }
}

impl CustomCommand {
    pub fn run(&self, name: &str, ctx: &TemplateContext<'_>) -> Result<String, ShellError> {
        match self {
            CustomCommand::Text { template } => Ok(render_template(template, ctx)),
            CustomCommand::Lookup { usage, entries } => {
                if ctx.args.is_empty() {
                    return Ok(format!("usage: {}", usage));
                }
                entries
                    .get(&ctx.args.join(" "))
                    .map(|text| render_template(text, ctx))
                    .ok_or_else(|| ShellError::MalformedCustomCommandArgs {
                        cmd: name.to_string(),
                        usage: usage.clone(),
                    })
            }
        }
    }
}
