//! Link rewriting for exported documents.
//!
//! The exporter writes cross references as `[Title](Title%20<token>.md)`,
//! sometimes with the title doubled or wrapped in emphasis. The rewriter
//! rebuilds every internal target from its display text so it resolves
//! against the cleaned tree.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::hash::LINK_TAIL_RE;
use crate::normalize::normalize_name;

/// Folder the rewritten targets are assumed to live under.
pub const DEFAULT_PREFIX: &str = "Cheat Sheets";

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // 1: display text, 2: target. Display text stops at `[` and line breaks
    // too, so a stray `[` earlier in the line never absorbs the next link.
    Regex::new(r"\[([^\[\]\n]+)\]\(([^)\n]+)\)").unwrap()
});

/// A literal substring replacement that undoes a duplicated-title artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseRule {
    pub pattern: String,
    pub replacement: String,
}

impl CollapseRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), replacement: replacement.into() }
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.pattern.is_empty() || !text.contains(&self.pattern) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.replace(&self.pattern, &self.replacement))
        }
    }
}

/// Rules for the title doublings seen in real exports. More specific rules
/// come first.
pub fn builtin_collapse_rules() -> Vec<CollapseRule> {
    vec![
        CollapseRule::new(
            " Injection Cheat Sheet Injection Cheat Sheet",
            " Injection Cheat Sheet",
        ),
        CollapseRule::new(" Cheat Sheet Cheat Sheet", " Cheat Sheet"),
    ]
}

/// A `[text](target)` occurrence found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub display_text: String,
    /// Target as written in the source.
    pub target_path: String,
    /// New target, or `None` when the link is left untouched.
    pub rewritten_path: Option<String>,
    /// Byte offset of the opening `[`.
    pub start: usize,
    /// Byte offset just past the closing `)`.
    pub end: usize,
}

impl LinkReference {
    /// Replacement text for the whole link span.
    pub fn replacement(&self) -> Option<String> {
        self.rewritten_path
            .as_ref()
            .map(|target| format!("[{}]({})", self.display_text, target))
    }
}

#[derive(Debug, Clone)]
pub struct LinkRewriter {
    prefix: String,
    collapse_rules: Vec<CollapseRule>,
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl LinkRewriter {
    /// Rewriter with the given target folder and the built-in collapse rules.
    /// An empty prefix emits bare `<name>.md` targets.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), collapse_rules: builtin_collapse_rules() }
    }

    /// Append extra collapse rules after the existing ones.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = CollapseRule>) -> Self {
        self.collapse_rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[CollapseRule] {
        &self.collapse_rules
    }

    /// Compute the cleaned target for a link with the given display text.
    pub fn clean_target(&self, display_text: &str) -> Option<String> {
        let seed = display_text.replace("**", "");
        if seed.trim().is_empty() {
            return None;
        }

        let mut seed = self
            .collapse_rules
            .iter()
            .fold(seed, |acc, rule| rule.apply(&acc).into_owned());

        // Tails go before name normalization, which would otherwise read
        // `.md)` as an extension and keep it.
        seed = LINK_TAIL_RE.replace(&seed, "").into_owned();
        if let Some(stripped) = seed.strip_suffix(".md).md)") {
            seed = stripped.to_string();
        }
        seed = normalize_name(&seed).into_owned();

        let path = encode_path(&seed);
        if self.prefix.is_empty() {
            Some(format!("{path}.md"))
        } else {
            Some(format!("{}/{path}.md", encode_path(&self.prefix)))
        }
    }

    /// Parse every link in `content`, in document order.
    pub fn find_links(&self, content: &str) -> Vec<LinkReference> {
        LINK_RE
            .captures_iter(content)
            .map(|cap| {
                let whole = cap.get(0).unwrap();
                let display_text = cap[1].to_string();
                let target_path = cap[2].to_string();

                let rewritten_path = if is_embed(content, whole.start())
                    || is_external(&target_path)
                {
                    None
                } else {
                    self.clean_target(&display_text)
                };

                LinkReference {
                    display_text,
                    target_path,
                    rewritten_path,
                    start: whole.start(),
                    end: whole.end(),
                }
            })
            .collect()
    }

    /// Rewrite every internal link in `content` and run the document-wide
    /// cleanup passes. Text outside links is passed through.
    ///
    /// Emphasis markers are dropped before links are matched: removing them
    /// afterwards could join `[x]**(y)` into a link only a second run sees.
    pub fn rewrite(&self, content: &str) -> String {
        let content: &str = &strip_emphasis(content);
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for link in self.find_links(content) {
            if let Some(replacement) = link.replacement() {
                out.push_str(&content[last..link.start]);
                out.push_str(&replacement);
                last = link.end;
            }
        }
        out.push_str(&content[last..]);

        collapse_doubled_extension(out)
    }
}

/// Rewrite links with the default prefix and collapse rules.
pub fn rewrite_links(content: &str) -> String {
    LinkRewriter::default().rewrite(content)
}

fn strip_emphasis(text: &str) -> Cow<'_, str> {
    if text.contains("**") {
        Cow::Owned(text.replace("**", ""))
    } else {
        Cow::Borrowed(text)
    }
}

fn collapse_doubled_extension(mut text: String) -> String {
    while text.contains(".md.md)") {
        text = text.replace(".md.md)", ".md)");
    }
    text
}

fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            _ => out.push(c),
        }
    }
    out
}

fn is_embed(content: &str, start: usize) -> bool {
    content[..start].ends_with('!')
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with('#')
}
