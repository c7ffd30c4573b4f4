//! A small Markdown-subset renderer.
//!
//! Supports headers, fenced code blocks, blockquotes, horizontal rules,
//! flat ordered/unordered lists and one-line paragraphs, plus inline
//! bold/italic/strikethrough/code/links/images. Anything else degrades to a
//! paragraph. Rendering never fails.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(\w+)?").expect("fence pattern"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("header pattern"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-{3,}|\*{3,})$").expect("rule pattern"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.+)$").expect("list pattern"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));

// Order matters: each rule rewrites the output of the one before it.
static INLINE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\*\*\*([^*]+)\*\*\*", "<strong><em>${1}</em></strong>"),
        (r"\*\*([^*]+)\*\*", "<strong>${1}</strong>"),
        (r"\*([^*\n]+)\*", "<em>${1}</em>"),
        (r"~~([^~]+)~~", "<del>${1}</del>"),
        (r"`([^`\n]+)`", "<code>${1}</code>"),
        (r"\[([^\]]+)\]\(([^)]+)\)", r#"<a href="${2}">${1}</a>"#),
        (r"!\[([^\]]*)\]\(([^)]+)\)", r#"<img src="${2}" alt="${1}">"#),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("inline pattern"), replacement))
    .collect()
});

const FENCE: &str = "```";

/// A top-level structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A blank separator line.
    Blank,
    Header { level: usize, text: String },
    CodeFence { language: String, lines: Vec<String> },
    Blockquote { text: String },
    HorizontalRule,
    List { ordered: bool, items: Vec<String>, indent: usize },
    Paragraph { text: String },
}

/// Render a Markdown-subset document to an HTML fragment.
pub fn render(text: &str) -> String {
    render_blocks(&parse_blocks(text))
}

/// Classify the lines of `text` into blocks with a single forward scan.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    if text.trim().is_empty() {
        return blocks;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let stripped = line.trim();

        if stripped.is_empty() {
            blocks.push(Block::Blank);
            i += 1;
            continue;
        }

        if stripped.starts_with(FENCE) {
            let language = FENCE_OPEN
                .captures(stripped)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            i += 1; // Skip the opening fence
            let mut body = Vec::new();
            while i < lines.len() && !lines[i].trim().starts_with(FENCE) {
                body.push(lines[i].to_string());
                i += 1;
            }
            i += 1; // Skip the closing fence, if there is one

            blocks.push(Block::CodeFence { language, lines: body });
            continue;
        }

        if let Some(caps) = HEADER.captures(stripped) {
            blocks.push(Block::Header {
                level: caps[1].len(),
                text: caps[2].to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(rest) = stripped.strip_prefix('>') {
            let text = rest.strip_prefix(' ').unwrap_or(rest);
            blocks.push(Block::Blockquote { text: text.to_string() });
            i += 1;
            continue;
        }

        if HORIZONTAL_RULE.is_match(stripped) {
            blocks.push(Block::HorizontalRule);
            i += 1;
            continue;
        }

        if let Some(caps) = LIST_ITEM.captures(line) {
            let indent = caps[1].chars().count();
            let ordered = caps[2].ends_with('.');
            let mut items = vec![caps[3].to_string()];
            i += 1;

            // Blank lines don't end a run, anything at another indent does
            while i < lines.len() {
                let next = lines[i];
                if next.trim().is_empty() {
                    i += 1;
                    continue;
                }

                match LIST_ITEM.captures(next) {
                    Some(caps) if caps[1].chars().count() == indent => {
                        items.push(caps[3].to_string());
                        i += 1;
                    }
                    _ => break,
                }
            }

            blocks.push(Block::List { ordered, items, indent });
            continue;
        }

        blocks.push(Block::Paragraph { text: line.to_string() });
        i += 1;
    }

    blocks
}

/// Emit HTML for a sequence of blocks, one fragment per line.
pub fn render_blocks(blocks: &[Block]) -> String {
    let html = blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n");

    EXCESS_NEWLINES.replace_all(&html, "\n\n").into_owned()
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Blank => String::new(),
        Block::Header { level, text } => format!("<h{0}>{1}</h{0}>", level, text),
        Block::CodeFence { language, lines } => format!(
            "<div class=\"code-block\"><pre><code class=\"language-{}\">{}</code></pre></div>",
            language,
            lines.join("\n")
        ),
        // Quotes are emitted as-is, without the inline pass
        Block::Blockquote { text } => format!("<blockquote>{}</blockquote>", text),
        Block::HorizontalRule => "<hr>".to_string(),
        Block::List { ordered, items, .. } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let items_html: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", apply_inline(item)))
                .collect();
            format!("<{0}>{1}</{0}>", tag, items_html)
        }
        Block::Paragraph { text } => format!("<p>{}</p>", apply_inline(text)),
    }
}

/// Apply inline formatting rules to a run of text.
///
/// Rules are plain substitutions run in a fixed order (bold-italic, bold,
/// italic, strikethrough, code, link, image), each over the output of the
/// previous one. Literal markdown characters cannot be escaped.
pub fn apply_inline(text: &str) -> String {
    INLINE_RULES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}
