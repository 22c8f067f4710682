//! HTML Document Editor
//!
//! 无界面的富文本编辑器：文档以顶层块序列表示，
//! 格式命令作用于最后一个块（光标所在的块），
//! 带有限长度的撤销/重做历史。

use crate::application::ports::{EditorPort, FormatCommand};
use crate::domain::chapter::EMPTY_DOCUMENT;
use crate::domain::render_plain_text;

/// 撤销历史上限
const MAX_HISTORY: usize = 100;

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "ul", "ol", "pre", "div", "hr",
];

/// 顶层块
#[derive(Debug, Clone, PartialEq)]
struct Block {
    tag: String,
    inner: String,
}

impl Block {
    fn paragraph(inner: impl Into<String>) -> Self {
        Self {
            tag: "p".to_string(),
            inner: inner.into(),
        }
    }

    fn is_void(&self) -> bool {
        self.tag == "hr"
    }

    fn is_list(&self) -> bool {
        self.tag == "ul" || self.tag == "ol"
    }

    /// 列表项内容；非列表块视为单项
    fn items(&self) -> Vec<String> {
        if !self.is_list() {
            return vec![self.inner.clone()];
        }
        let mut items = Vec::new();
        let mut rest = self.inner.as_str();
        while let Some(start) = rest.find("<li>") {
            let after = &rest[start + 4..];
            match after.find("</li>") {
                Some(end) => {
                    items.push(after[..end].to_string());
                    rest = &after[end + 5..];
                }
                None => {
                    items.push(after.to_string());
                    rest = "";
                }
            }
        }
        if items.is_empty() {
            items.push(self.inner.clone());
        }
        items
    }

    fn render(&self, out: &mut String) {
        if self.is_void() {
            out.push_str("<hr>");
            return;
        }
        out.push('<');
        out.push_str(&self.tag);
        out.push('>');
        out.push_str(&self.inner);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// 无界面 HTML 编辑器
#[derive(Debug, Clone)]
pub struct HtmlDocumentEditor {
    blocks: Vec<Block>,
    undo: Vec<Vec<Block>>,
    redo: Vec<Vec<Block>>,
}

impl HtmlDocumentEditor {
    pub fn new() -> Self {
        Self {
            blocks: parse_blocks(EMPTY_DOCUMENT),
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// 记录一次修改，新修改会清空重做栈
    fn commit(&mut self, blocks: Vec<Block>) -> bool {
        if blocks == self.blocks {
            return false;
        }
        let previous = std::mem::replace(&mut self.blocks, blocks);
        self.undo.push(previous);
        if self.undo.len() > MAX_HISTORY {
            self.undo.remove(0);
        }
        self.redo.clear();
        true
    }

    fn toggle_block(&self, tag: &str) -> Vec<Block> {
        let mut blocks = self.blocks.clone();
        if let Some(last) = blocks.last_mut() {
            let items = last.items();
            if last.tag == tag {
                *last = Block::paragraph(items.join("<br>"));
            } else if tag == "ul" || tag == "ol" {
                let inner = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", item))
                    .collect::<String>();
                *last = Block {
                    tag: tag.to_string(),
                    inner,
                };
            } else {
                *last = Block {
                    tag: tag.to_string(),
                    inner: items.join("<br>"),
                };
            }
        }
        blocks
    }

    fn toggle_mark(&self, mark: &str) -> Vec<Block> {
        let mut blocks = self.blocks.clone();
        if let Some(last) = blocks.last_mut() {
            if last.is_void() || last.inner.is_empty() {
                return blocks;
            }
            let open = format!("<{}>", mark);
            let close = format!("</{}>", mark);
            let toggle = |item: &str| -> String {
                match item
                    .strip_prefix(open.as_str())
                    .and_then(|s| s.strip_suffix(close.as_str()))
                {
                    Some(unwrapped) => unwrapped.to_string(),
                    None => format!("{}{}{}", open, item, close),
                }
            };
            if last.is_list() {
                last.inner = last
                    .items()
                    .iter()
                    .map(|item| format!("<li>{}</li>", toggle(item)))
                    .collect();
            } else {
                last.inner = toggle(&last.inner);
            }
        }
        blocks
    }
}

impl Default for HtmlDocumentEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPort for HtmlDocumentEditor {
    fn set_content(&mut self, html: &str) {
        self.blocks = parse_blocks(html);
        self.undo.clear();
        self.redo.clear();
    }

    fn replace_content(&mut self, html: &str) {
        self.commit(parse_blocks(html));
    }

    fn html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.render(&mut out);
        }
        out
    }

    fn text(&self) -> String {
        render_plain_text(&self.html())
    }

    fn apply(&mut self, command: FormatCommand) -> bool {
        match command {
            FormatCommand::Undo => match self.undo.pop() {
                Some(previous) => {
                    let current = std::mem::replace(&mut self.blocks, previous);
                    self.redo.push(current);
                    true
                }
                None => false,
            },
            FormatCommand::Redo => match self.redo.pop() {
                Some(next) => {
                    let current = std::mem::replace(&mut self.blocks, next);
                    self.undo.push(current);
                    true
                }
                None => false,
            },
            FormatCommand::Bold => {
                let blocks = self.toggle_mark("strong");
                self.commit(blocks)
            }
            FormatCommand::Italic => {
                let blocks = self.toggle_mark("em");
                self.commit(blocks)
            }
            FormatCommand::Heading1 => {
                let blocks = self.toggle_block("h1");
                self.commit(blocks)
            }
            FormatCommand::Heading2 => {
                let blocks = self.toggle_block("h2");
                self.commit(blocks)
            }
            FormatCommand::Blockquote => {
                let blocks = self.toggle_block("blockquote");
                self.commit(blocks)
            }
            FormatCommand::BulletList => {
                let blocks = self.toggle_block("ul");
                self.commit(blocks)
            }
            FormatCommand::OrderedList => {
                let blocks = self.toggle_block("ol");
                self.commit(blocks)
            }
        }
    }
}

/// 解析顶层块
///
/// 块外的零散内容归入段落；属性被丢弃；空文档为一个空段落
fn parse_blocks(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rest = html.trim();

    while !rest.is_empty() {
        match open_block_tag(rest) {
            Some((tag, open_len)) => {
                let after = &rest[open_len..];
                if tag == "hr" {
                    blocks.push(Block {
                        tag,
                        inner: String::new(),
                    });
                    rest = after.trim_start();
                    continue;
                }
                let (inner, consumed) = match find_close(after, &tag) {
                    Some((end, close_len)) => (&after[..end], end + close_len),
                    None => (after, after.len()),
                };
                blocks.push(Block {
                    tag,
                    inner: inner.to_string(),
                });
                rest = after[consumed..].trim_start();
            }
            None => {
                let end = next_block_start(rest).unwrap_or(rest.len());
                let loose = rest[..end].trim();
                if !loose.is_empty() {
                    blocks.push(Block::paragraph(loose));
                }
                rest = rest[end..].trim_start();
            }
        }
    }

    if blocks.is_empty() {
        blocks.push(Block::paragraph(""));
    }
    blocks
}

/// 若 `s` 以块级开始标签开头，返回 (小写标签名, 开始标签长度)
fn open_block_tag(s: &str) -> Option<(String, usize)> {
    let body = s.strip_prefix('<')?;
    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = body[..name_len].to_ascii_lowercase();
    if !BLOCK_TAGS.contains(&name.as_str()) {
        return None;
    }
    let close = s.find('>')?;
    Some((name, close + 1))
}

/// 查找与已打开标签匹配的结束标签，返回 (内容长度, 结束标签长度)
fn find_close(s: &str, tag: &str) -> Option<(usize, usize)> {
    let lower = s.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut depth = 0usize;
    let mut pos = 0usize;

    while pos < lower.len() {
        let rest = &lower[pos..];
        let next_open = rest.find(&open).filter(|&i| {
            rest[i + open.len()..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_whitespace())
        });
        let next_close = rest.find(&close)?;
        match next_open {
            Some(o) if o < next_close => {
                depth += 1;
                pos += o + open.len();
            }
            _ => {
                if depth == 0 {
                    return Some((pos + next_close, close.len()));
                }
                depth -= 1;
                pos += next_close + close.len();
            }
        }
    }
    None
}

fn next_block_start(s: &str) -> Option<usize> {
    s.match_indices('<')
        .map(|(i, _)| i)
        .find(|&i| i > 0 && open_block_tag(&s[i..]).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(html: &str) -> HtmlDocumentEditor {
        let mut editor = HtmlDocumentEditor::new();
        editor.set_content(html);
        editor
    }

    #[test]
    fn test_empty_document() {
        let editor = HtmlDocumentEditor::new();
        assert_eq!(editor.html(), "<p></p>");
        assert_eq!(editor.text(), "");

        let editor = self::editor("");
        assert_eq!(editor.html(), "<p></p>");
    }

    #[test]
    fn test_loose_text_becomes_paragraph() {
        let editor = editor("Hello world");
        assert_eq!(editor.html(), "<p>Hello world</p>");
        assert_eq!(editor.text(), "Hello world");
    }

    #[test]
    fn test_nested_blocks_are_kept_intact() {
        let editor = editor("<div><div>a</div>b</div><p>c</p>");
        assert_eq!(editor.html(), "<div><div>a</div>b</div><p>c</p>");
    }

    #[test]
    fn test_heading_toggle_is_reversible() {
        let mut editor = editor("<p>One</p><p>Two</p>");
        assert!(editor.apply(FormatCommand::Heading1));
        assert_eq!(editor.html(), "<p>One</p><h1>Two</h1>");
        assert!(editor.apply(FormatCommand::Heading1));
        assert_eq!(editor.html(), "<p>One</p><p>Two</p>");
    }

    #[test]
    fn test_list_toggle() {
        let mut editor = editor("<p>item</p>");
        assert!(editor.apply(FormatCommand::BulletList));
        assert_eq!(editor.html(), "<ul><li>item</li></ul>");
        assert!(editor.apply(FormatCommand::OrderedList));
        assert_eq!(editor.html(), "<ol><li>item</li></ol>");
        assert!(editor.apply(FormatCommand::OrderedList));
        assert_eq!(editor.html(), "<p>item</p>");
    }

    #[test]
    fn test_bold_twice_restores() {
        let mut editor = editor("<p>word</p>");
        assert!(editor.apply(FormatCommand::Bold));
        assert_eq!(editor.html(), "<p><strong>word</strong></p>");
        assert!(editor.apply(FormatCommand::Bold));
        assert_eq!(editor.html(), "<p>word</p>");
    }

    #[test]
    fn test_mark_on_empty_block_is_noop() {
        let mut editor = HtmlDocumentEditor::new();
        assert!(!editor.apply(FormatCommand::Italic));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = editor("<p>a</p>");
        editor.replace_content("<p>ab</p>");
        editor.apply(FormatCommand::Blockquote);
        assert_eq!(editor.html(), "<blockquote>ab</blockquote>");

        assert!(editor.apply(FormatCommand::Undo));
        assert_eq!(editor.html(), "<p>ab</p>");
        assert!(editor.apply(FormatCommand::Undo));
        assert_eq!(editor.html(), "<p>a</p>");
        assert!(!editor.apply(FormatCommand::Undo));

        assert!(editor.apply(FormatCommand::Redo));
        assert_eq!(editor.html(), "<p>ab</p>");

        // 新修改清空重做栈
        editor.replace_content("<p>abc</p>");
        assert!(!editor.apply(FormatCommand::Redo));
    }

    #[test]
    fn test_set_content_resets_history() {
        let mut editor = editor("<p>a</p>");
        editor.replace_content("<p>b</p>");
        editor.set_content("<p>c</p>");
        assert!(!editor.can_undo());
    }
}
