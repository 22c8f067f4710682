//! 正文统计
//!
//! 将序列化的富文本文档（HTML）渲染为纯文本，并计算字数/字符数

use serde::Serialize;

/// 块级元素之间的分隔符
const BLOCK_SEPARATOR: &str = "\n\n";

/// 块级标签：进入或离开时在文本之间插入分隔符
#[inline]
fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "li" | "ul" | "ol" | "pre" | "div" | "hr"
    )
}

/// 正文派生计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// 空白分隔的词数
    pub words: usize,
    /// 纯文本字符数
    pub chars: usize,
}

impl TextStats {
    /// 基于纯文本计算
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }

    /// 基于 HTML 文档计算
    pub fn from_document(html: &str) -> Self {
        Self::from_plain_text(&render_plain_text(html))
    }
}

/// 将 HTML 文档渲染为纯文本
///
/// 块级元素之间以空行分隔，`<br>` 渲染为换行，常见实体会被解码。
/// 不含标签的输入按原样返回（实体仍会解码）。
pub fn render_plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_separator = false;
    let mut chars = html.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                let mut tag = String::new();
                for c in chars.by_ref() {
                    if c == '>' {
                        break;
                    }
                    tag.push(c);
                }
                let name = tag_name(&tag);
                if name == "br" {
                    out.push('\n');
                } else if is_block_tag(&name) {
                    pending_separator = true;
                }
            }
            '&' => {
                let mut entity = String::new();
                let mut terminated = false;
                while let Some(&c) = chars.peek() {
                    if c == ';' {
                        chars.next();
                        terminated = true;
                        break;
                    }
                    if (!c.is_ascii_alphanumeric() && c != '#') || entity.len() > 8 {
                        break;
                    }
                    entity.push(c);
                    chars.next();
                }
                let decoded = if terminated { decode_entity(&entity) } else { None };
                push_text(&mut out, &mut pending_separator, |buf| match decoded {
                    Some(c) => buf.push(c),
                    None => {
                        buf.push('&');
                        buf.push_str(&entity);
                        if terminated {
                            buf.push(';');
                        }
                    }
                });
            }
            c => push_text(&mut out, &mut pending_separator, |buf| buf.push(c)),
        }
    }

    out
}

/// 写入文本前按需补充块分隔符
fn push_text(out: &mut String, pending_separator: &mut bool, write: impl FnOnce(&mut String)) {
    if *pending_separator && !out.is_empty() && !out.ends_with('\n') {
        out.push_str(BLOCK_SEPARATOR);
    }
    *pending_separator = false;
    write(out);
}

/// 提取标签名（小写，去掉 `/` 和属性）
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    }
}
