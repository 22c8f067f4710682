//! Editor Adapters - EditorPort 实现

mod html_document;

pub use html_document::HtmlDocumentEditor;
