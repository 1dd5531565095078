use crate::models::Document;

/// Single-pass cleanup: each pair of spaces collapses to one space, each
/// pair of newlines to one newline, then the whole text is trimmed. A run
/// of four spaces therefore comes out as two, not one; this is a single
/// left-to-right pass, not a full whitespace normalization.
pub fn clean_text(text: &str) -> String {
    text.replace("  ", " ").replace("\n\n", "\n").trim().to_string()
}

pub fn clean_documents(documents: &[Document]) -> Vec<Document> {
    documents
        .iter()
        .map(|document| Document {
            text: clean_text(&document.text),
            metadata: document.metadata.clone(),
        })
        .collect()
}
