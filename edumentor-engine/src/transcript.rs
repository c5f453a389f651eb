use edumentor_core::text::{MarkupStyle, format_markup};
use edumentor_core::types::TranscriptRole;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub content: String,
}

impl TranscriptEntry {
    /// Conversation turns get the markup pass; status lines are shown as-is.
    pub fn render(&self, style: &MarkupStyle) -> String {
        match self.role {
            TranscriptRole::Error | TranscriptRole::Success => self.content.clone(),
            _ => format_markup(&self.content, style),
        }
    }
}

/// Append-only conversation log for one client session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn push(&mut self, role: TranscriptRole, content: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role,
            content: content.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries appended after the first `len` ones.
    pub fn since(&self, len: usize) -> &[TranscriptEntry] {
        self.entries.get(len..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order_and_slices_new_entries() {
        let mut t = Transcript::default();
        t.push(TranscriptRole::User, "q1");
        t.push(TranscriptRole::Ai, "a1");
        let mark = t.len();
        t.push(TranscriptRole::Error, "oops");

        assert_eq!(t.len(), 3);
        assert_eq!(t.entries()[0].content, "q1");
        assert_eq!(t.since(mark).len(), 1);
        assert_eq!(t.since(mark)[0].role, TranscriptRole::Error);
        assert!(t.since(10).is_empty());
    }

    #[test]
    fn status_entries_skip_markup() {
        let e = TranscriptEntry {
            role: TranscriptRole::Error,
            content: "**raw**".into(),
        };
        assert_eq!(e.render(&MarkupStyle::HTML), "**raw**");

        let e = TranscriptEntry {
            role: TranscriptRole::Ai,
            content: "**bold**".into(),
        };
        assert_eq!(e.render(&MarkupStyle::HTML), "<strong>bold</strong>");
    }
}
