use edumentor_core::text::MarkupStyle;
use edumentor_core::types::TranscriptRole;
use edumentor_engine::session::ClientSession;
use edumentor_engine::transcript::TranscriptEntry;

fn label(role: TranscriptRole) -> &'static str {
    match role {
        TranscriptRole::User => "you",
        TranscriptRole::Ai => "tutor",
        TranscriptRole::ExtractedText => "image",
        TranscriptRole::TranscribedText => "heard",
        TranscriptRole::Error => "error",
        TranscriptRole::Success => "ok",
    }
}

pub fn format_entry(entry: &TranscriptEntry) -> String {
    format!("[{}] {}", label(entry.role), entry.render(&MarkupStyle::TERMINAL))
}

/// Prints the entries appended after `mark`; returns the new mark.
pub fn print_since(session: &ClientSession, mark: usize) -> usize {
    for entry in session.transcript().since(mark) {
        if entry.role == TranscriptRole::Error {
            eprintln!("{}", format_entry(entry));
        } else {
            println!("{}", format_entry(entry));
        }
    }
    session.transcript().len()
}

pub fn print_profile(session: &ClientSession) {
    match session.profile_summary() {
        Some(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        None => println!("Not registered. Run `edumentor register --class <class>` first."),
    }
    println!("Session: {}", session.token());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_labelled_and_styled() {
        let entry = TranscriptEntry {
            role: TranscriptRole::Ai,
            content: "**Yes**".into(),
        };
        assert_eq!(format_entry(&entry), "[tutor] \x1b[1mYes\x1b[22m");

        let entry = TranscriptEntry {
            role: TranscriptRole::Error,
            content: "**raw**".into(),
        };
        assert_eq!(format_entry(&entry), "[error] **raw**");
    }
}
