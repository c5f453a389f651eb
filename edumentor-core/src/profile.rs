use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub const DEFAULT_LANGUAGE: &str = "English";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Student context attached to every request.
///
/// `name` and `board` are optional; the empty string means "not given", which is
/// also how the backend receives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub board: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl StudentProfile {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            class: class.into(),
            board: String::new(),
            language: default_language(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = board.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = if language.trim().is_empty() {
            default_language()
        } else {
            language
        };
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.class.trim().is_empty() {
            return Err(ValidationError::MissingClass);
        }
        Ok(())
    }

    /// Lines shown in the profile panel.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Name: {}", or_placeholder(&self.name, "Not provided")),
            format!("Class: {}", self.class),
            format!("Board: {}", or_placeholder(&self.board, "Not specified")),
            format!("Language: {}", self.language),
        ]
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_class_fails_validation() {
        assert_eq!(
            StudentProfile::new("  ").validate(),
            Err(ValidationError::MissingClass)
        );
        assert!(StudentProfile::new("10").validate().is_ok());
    }

    #[test]
    fn summary_uses_placeholders_for_optional_fields() {
        let profile = StudentProfile::new("10").with_board("").with_language("English");
        assert_eq!(
            profile.summary_lines(),
            vec![
                "Name: Not provided",
                "Class: 10",
                "Board: Not specified",
                "Language: English",
            ]
        );
    }

    #[test]
    fn missing_language_defaults_to_english() {
        let profile: StudentProfile = serde_json::from_str(r#"{"class":"7"}"#).unwrap();
        assert_eq!(profile.language, DEFAULT_LANGUAGE);
        assert_eq!(profile.name, "");
        assert_eq!(StudentProfile::new("7").with_language(" ").language, "English");
    }
}
