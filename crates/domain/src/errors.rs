use thiserror::Error;

/// ドメインエラー（入力値や識別子の検証失敗）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: title")]
    MissingTitle,

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Unrecognized fields: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    #[error("Field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_listed_in_message() {
        let err = DomainError::UnknownFields(vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "Unrecognized fields: foo, bar");
    }

    #[test]
    fn invalid_field_names_field_and_expectation() {
        let err = DomainError::InvalidField {
            field: "completed",
            expected: "a boolean",
        };
        assert_eq!(err.to_string(), "Field `completed` must be a boolean");
    }
}
