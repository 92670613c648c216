//! 作成・更新リクエストの JSON ボディ検証
//!
//! 値だけでなくキーの有無で規則が変わるため、生の `serde_json::Value` を調べます。

use serde_json::{Map, Value};

use crate::{parse_timestamp, DomainError, NewTodo, Timestamp, TodoChanges};

/// 作成時にクライアントが設定できるキー
pub const WRITABLE_FIELDS: [&str; 4] = ["title", "description", "completed", "deadline_at"];

/// ストア管理のキー（作成時は受け付けて無視）
pub const READ_ONLY_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

impl NewTodo {
    /// 作成ボディを検証します。
    ///
    /// タイトル、未知のキー、フィールド型の順に確認します。
    pub fn from_json(body: &Value) -> Result<Self, DomainError> {
        let object = body.as_object().ok_or(DomainError::NotAnObject)?;
        let title = required_title(object)?;

        let mut unknown: Vec<String> = object
            .keys()
            .filter(|key| !accepted_on_create(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(DomainError::UnknownFields(unknown));
        }

        Ok(Self {
            title,
            description: optional_string(object, "description")?.flatten(),
            completed: optional_bool(object, "completed")?.unwrap_or(false),
            deadline_at: optional_timestamp(object, "deadline_at")?.flatten(),
        })
    }
}

impl TodoChanges {
    /// 更新ボディを検証します。書き込み可能でないキーは無視します。
    pub fn from_json(body: &Value) -> Result<Self, DomainError> {
        let object = body.as_object().ok_or(DomainError::NotAnObject)?;
        let title = required_title(object)?;

        let completed = match object.get("completed") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => {
                return Err(DomainError::InvalidField {
                    field: "completed",
                    expected: "a boolean",
                })
            }
        };

        Ok(Self {
            title,
            description: optional_string(object, "description")?,
            completed,
            deadline_at: optional_timestamp(object, "deadline_at")?,
        })
    }
}

fn accepted_on_create(key: &str) -> bool {
    WRITABLE_FIELDS
        .iter()
        .chain(READ_ONLY_FIELDS.iter())
        .any(|field| *field == key)
}

fn required_title(object: &Map<String, Value>) -> Result<String, DomainError> {
    match object.get("title") {
        None | Some(Value::Null) => Err(DomainError::MissingTitle),
        Some(Value::String(title)) if title.is_empty() => Err(DomainError::EmptyTitle),
        Some(Value::String(title)) => Ok(title.clone()),
        Some(_) => Err(DomainError::InvalidField {
            field: "title",
            expected: "a string",
        }),
    }
}

// 外側の Option はキーの有無、内側は明示的な null を表す

fn optional_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Option<String>>, DomainError> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(DomainError::InvalidField {
            field,
            expected: "a string or null",
        }),
    }
}

fn optional_bool(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<bool>, DomainError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(DomainError::InvalidField {
            field,
            expected: "a boolean",
        }),
    }
}

fn optional_timestamp(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Option<Timestamp>>, DomainError> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => parse_timestamp(s).map(|ts| Some(Some(ts))),
        Some(_) => Err(DomainError::InvalidField {
            field,
            expected: "an ISO-8601 timestamp string or null",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_with_only_title_uses_defaults() {
        let new_todo = NewTodo::from_json(&json!({"title": "Buy milk"})).unwrap();
        assert_eq!(new_todo, NewTodo::titled("Buy milk"));
    }

    #[test]
    fn create_reads_every_writable_field() {
        let new_todo = NewTodo::from_json(&json!({
            "title": "Watch lecture",
            "description": "Week 1",
            "completed": true,
            "deadline_at": "2023-02-27T00:00:00",
        }))
        .unwrap();

        assert_eq!(new_todo.description.as_deref(), Some("Week 1"));
        assert!(new_todo.completed);
        assert_eq!(
            new_todo.deadline_at,
            Some(parse_timestamp("2023-02-27T00:00:00").unwrap())
        );
    }

    #[test]
    fn create_tolerates_read_only_fields() {
        let new_todo = NewTodo::from_json(&json!({
            "id": 99,
            "title": "Ignored extras",
            "created_at": "2023-02-20T00:00:00",
            "updated_at": "2023-02-20T00:00:00",
        }))
        .unwrap();
        assert_eq!(new_todo.title, "Ignored extras");
    }

    #[test]
    fn create_requires_title() {
        assert_eq!(
            NewTodo::from_json(&json!({"description": "no title"})),
            Err(DomainError::MissingTitle)
        );
        assert_eq!(
            NewTodo::from_json(&json!({"title": null})),
            Err(DomainError::MissingTitle)
        );
        assert_eq!(
            NewTodo::from_json(&json!({"title": ""})),
            Err(DomainError::EmptyTitle)
        );
    }

    #[test]
    fn create_checks_title_before_unknown_keys() {
        assert_eq!(
            NewTodo::from_json(&json!({"foo": 1})),
            Err(DomainError::MissingTitle)
        );
    }

    #[test]
    fn create_rejects_unknown_keys() {
        assert_eq!(
            NewTodo::from_json(&json!({"title": "x", "foo": 1, "bar": 2})),
            Err(DomainError::UnknownFields(vec!["bar".into(), "foo".into()]))
        );
    }

    #[test]
    fn create_rejects_wrong_types() {
        assert!(NewTodo::from_json(&json!({"title": 5})).is_err());
        assert!(NewTodo::from_json(&json!({"title": "x", "completed": "yes"})).is_err());
        assert!(NewTodo::from_json(&json!({"title": "x", "description": 3})).is_err());
        assert!(NewTodo::from_json(&json!({"title": "x", "deadline_at": "soon"})).is_err());
        assert_eq!(
            NewTodo::from_json(&json!(["title"])),
            Err(DomainError::NotAnObject)
        );
    }

    #[test]
    fn create_treats_null_completed_as_default() {
        let new_todo = NewTodo::from_json(&json!({"title": "x", "completed": null})).unwrap();
        assert!(!new_todo.completed);
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let changes = TodoChanges::from_json(&json!({
            "title": "t",
            "description": null,
        }))
        .unwrap();

        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.deadline_at, None);
        assert_eq!(changes.completed, None);
    }

    #[test]
    fn update_requires_title() {
        assert_eq!(
            TodoChanges::from_json(&json!({"description": "only"})),
            Err(DomainError::MissingTitle)
        );
    }

    #[test]
    fn update_rejects_null_completed() {
        assert!(TodoChanges::from_json(&json!({"title": "t", "completed": null})).is_err());
    }

    #[test]
    fn update_ignores_unknown_keys() {
        let changes = TodoChanges::from_json(&json!({"title": "t", "colour": "red"})).unwrap();
        assert_eq!(changes.title, "t");
    }
}
