use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, Timestamp};

/// ストアが採番する Todo の識別子（常に正）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidTodoId(value.to_string()))
        }
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl FromStr for TodoId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only plain decimal digits name a todo; "+1" or "01x" do not.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidTodoId(s.to_string()));
        }
        let value = s
            .parse::<i64>()
            .map_err(|_| DomainError::InvalidTodoId(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 永続化済みの Todo
///
/// 常に 7 フィールドすべてをシリアライズします（未設定は `null`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// 作成前の Todo（クライアントが指定するフィールド）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline_at: Option<Timestamp>,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
            deadline_at: None,
        }
    }

    /// ストアが決めた id と時刻でレコードを確定させます。
    pub fn into_todo(self, id: TodoId, created_at: Timestamp) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            deadline_at: self.deadline_at,
            created_at,
            updated_at: created_at,
        }
    }
}

/// 更新で要求された変更
///
/// `title` は常に置き換えます。他のフィールドはキーが無ければ `None`、
/// あれば `Some(..)` なので、明示的な `null` で `description` や
/// `deadline_at` を消去できます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: String,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub deadline_at: Option<Option<Timestamp>>,
}

impl TodoChanges {
    pub fn apply_to(self, todo: &mut Todo) {
        todo.title = self.title;
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(deadline_at) = self.deadline_at {
            todo.deadline_at = deadline_at;
        }
    }
}
