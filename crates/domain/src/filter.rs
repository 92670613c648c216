use chrono::TimeDelta;

use crate::{Timestamp, Todo};

/// Todo 一覧の絞り込み条件
///
/// どちらも任意で、AND で組み合わせます。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// 完了済みのみ
    pub completed_only: bool,
    /// 現在から指定日数以内に期限が来るもののみ（0 で無効）
    pub window_days: i64,
}

impl ListFilter {
    /// クエリ文字列の生の値から条件を組み立てます。
    ///
    /// `completed` は値の中身によらず空でなければ真です。
    /// 整数でない `window` は 0 とみなします。
    pub fn from_query(completed: Option<&str>, window: Option<&str>) -> Self {
        Self {
            completed_only: completed.is_some_and(|value| !value.is_empty()),
            window_days: window
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(0),
        }
    }

    /// 期間フィルタを通過する最も遅い期限
    pub fn cutoff(&self, now: Timestamp) -> Option<Timestamp> {
        if self.window_days == 0 {
            return None;
        }
        let shifted =
            TimeDelta::try_days(self.window_days).and_then(|delta| now.checked_add_signed(delta));
        Some(shifted.unwrap_or(if self.window_days > 0 {
            Timestamp::MAX
        } else {
            Timestamp::MIN
        }))
    }

    pub fn apply(&self, todos: Vec<Todo>, now: Timestamp) -> Vec<Todo> {
        let mut todos = todos;
        if self.completed_only {
            todos.retain(|todo| todo.completed);
        }
        if let Some(cutoff) = self.cutoff(now) {
            // A todo without a deadline is never "due within" a window.
            todos.retain(|todo| todo.deadline_at.is_some_and(|deadline| deadline <= cutoff));
        }
        todos
    }
}
