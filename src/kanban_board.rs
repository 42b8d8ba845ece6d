use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    stats::Stats,
    task::{Status, Task, TaskDraft},
};

#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub tasks: Vec<Task>,
    pub selected_status: usize,
    pub selected_task: usize,
}

impl KanbanBoard {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<&Task> {
        self.add_task_at(draft, Utc::now())
    }

    pub fn add_task_at(&mut self, draft: TaskDraft, created_at: DateTime<Utc>) -> Result<&Task> {
        let title = validate_title(&draft.title)?;

        let mut stamp = created_at.timestamp_millis();
        while self.find(&stamp.to_string()).is_some() {
            stamp += 1;
        }

        let task = Task {
            id: stamp.to_string(),
            title,
            description: draft.description,
            status: Status::Todo,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at,
        };
        info!(id = %task.id, title = %task.title, priority = %task.priority, "task added");
        self.tasks.push(task);
        self.clamp_selection();
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Returns true when a task changed.
    pub fn update_task_status(&mut self, id: &str, status: Status) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "status change for unknown task ignored");
            return false;
        };
        if task.status == status {
            return false;
        }
        info!(id, from = %task.status, to = %status, "task moved");
        task.status = status;
        self.clamp_selection();
        true
    }

    /// Replaces the editable fields of a task, keeping its id, status and creation time.
    pub fn update_task(&mut self, id: &str, draft: TaskDraft) -> Result<bool> {
        let title = validate_title(&draft.title)?;
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.title = title;
        task.description = draft.description;
        task.priority = draft.priority;
        task.due_date = draft.due_date;
        info!(id, "task edited");
        Ok(true)
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            info!(id, "task deleted");
            self.clamp_selection();
        }
        removed
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Task> {
        self.find(id).ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    pub fn selected_column(&self) -> Status {
        Status::ALL[self.selected_status.min(Status::ALL.len() - 1)]
    }

    pub fn selected(&self) -> Option<&Task> {
        self.get_tasks_by_status(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    pub fn select_column(&mut self, direction: isize) {
        self.selected_status = (self.selected_status as isize + direction)
            .clamp(0, Status::ALL.len() as isize - 1) as usize;
        self.clamp_selection();
    }

    pub fn select_task(&mut self, direction: isize) {
        let count = self.get_tasks_by_status(self.selected_column()).len();
        if count == 0 {
            self.selected_task = 0;
            return;
        }
        self.selected_task =
            (self.selected_task as isize + direction).clamp(0, count as isize - 1) as usize;
    }

    /// Moves the highlighted task forward (`direction > 0`) or back one status.
    /// The selection follows the task into its new column.
    pub fn move_task(&mut self, direction: isize) -> bool {
        let Some(task) = self.selected() else {
            return false;
        };
        let target = if direction > 0 {
            task.status.next()
        } else {
            task.status.previous()
        };
        let Some(target) = target else {
            return false;
        };
        let id = task.id.clone();
        if !self.update_task_status(&id, target) {
            return false;
        }
        self.select_id(&id);
        true
    }

    pub fn select_id(&mut self, id: &str) {
        let Some(status) = self.find(id).map(|t| t.status) else {
            return;
        };
        self.selected_status = status.column();
        self.selected_task = self
            .get_tasks_by_status(status)
            .iter()
            .position(|t| t.id == id)
            .unwrap_or(0);
    }

    fn clamp_selection(&mut self) {
        let count = self.get_tasks_by_status(self.selected_column()).len();
        self.selected_task = self.selected_task.min(count.saturating_sub(1));
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::EmptyTitle);
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{NaiveDate, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn board_with(titles: &[&str]) -> KanbanBoard {
        let mut board = KanbanBoard::default();
        for (i, title) in titles.iter().enumerate() {
            board
                .add_task_at(TaskDraft::new(*title), at(1_000 + i as i64))
                .unwrap();
        }
        board
    }

    #[test]
    fn add_task_uses_timestamp_id_and_todo_status() {
        let mut board = KanbanBoard::default();
        let draft = TaskDraft {
            title: "  Write tests ".into(),
            description: "all of them".into(),
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        };
        let task = board.add_task_at(draft, at(1_700_000_000_123)).unwrap();
        assert_eq!(task.id, "1700000000123");
        assert_eq!(task.title, "Write tests");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.created_at, at(1_700_000_000_123));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut board = KanbanBoard::default();
        assert!(matches!(
            board.add_task(TaskDraft::new("   ")),
            Err(Error::EmptyTitle)
        ));
        assert!(board.tasks.is_empty());
    }

    #[test]
    fn colliding_timestamps_get_unique_ids() {
        let mut board = KanbanBoard::default();
        board.add_task_at(TaskDraft::new("a"), at(5)).unwrap();
        board.add_task_at(TaskDraft::new("b"), at(5)).unwrap();
        let ids: Vec<_> = board.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["5", "6"]);
    }

    #[test]
    fn status_change_only_touches_matching_task() {
        let mut board = board_with(&["a", "b", "c"]);
        assert!(board.update_task_status("1001", Status::Done));
        assert_eq!(board.tasks[1].status, Status::Done);
        assert_eq!(board.tasks[0].status, Status::Todo);
        assert_eq!(board.tasks[2].status, Status::Todo);
        // order is untouched
        let titles: Vec<_> = board.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);

        assert!(!board.update_task_status("missing", Status::Done));
        assert!(!board.update_task_status("1001", Status::Done));
    }

    #[test]
    fn delete_removes_only_matching_task() {
        let mut board = board_with(&["a", "b"]);
        assert!(board.delete_task("1000"));
        assert_eq!(board.tasks.len(), 1);
        assert_eq!(board.tasks[0].title, "b");
        assert!(!board.delete_task("1000"));
    }

    #[test]
    fn edit_keeps_identity_and_status() {
        let mut board = board_with(&["a"]);
        board.update_task_status("1000", Status::Progress);
        let draft = TaskDraft {
            title: "renamed".into(),
            description: "now with text".into(),
            priority: Priority::Low,
            due_date: None,
        };
        assert!(board.update_task("1000", draft).unwrap());
        let task = board.require("1000").unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.status, Status::Progress);
        assert_eq!(task.priority, Priority::Low);

        assert!(matches!(
            board.update_task("1000", TaskDraft::new("")),
            Err(Error::EmptyTitle)
        ));
        assert!(!board.update_task("nope", TaskDraft::new("x")).unwrap());
    }

    #[test]
    fn tasks_are_partitioned_by_status() {
        let mut board = board_with(&["a", "b", "c"]);
        board.update_task_status("1000", Status::Done);
        board.update_task_status("1002", Status::Progress);
        let titles = |s| {
            board
                .get_tasks_by_status(s)
                .iter()
                .map(|t| t.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(Status::Todo), ["b"]);
        assert_eq!(titles(Status::Progress), ["c"]);
        assert_eq!(titles(Status::Done), ["a"]);
        assert_eq!(board.stats().completion_rate, 33);
    }

    #[test]
    fn move_task_follows_selection() {
        let mut board = board_with(&["a", "b"]);
        board.select_task(1);
        assert_eq!(board.selected().unwrap().title, "b");

        assert!(board.move_task(1));
        assert_eq!(board.selected_column(), Status::Progress);
        assert_eq!(board.selected().unwrap().title, "b");

        assert!(board.move_task(1));
        assert_eq!(board.selected_column(), Status::Done);
        assert!(!board.move_task(1));

        assert!(board.move_task(-1));
        assert!(board.move_task(-1));
        assert_eq!(board.selected_column(), Status::Todo);
        assert!(!board.move_task(-1));
    }

    #[test]
    fn selection_is_clamped_after_delete() {
        let mut board = board_with(&["a", "b"]);
        board.select_task(1);
        board.delete_task("1001");
        assert_eq!(board.selected_task, 0);
        board.delete_task("1000");
        assert!(board.selected().is_none());
        board.select_task(1);
        assert_eq!(board.selected_task, 0);
    }

    #[test]
    fn column_selection_is_bounded() {
        let mut board = KanbanBoard::default();
        board.select_column(-1);
        assert_eq!(board.selected_column(), Status::Todo);
        board.select_column(5);
        assert_eq!(board.selected_column(), Status::Done);
    }
}
