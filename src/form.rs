use crossterm::event::{KeyCode, KeyEvent};

use crate::{
    error::Result,
    task::{parse_due_date, Priority, Task, TaskDraft},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Priority,
    DueDate,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::Title,
        Field::Description,
        Field::Priority,
        Field::DueDate,
    ];

    fn step(self, direction: isize) -> Field {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + direction).rem_euclid(len) as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Priority => "Priority",
            Field::DueDate => "Due date",
        }
    }
}

/// What a key press did to the form.
#[derive(Debug, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    /// Id of the task being edited, `None` when adding.
    pub editing: Option<String>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn add() -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: String::new(),
            focus: Field::Title,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        let draft = TaskDraft::from_task(task);
        Self {
            editing: Some(task.id.clone()),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            focus: Field::Title,
            error: None,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Task"
        } else {
            "Add New Task"
        }
    }

    /// The "Add Task" button is disabled while the title is blank.
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.step(1),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.step(-1),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if self.focus == Field::Priority => {
                self.priority = self.priority.cycle();
                self.error = None;
            }
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut() {
                    text.pop();
                    self.error = None;
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.text_mut() {
                    text.push(c);
                    self.error = None;
                }
            }
            _ => {}
        }
        FormAction::None
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::Priority => self.priority.to_string(),
            Field::DueDate => self.due_date.clone(),
        }
    }

    pub fn fields() -> [Field; 4] {
        Field::ORDER
    }

    pub fn to_draft(&self) -> Result<TaskDraft> {
        Ok(TaskDraft {
            title: self.title.clone(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            due_date: parse_due_date(&self.due_date)?,
        })
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::DueDate => Some(&mut self.due_date),
            Field::Priority => None,
        }
    }
}
