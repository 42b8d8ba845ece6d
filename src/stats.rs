use crate::task::{Status, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Percentage of done tasks rounded to the nearest integer; 0 for an empty board.
    pub completion_rate: u8,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Stats {
            total: tasks.len(),
            ..Stats::default()
        };
        for task in tasks {
            match task.status {
                Status::Todo => stats.todo += 1,
                Status::Progress => stats.in_progress += 1,
                Status::Done => stats.done += 1,
            }
        }
        stats.completion_rate = completion_rate(stats.done, stats.total);
        stats
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Todo => self.todo,
            Status::Progress => self.in_progress,
            Status::Done => self.done,
        }
    }
}

fn completion_rate(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Same float arithmetic as the web page, so 29/200 shows 14 rather than 15.
    (done as f64 / total as f64 * 100.0).round() as u8
}
