use chrono::NaiveDate;
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use seqcal_core::models::{PriorityLevel, Task, TaskKind};

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub page: String,
    pub text: String,
    pub keyword: String,
    pub priority: PriorityLevel,
    pub scheduled: Option<NaiveDate>,
    pub repeating: bool,
    pub later: bool,
}

impl From<&Task> for ViewTask {
    fn from(task: &Task) -> Self {
        Self {
            page: task.page.clone(),
            text: task.text.clone(),
            keyword: task.keyword.to_string(),
            priority: task.priority,
            scheduled: task.scheduled,
            repeating: task.repeating,
            later: task.kind == TaskKind::Later,
        }
    }
}

fn scheduled_cell(scheduled: Option<NaiveDate>, today: NaiveDate) -> Cell {
    let Some(date) = scheduled else {
        return Cell::new("None");
    };
    if date == today {
        return Cell::new("today").fg(Color::Yellow);
    }
    let text = format!("{} ({})", date, (date - today).humanize());
    if date < today {
        Cell::new(text).fg(Color::Red)
    } else {
        Cell::new(text)
    }
}

pub fn build_table(tasks: &[ViewTask], today: NaiveDate) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Page", "Task", "Keyword", "Priority", "Scheduled"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(&task.page));

        let mut name = String::new();
        if task.repeating {
            name.push_str("↻ ");
        }
        name.push_str(&task.text);
        let mut name_cell = Cell::new(name);
        name_cell = if task.later {
            name_cell.fg(Color::DarkGrey)
        } else {
            match task.priority {
                PriorityLevel::A => name_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                PriorityLevel::B => name_cell.fg(Color::Yellow),
                PriorityLevel::C => name_cell.fg(Color::Green),
                PriorityLevel::Later | PriorityLevel::None => name_cell,
            }
        };
        row.add_cell(name_cell);

        row.add_cell(Cell::new(&task.keyword));
        row.add_cell(Cell::new(
            task.priority.letter().map_or_else(|| "-".to_string(), String::from),
        ));
        row.add_cell(scheduled_cell(task.scheduled, today));
        table.add_row(row);
    }
    table
}

pub fn display_tasks(tasks: &[ViewTask], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", build_table(tasks, today));
}
