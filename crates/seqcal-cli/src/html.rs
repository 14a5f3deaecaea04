//! Bootstrap-styled HTML overview of open tasks and pages.

use chrono::{Datelike, NaiveDate};
use seqcal_core::models::{Keyword, PriorityLevel, Task};
use seqcal_core::page::Page;
use seqcal_core::schedule::{TaskAgenda, Vocabulary};
use std::collections::BTreeMap;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.1.1/dist/css/bootstrap.min.css";

/// Days with more tasks than this get a red heading.
const BUSY_DAY: usize = 10;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn badge(class: &str, label: &str) -> String {
    format!(r#"<span class="badge {}">{}</span>"#, class, escape(label))
}

/// Only explicit priorities get a badge.
fn priority_badge(priority: PriorityLevel) -> Option<String> {
    match priority {
        PriorityLevel::A => Some(badge("bg-danger", "A")),
        PriorityLevel::B => Some(badge("bg-warning text-dark", "B")),
        PriorityLevel::C => Some(badge("bg-success", "C")),
        PriorityLevel::Later | PriorityLevel::None => None,
    }
}

fn keyword_class(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::Ensure | Keyword::Track => "bg-warning text-dark",
        Keyword::Meet | Keyword::Discuss => "bg-info",
        Keyword::FollowUp | Keyword::GoTo | Keyword::Bring | Keyword::Get | Keyword::Share => {
            "bg-primary"
        }
        Keyword::Unknown => "bg-danger",
    }
}

/// One `<li>` body: priority, page, keyword, text.
pub fn render_task(task: &Task) -> String {
    let body = format!(
        "{} {} {}",
        badge("bg-secondary", &task.page),
        badge(keyword_class(task.keyword), task.keyword.as_str()),
        escape(&task.text)
    );
    match priority_badge(task.priority) {
        Some(priority) => format!("{} {}", priority, body),
        None => body,
    }
}

fn render_list(out: &mut String, heading: &str, tasks: &[Task]) {
    out.push_str(&format!("<h2>{}</h2><ol>", heading));
    for task in tasks {
        out.push_str(&format!("<li>{}</li>", render_task(task)));
    }
    out.push_str("</ol>\n");
}

fn day_heading(date: NaiveDate, vocabulary: &Vocabulary) -> String {
    format!(
        "{} {} {} {}",
        vocabulary.weekday_name(date.weekday()),
        date.day(),
        vocabulary.month_name(date),
        date.year()
    )
}

fn render_pages(out: &mut String, buckets: &BTreeMap<String, Vec<Page>>) {
    out.push_str("<h2>Dossiers</h2>\n");
    for (bucket, pages) in buckets {
        out.push_str(&format!(
            r#"<h3>{}</h3><table class="table table-hover table-sm"><thead><tr><th>Pagina</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead><tbody>"#,
            escape(bucket),
            badge("bg-danger", "A"),
            badge("bg-warning text-dark", "B"),
            badge("bg-success", "C"),
            badge("bg-info", "?"),
        ));
        for page in pages {
            let muted = if page.weight() == 0.0 { r#" class="text-muted""# } else { "" };
            out.push_str(&format!("<tr{}><td>{}</td>", muted, escape(&page.title)));
            for level in [
                Some(PriorityLevel::A),
                Some(PriorityLevel::B),
                Some(PriorityLevel::C),
                None,
            ] {
                out.push_str(&format!(
                    r#"<td><span class="badge bg-light text-dark rounded-pill">{}</span></td>"#,
                    page.priority_count(level)
                ));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>\n");
    }
}

/// Full page: short tasks, undated tasks, one list per day, LATER items,
/// then the per-bucket page table.
pub fn render_overview(
    agenda: &TaskAgenda,
    buckets: &BTreeMap<String, Vec<Page>>,
    vocabulary: &Vocabulary,
) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<link href=\"{}\" rel=\"stylesheet\">\n", BOOTSTRAP_CSS));
    out.push_str("<title>TODO</title>\n</head>\n<body>\n");
    out.push_str("<div class=\"container\">\n<h1>TODO</h1>\n");

    if !agenda.short.is_empty() {
        render_list(&mut out, "Very short TODO's", &agenda.short);
    }
    render_list(
        &mut out,
        &format!("TODO's with no date <small>({})</small>", agenda.dateless.len()),
        &agenda.dateless,
    );
    for (date, tasks) in &agenda.dated {
        let color = if tasks.len() > BUSY_DAY { "#a00" } else { "#000" };
        out.push_str(&format!(
            r#"<h2 style="color:{};">{} <small>({})</small></h2><ol>"#,
            color,
            day_heading(*date, vocabulary),
            tasks.len()
        ));
        for task in tasks {
            out.push_str(&format!("<li>{}</li>", render_task(task)));
        }
        out.push_str("</ol>\n");
    }
    if !agenda.later.is_empty() {
        render_list(&mut out, "Later (ooit)", &agenda.later);
    }

    render_pages(&mut out, buckets);
    out.push_str("</div>\n</body>\n</html>\n");
    out
}
