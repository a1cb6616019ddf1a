use colored::*;
use jiff::Timestamp;
use jiff::civil::Date;

use taskboard::models::{
    Priority, ProjectWithStats, TagWithStats, Task, TaskStats, Theme,
};
use taskboard::stores::{projects::ProjectStore, tags::TagStore};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, is_overdue: bool) -> ColoredString {
    if task.completed {
        "✓".dimmed()
    } else if is_overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

fn get_priority_marker(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "!!!".red().bold(),
        Priority::Medium => "!! ".yellow(),
        Priority::Low => "!  ".dimmed(),
    }
}

/// Paint `text` with a `#rrggbb` color token, leaving it plain if the token isn't one
fn paint(text: &str, color: &str) -> ColoredString {
    let hex = color.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range).and_then(|c| u8::from_str_radix(c, 16).ok())
    };
    match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => text.truecolor(r, g, b),
        _ => text.normal(),
    }
}

/// Build the context string for a task: project name, tag names and due date
pub fn get_task_context(task: &Task, projects: &ProjectStore, tags: &TagStore) -> String {
    let mut parts = vec![];

    match projects.get_project(&task.project_id) {
        Some(project) => parts.push(project.name.clone()),
        None => parts.push(format!("project {}", task.project_id)),
    }

    let tag_names: Vec<String> = task
        .tag_ids
        .iter()
        .map(|id| {
            tags.get_tag(id)
                .map(|t| format!("#{}", t.name))
                .unwrap_or_else(|| format!("#{}", id))
        })
        .collect();
    if !tag_names.is_empty() {
        parts.push(tag_names.join(" "));
    }

    if let Some(due) = task.due_date {
        parts.push(format!("due {}", format_due_date(due)));
    }

    parts.join("  ·  ")
}

/// Render a single task line with id, glyph, priority, title, and right-aligned context
pub fn render_task_line(task: &Task, projects: &ProjectStore, tags: &TagStore, now: Timestamp) {
    let terminal_width = get_terminal_width();
    let is_overdue = task.is_overdue_at(now);

    let short_id: String = task.id.chars().take(8).collect();
    let id_str = format!("{:>8}", short_id);
    let glyph = get_status_glyph(task, is_overdue);
    let marker = get_priority_marker(task.priority);

    let left_section = format!("  {}  {} {}  {}", id_str, glyph, marker, task.title);
    let styled_left = if task.completed {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let context = get_task_context(task, projects, tags);
    let left_visible_len = format!("  {}  {} {}  {}", id_str, " ", "   ", task.title)
        .chars()
        .count();
    let right_visible_len = context.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), context.dimmed());
    } else {
        println!("{}", styled_left);
        println!("      {}", context.dimmed());
    }
}

/// Format a due date for display (e.g., "Today", "Tomorrow", "Jan 15")
pub fn format_due_date(date: Date) -> String {
    let today = jiff::Zoned::now().date();

    if date == today {
        "today".to_string()
    } else if today.tomorrow().map(|t| t == date).unwrap_or(false) {
        "tomorrow".to_string()
    } else if date.year() == today.year() {
        date.strftime("%b %d").to_string()
    } else {
        date.strftime("%b %d %Y").to_string()
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "High", "Medium")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn render_stats(stats: &TaskStats) {
    println!("\n  {}\n", "Statistics".cyan().bold());
    println!("  {:<10} {}", "Total", stats.total);
    println!("  {:<10} {}", "Completed", stats.completed.to_string().green());
    println!("  {:<10} {}", "Pending", stats.pending);
    let overdue = stats.overdue.to_string();
    let overdue = if stats.overdue > 0 {
        overdue.red().bold()
    } else {
        overdue.normal()
    };
    println!("  {:<10} {}", "Overdue", overdue);
    println!();
}

pub fn render_project_line(entry: &ProjectWithStats) {
    let project = &entry.project;
    let task_word = if entry.task_count == 1 { "task" } else { "tasks" };
    println!(
        "  {}  {}  {}",
        paint("■", &project.color),
        project.name.bold(),
        format!("({} {})", entry.task_count, task_word).dimmed()
    );
    if let Some(description) = &project.description {
        println!("     {}", description.dimmed());
    }
    println!("     {}", format!("id {}", project.id).dimmed());
}

pub fn render_tag_line(entry: &TagWithStats) {
    let tag = &entry.tag;
    println!(
        "  {}  {}  {}",
        paint("#", &tag.color),
        tag.name.bold(),
        format!("{} · id {}", entry.task_count, tag.id).dimmed()
    );
}

pub fn render_theme(theme: Theme) {
    let label = match theme {
        Theme::Light => "light".normal(),
        Theme::Dark => "dark".bold(),
    };
    println!("  Theme: {}", label);
}
