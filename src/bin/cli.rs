use chrono::{Local, NaiveDate};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use study_schedule::{
    AppConfig, EntryDraft, ExportFormat, ScheduleEntry, ScheduleEntryInput, ScheduleError,
    ScheduleRepository, WeekView, calendar::CalendarCell, entry::parse_study_date, export, logging,
};

const LIST_COLUMNS: [&str; 9] = [
    "id", "study_date", "session", "course_name", "course_code", "lesson", "teacher", "notes",
    "color",
];

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    // Compute column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.chars().count())));
        line.push_str(" |");
    }
    line
}

fn entry_row(entry: &ScheduleEntry) -> Vec<String> {
    // multi-line notes would break the table
    let flat = |text: &Option<String>| text.as_deref().unwrap_or_default().replace('\n', " ");
    vec![
        entry.id.to_string(),
        entry.study_date.to_string(),
        entry.session.to_string(),
        entry.course_name.clone(),
        entry.course_code.clone(),
        flat(&entry.lesson),
        entry.teacher.clone(),
        flat(&entry.notes),
        entry.color.to_string(),
    ]
}

fn render_entries(entries: &[ScheduleEntry]) -> String {
    if entries.is_empty() {
        return "No schedules yet. Add your first schedule with 'add'.".to_string();
    }
    let rows: Vec<Vec<String>> = entries.iter().map(entry_row).collect();
    render_text_table(&LIST_COLUMNS, &rows)
}

fn render_details(entry: &ScheduleEntry) -> String {
    let mut out = format!(
        "{}\n  Code    : {}\n  Teacher : {}\n",
        entry.course_name, entry.course_code, entry.teacher
    );
    if let Some(lesson) = &entry.lesson {
        out.push_str(&format!("  Lesson  : {lesson}\n"));
    }
    out.push_str(&format!(
        "  Date    : {}\n  Session : {}\n  Notes   : {}\n  Color   : {}\n  Created : {}",
        entry.study_date,
        entry.session,
        entry.notes.as_deref().unwrap_or_default(),
        entry.color,
        entry.created_at
    ));
    out
}

fn render_week(view: &WeekView) -> String {
    let mut out = format!("Week: {}\n", view.range_label);
    for day in &view.days {
        out.push_str(&format!("\n{} {}\n", day.day, day.date_label));
        for cell in &day.cells {
            match cell {
                CalendarCell::Free { session } => {
                    out.push_str(&format!("  {:<10} Free\n", session.as_str()));
                }
                CalendarCell::Occupied { session, entries } => {
                    for entry in entries {
                        let lesson = entry
                            .lesson
                            .as_deref()
                            .map(|l| format!(" - {l}"))
                            .unwrap_or_default();
                        out.push_str(&format!(
                            "  {:<10} {} ({}){} [{}]\n",
                            session.as_str(),
                            entry.course_name,
                            entry.course_code,
                            lesson,
                            entry.teacher
                        ));
                    }
                }
            }
        }
    }
    out
}

/// `name | code | teacher | lesson | notes | date | session [| color]`
fn parse_fields(rest: &str) -> Option<EntryDraft> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    if fields.len() < 7 || fields.len() > 8 {
        return None;
    }
    Some(EntryDraft {
        course_name: fields[0].to_string(),
        course_code: fields[1].to_string(),
        teacher: fields[2].to_string(),
        lesson: Some(fields[3].to_string()),
        notes: Some(fields[4].to_string()),
        study_date: fields[5].to_string(),
        session: fields[6].to_string(),
        color: fields.get(7).map(|c| c.to_string()),
    })
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  list                               Show all schedules (by date, session)\n  show <id>                          Show one schedule\n  add <fields>                       Add a schedule\n  update <id> <fields>               Replace a schedule\n  delete <id>                        Delete a schedule\n  week [YYYY-MM-DD]                  Weekly calendar containing the date (default today)\n  export <csv|pdf> [path]            Export all schedules (default study_schedule_<date>.<ext>)\n  quit|exit                          Exit\n\n<fields> = course name | code | teacher | lesson | notes | YYYY-MM-DD | Morning|Afternoon|Evening [| #RRGGBB]"
    );
}

fn report(err: &ScheduleError) {
    match err {
        ScheduleError::Validation(e) => println!("Invalid input: {e}"),
        ScheduleError::NotFound(id) => println!("Schedule {id} not found."),
        ScheduleError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            println!("Error: {e}");
        }
    }
}

fn draft_to_input(rest: &str) -> Option<ScheduleEntryInput> {
    let Some(draft) = parse_fields(rest) else {
        println!("Expected 7 or 8 '|'-separated fields. Type 'help'.");
        return None;
    };
    match ScheduleEntryInput::try_from(draft) {
        Ok(input) => Some(input),
        Err(e) => {
            println!("Invalid input: {e}");
            None
        }
    }
}

fn export_entries(repository: &ScheduleRepository, format: ExportFormat, path: Option<&str>) {
    let entries = match repository.list_all() {
        Ok(entries) => entries,
        Err(e) => return report(&e),
    };
    let bytes = match format {
        ExportFormat::Csv => export::to_csv(&entries),
        ExportFormat::Pdf => export::to_pdf(&entries),
    };
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(export::export_file_name(format, today())));
    match bytes.map_err(|e| e.to_string()).and_then(|b| fs::write(&path, b).map_err(|e| e.to_string())) {
        Ok(()) => println!("Exported {} schedules to {}", entries.len(), path.display()),
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            println!("Export failed: {e}");
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    match raw.map(str::parse::<i64>) {
        Some(Ok(id)) => Some(id),
        _ => {
            println!("Invalid id");
            None
        }
    }
}

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    logging::init_tracing(&config.log_filter);

    let repository = match ScheduleRepository::open(&config.database_path) {
        Ok(repository) => repository,
        Err(e) => {
            eprintln!("Could not open {}: {e}", config.database_path.display());
            std::process::exit(1);
        }
    };

    println!("Study Schedule Manager (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" => match repository.list_all() {
                Ok(entries) => println!("{}", render_entries(&entries)),
                Err(e) => report(&e),
            },
            "show" => {
                let Some(id) = parse_id(rest.split_whitespace().next()) else { continue };
                match repository.get(id) {
                    Ok(entry) => println!("{}", render_details(&entry)),
                    Err(e) => report(&e),
                }
            }
            "add" => {
                let Some(input) = draft_to_input(rest) else { continue };
                match repository.create(&input) {
                    Ok(id) => println!("Schedule {id} added."),
                    Err(e) => report(&e),
                }
            }
            "update" => {
                let (id_s, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let Some(id) = parse_id(Some(id_s)) else { continue };
                let Some(input) = draft_to_input(fields) else { continue };
                match repository.update(id, &input) {
                    Ok(()) => println!("Schedule {id} updated."),
                    Err(e) => report(&e),
                }
            }
            "delete" => {
                let Some(id) = parse_id(rest.split_whitespace().next()) else { continue };
                match repository.delete(id) {
                    Ok(()) => println!("Schedule {id} deleted."),
                    Err(e) => report(&e),
                }
            }
            "week" => {
                let reference = if rest.is_empty() {
                    today()
                } else {
                    match parse_study_date(rest) {
                        Ok(date) => date,
                        Err(e) => {
                            println!("Invalid input: {e}");
                            continue;
                        }
                    }
                };
                match repository.list_all() {
                    Ok(entries) => println!("{}", render_week(&WeekView::project(reference, &entries))),
                    Err(e) => report(&e),
                }
            }
            "export" => {
                let mut parts = rest.split_whitespace();
                match parts.next().and_then(ExportFormat::from_extension) {
                    Some(format) => export_entries(&repository, format, parts.next()),
                    None => println!("Usage: export <csv|pdf> [path]"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
