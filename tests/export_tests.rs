use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use study_schedule::{
    ExportFormat, ScheduleEntryInput, ScheduleRepository, Session, entries_from_csv,
    export::{page_layout, truncate_cell},
    export_file_name, pdf_table_rows, to_csv, to_pdf,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_repository() -> ScheduleRepository {
    let repo = ScheduleRepository::in_memory().unwrap();
    repo.create(
        &ScheduleEntryInput::new("Calculus, Part I", "MATH101", "Dr. \"Doc\" Smith", d(2024, 3, 15), Session::Afternoon)
            .with_lesson("Chapter 3: Derivatives, limits")
            .with_notes("line one\nline two, with comma"),
    )
    .unwrap();
    repo.create(&ScheduleEntryInput::new("Physics", "PHY1", "Dr. Lee", d(2024, 3, 9), Session::Morning))
        .unwrap();
    repo
}

#[test]
fn csv_has_fixed_header_and_rows_in_list_order() {
    let repo = seeded_repository();
    let entries = repo.list_all().unwrap();
    let csv = String::from_utf8(to_csv(&entries).unwrap()).unwrap();

    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "id,course_name,course_code,teacher,lesson,notes,study_date,session,color,created_at"
    );
    let physics = csv.find("Physics").unwrap();
    let calculus = csv.find("Calculus").unwrap();
    assert!(physics < calculus, "rows should follow list order:\n{csv}");
    assert!(csv.contains("\"Calculus, Part I\""));
    assert!(csv.contains("\"Dr. \"\"Doc\"\" Smith\""));
}

#[test]
fn csv_of_empty_list_is_header_only() {
    let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
    assert_eq!(
        csv.trim_end(),
        "id,course_name,course_code,teacher,lesson,notes,study_date,session,color,created_at"
    );
    assert!(entries_from_csv(csv.as_bytes()).unwrap().is_empty());
}

#[test]
fn csv_round_trip_preserves_entries_with_special_characters() {
    let repo = seeded_repository();
    let entries = repo.list_all().unwrap();

    let bytes = to_csv(&entries).unwrap();
    let parsed = entries_from_csv(&bytes).unwrap();
    assert_eq!(parsed, entries);
}

#[test]
fn csv_parse_rejects_unknown_session() {
    let csv = "id,course_name,course_code,teacher,lesson,notes,study_date,session,color,created_at\n\
               1,Physics,PHY1,Dr. Lee,,,2024-03-09,Noon,#4CAF50,2024-03-01 10:00:00\n";
    let err = entries_from_csv(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("session"), "{err}");
}

#[test]
fn truncation_cuts_at_forty_characters() {
    let forty = "a".repeat(40);
    let forty_five = "b".repeat(45);
    assert_eq!(truncate_cell(&forty), forty);
    assert_eq!(truncate_cell(&forty_five), format!("{}...", "b".repeat(40)));
}

#[test]
fn pdf_rows_use_table_columns_and_truncate_lesson_and_notes() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let long_notes = "n".repeat(45);
    let long_lesson = "l".repeat(41);
    repo.create(
        &ScheduleEntryInput::new("Calculus", "MATH101", "Dr. Smith", d(2024, 3, 15), Session::Evening)
            .with_lesson(long_lesson)
            .with_notes(long_notes),
    )
    .unwrap();
    repo.create(
        &ScheduleEntryInput::new("Physics", "PHY1", "Dr. Lee", d(2024, 3, 16), Session::Morning)
            .with_notes("x".repeat(40)),
    )
    .unwrap();

    let rows = pdf_table_rows(&repo.list_all().unwrap());
    assert_eq!(
        rows[0],
        [
            "2024-03-15".to_string(),
            "Evening".to_string(),
            "Calculus".to_string(),
            "MATH101".to_string(),
            format!("{}...", "l".repeat(40)),
            "Dr. Smith".to_string(),
            format!("{}...", "n".repeat(40)),
        ]
    );
    assert_eq!(rows[1][4], "");
    assert_eq!(rows[1][6], "x".repeat(40));
}

#[test]
fn pdf_output_is_a_pdf_document() {
    let repo = seeded_repository();
    let bytes = to_pdf(&repo.list_all().unwrap()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn pdf_paginates_long_schedules() {
    let repo = ScheduleRepository::in_memory().unwrap();
    for day in 1..=28 {
        for session in Session::ALL {
            repo.create(&ScheduleEntryInput::new("Course", "C1", "T", d(2024, 2, day), session))
                .unwrap();
        }
    }
    let entries = repo.list_all().unwrap();
    assert_eq!(entries.len(), 84);

    let pages = page_layout(entries.len());
    assert_eq!(pages.len(), 3, "{pages:?}");
    assert_eq!(pages.first().map(|p| p.start), Some(0));
    assert_eq!(pages.last().map(|p| p.end), Some(84));
    for pair in pages.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        // continuation pages have no title, so they hold more rows
        assert!(pair[1].len() <= pages[1].len());
    }
    assert!(pages[1].len() > pages[0].len());

    let bytes = to_pdf(&entries).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn pdf_layout_of_empty_or_short_table_is_one_page() {
    assert_eq!(page_layout(0), vec![0..0]);
    assert_eq!(page_layout(5), vec![0..5]);
    assert!(!to_pdf(&[]).unwrap().is_empty());
}

#[test]
fn pdf_rows_flatten_line_breaks() {
    let repo = seeded_repository();
    let rows = pdf_table_rows(&repo.list_all().unwrap());
    assert_eq!(rows[1][6], "line one line two, with comma");
    assert!(rows.iter().flatten().all(|cell| !cell.contains('\n')));
}

#[test]
fn export_file_names_follow_convention() {
    assert_eq!(
        export_file_name(ExportFormat::Csv, d(2024, 3, 13)),
        "study_schedule_20240313.csv"
    );
    assert_eq!(
        export_file_name(ExportFormat::Pdf, d(2024, 3, 13)),
        "study_schedule_20240313.pdf"
    );
    assert_eq!(ExportFormat::from_extension("PDF"), Some(ExportFormat::Pdf));
    assert_eq!(ExportFormat::from_extension("xlsx"), None);
}
