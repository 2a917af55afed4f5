use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use study_schedule::{
    HexColor, ScheduleEntry, ScheduleEntryInput, ScheduleError, ScheduleRepository, Session,
    ValidationError,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn input(course: &str, date: NaiveDate, session: Session) -> ScheduleEntryInput {
    ScheduleEntryInput::new(course, format!("{course}-101"), "Dr. Smith", date, session)
}

fn assert_matches_input(entry: &ScheduleEntry, expected: &ScheduleEntryInput) {
    assert_eq!(&entry.to_input(), expected);
}

#[test]
fn create_then_list_contains_exactly_that_entry() {
    let file = NamedTempFile::new().unwrap();
    let repo = ScheduleRepository::open(file.path()).unwrap();

    let new = input("Calculus I", d(2024, 3, 15), Session::Afternoon)
        .with_lesson("Chapter 3: Derivatives")
        .with_notes("Bring calculator");
    let id = repo.create(&new).unwrap();

    let entries = repo.list_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert_matches_input(&entries[0], &new);
}

#[test]
fn created_ids_are_distinct() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let a = repo.create(&input("A", d(2024, 3, 9), Session::Morning)).unwrap();
    let b = repo.create(&input("B", d(2024, 3, 9), Session::Morning)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn list_all_on_empty_store_is_empty() {
    let repo = ScheduleRepository::in_memory().unwrap();
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn list_all_orders_by_date_then_session() {
    let repo = ScheduleRepository::in_memory().unwrap();
    repo.create(&input("Evening", d(2024, 3, 10), Session::Evening)).unwrap();
    repo.create(&input("Early", d(2024, 3, 9), Session::Morning)).unwrap();
    repo.create(&input("Morning", d(2024, 3, 10), Session::Morning)).unwrap();
    repo.create(&input("Afternoon", d(2024, 3, 10), Session::Afternoon)).unwrap();

    let order: Vec<(NaiveDate, Session)> = repo
        .list_all()
        .unwrap()
        .iter()
        .map(|e| (e.study_date, e.session))
        .collect();
    assert_eq!(
        order,
        vec![
            (d(2024, 3, 9), Session::Morning),
            (d(2024, 3, 10), Session::Morning),
            (d(2024, 3, 10), Session::Afternoon),
            (d(2024, 3, 10), Session::Evening),
        ]
    );
}

#[test]
fn update_replaces_all_mutable_fields() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let id = repo
        .create(&input("Calculus I", d(2024, 3, 15), Session::Afternoon).with_notes("old"))
        .unwrap();
    let before = repo.get(id).unwrap();

    let replacement = ScheduleEntryInput::new("Linear Algebra", "MATH201", "Dr. Jones", d(2024, 3, 18), Session::Evening)
        .with_lesson("Eigenvalues")
        .with_color("#1f4788".parse::<HexColor>().unwrap());
    repo.update(id, &replacement).unwrap();

    let after = repo.get(id).unwrap();
    assert_matches_input(&after, &replacement);
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);

    // applying the same update again converges to the same state
    repo.update(id, &replacement).unwrap();
    assert_eq!(repo.get(id).unwrap(), after);
}

#[test]
fn update_missing_id_is_not_found_and_changes_nothing() {
    let repo = ScheduleRepository::in_memory().unwrap();
    repo.create(&input("A", d(2024, 3, 9), Session::Morning)).unwrap();
    let before = repo.list_all().unwrap();

    let err = repo
        .update(999, &input("B", d(2024, 3, 10), Session::Evening))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(999)));
    assert_eq!(repo.list_all().unwrap(), before);
}

#[test]
fn delete_removes_one_and_second_delete_is_not_found() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let keep = repo.create(&input("Keep", d(2024, 3, 9), Session::Morning)).unwrap();
    let gone = repo.create(&input("Gone", d(2024, 3, 9), Session::Evening)).unwrap();

    repo.delete(gone).unwrap();
    let remaining = repo.list_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);

    assert!(matches!(repo.delete(gone), Err(ScheduleError::NotFound(id)) if id == gone));
    assert!(matches!(repo.get(gone), Err(ScheduleError::NotFound(_))));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let first = repo.create(&input("A", d(2024, 3, 9), Session::Morning)).unwrap();
    repo.delete(first).unwrap();
    let second = repo.create(&input("B", d(2024, 3, 9), Session::Morning)).unwrap();
    assert!(second > first);
}

#[test]
fn blank_required_fields_are_rejected_before_storage() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let mut bad = input("Calculus", d(2024, 3, 9), Session::Morning);
    bad.teacher = "   ".into();

    let err = repo.create(&bad).unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::Validation(ValidationError::MissingField("teacher"))
    ));
    assert!(repo.list_all().unwrap().is_empty());

    let id = repo.create(&input("Calculus", d(2024, 3, 9), Session::Morning)).unwrap();
    assert!(matches!(
        repo.update(id, &bad),
        Err(ScheduleError::Validation(_))
    ));
    assert_eq!(repo.get(id).unwrap().teacher, "Dr. Smith");
}

#[test]
fn input_text_is_trimmed_and_blank_optionals_dropped() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let raw = ScheduleEntryInput::new("  Physics ", " PHY1", "Dr. Lee ", d(2024, 3, 9), Session::Morning)
        .with_lesson("  ")
        .with_notes(" lab day ");
    let id = repo.create(&raw).unwrap();

    let entry = repo.get(id).unwrap();
    assert_eq!(entry.course_name, "Physics");
    assert_eq!(entry.course_code, "PHY1");
    assert_eq!(entry.teacher, "Dr. Lee");
    assert_eq!(entry.lesson, None);
    assert_eq!(entry.notes.as_deref(), Some("lab day"));
}

#[test]
fn file_store_persists_across_reopen() {
    let file = NamedTempFile::new().unwrap();
    let id = {
        let repo = ScheduleRepository::open(file.path()).unwrap();
        repo.create(&input("Chemistry", d(2024, 4, 1), Session::Evening)).unwrap()
    };

    let reopened = ScheduleRepository::open(file.path()).unwrap();
    let entry = reopened.get(id).unwrap();
    assert_eq!(entry.course_name, "Chemistry");
    assert_eq!(entry.color, HexColor::default());
}

#[test]
fn five_digit_year_is_rejected_before_storage() {
    let repo = ScheduleRepository::in_memory().unwrap();
    let far = input("Far Future", d(10000, 1, 1), Session::Morning);

    let err = repo.create(&far).unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::Validation(ValidationError::InvalidDate { .. })
    ));

    let id = repo.create(&input("Now", d(2024, 3, 10), Session::Morning)).unwrap();
    assert!(matches!(
        repo.update(id, &far),
        Err(ScheduleError::Validation(ValidationError::InvalidDate { .. }))
    ));

    let dates: Vec<NaiveDate> = repo.list_all().unwrap().iter().map(|e| e.study_date).collect();
    assert_eq!(dates, vec![d(2024, 3, 10)]);
}

#[test]
fn opening_inside_missing_directory_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("schedule.db");
    let repo = ScheduleRepository::open(&path).unwrap();
    repo.create(&input("Physics", d(2024, 3, 9), Session::Morning)).unwrap();
    assert_eq!(ScheduleRepository::open(&path).unwrap().list_all().unwrap().len(), 1);
}
