use chrono::NaiveDate;

use courtevo_boardroom::error::{ScreenError, ValidationError};
use courtevo_boardroom::export::{DirectorySink, MemorySink, PdfLayout};
use courtevo_boardroom::filter::Criteria;
use courtevo_boardroom::models::{seeded_screen, Athlete, AthleteStatus, Innovation, Stakeholder};
use courtevo_boardroom::screen::{Mode, Screen};
use courtevo_boardroom::store::Record;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
}

fn athletes() -> Screen<Athlete> {
    seeded_screen::<Athlete>(8)
}

fn id_of(screen: &Screen<Athlete>, name: &str) -> uuid::Uuid {
    screen
        .store()
        .items()
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.id())
        .expect("seeded athlete should exist")
}

fn fill_new_athlete(screen: &mut Screen<Athlete>) {
    for (key, value) in [
        ("name", "Nika Radić"),
        ("position", "Point Guard"),
        ("age", "18"),
        ("status", "Ready"),
        ("load", "55"),
        ("fatigue", "30"),
        ("readiness", "79"),
        ("window_days", "0"),
        ("trend", "70,74,79"),
    ] {
        screen.set_field(key, value).unwrap();
    }
}

#[test]
fn only_one_form_is_open_at_a_time() {
    let mut screen = athletes();
    let luka = id_of(&screen, "Luka Perić");

    screen.open_view(luka).unwrap();
    assert_eq!(screen.open_add(), Err(ScreenError::Busy("viewing")));
    assert_eq!(screen.open_edit(luka), Err(ScreenError::Busy("viewing")));
    assert_eq!(screen.set_field("name", "x"), Err(ScreenError::NoOpenForm));

    screen.cancel();
    screen.open_add().unwrap();
    assert_eq!(screen.open_view(luka), Err(ScreenError::Busy("adding")));
}

#[test]
fn invalid_submission_keeps_the_draft() {
    let mut screen = athletes();
    let before = screen.store().len();

    screen.open_add().unwrap();
    fill_new_athlete(&mut screen);
    screen.set_field("fatigue", "lots").unwrap();

    let err = screen.submit().unwrap_err();
    assert!(matches!(
        err,
        ScreenError::Validation(ValidationError::NotANumber { ref field, .. }) if field == "fatigue"
    ));
    assert_eq!(screen.mode().name(), "adding");
    assert_eq!(screen.draft().and_then(|d| d.get("name")), Some("Nika Radić"));
    assert_eq!(screen.store().len(), before);

    screen.set_field("fatigue", "30").unwrap();
    let id = screen.submit().unwrap();
    assert_eq!(screen.mode(), &Mode::Idle);
    assert_eq!(screen.store().len(), before + 1);
    assert_eq!(screen.store().get(id).unwrap().trend, vec![70.0, 74.0, 79.0]);
}

#[test]
fn edit_replaces_fields_and_keeps_log() {
    let mut screen = athletes();
    let ivo = id_of(&screen, "Ivo Babić");
    let log_before = screen.store().get(ivo).unwrap().log.clone();

    screen.open_edit(ivo).unwrap();
    screen.set_field("status", "Monitor").unwrap();
    screen.set_field("readiness", "61").unwrap();
    assert_eq!(screen.submit().unwrap(), ivo);

    let edited = screen.store().get(ivo).unwrap();
    assert_eq!(edited.status, AthleteStatus::Monitor);
    assert_eq!(edited.readiness, 61.0);
    assert_eq!(edited.log, log_before);

    assert!(screen.undo());
    assert_eq!(screen.store().get(ivo).unwrap().status, AthleteStatus::AtRisk);
}

#[test]
fn deleting_the_viewed_record_closes_the_panel() {
    let mut screen = athletes();
    let ana = id_of(&screen, "Ana Jurić");

    screen.open_view(ana).unwrap();
    assert!(screen.delete(ana));
    assert_eq!(screen.mode(), &Mode::Idle);
    assert!(!screen.delete(ana));

    assert!(screen.undo());
    assert!(screen.store().get(ana).is_some());
}

#[test]
fn undo_of_an_add_closes_the_panel_on_it() {
    let mut screen = athletes();
    screen.open_add().unwrap();
    fill_new_athlete(&mut screen);
    let id = screen.submit().unwrap();

    screen.open_view(id).unwrap();
    assert!(screen.undo());
    assert!(screen.store().get(id).is_none());
    assert_eq!(screen.mode(), &Mode::Idle);
    assert!(screen.selected().is_none());
}

#[test]
fn redo_of_a_delete_closes_the_editor_on_it() {
    let mut screen = athletes();
    let lucija = id_of(&screen, "Lucija Horvat");

    assert!(screen.delete(lucija));
    assert!(screen.undo());
    screen.open_edit(lucija).unwrap();

    assert!(screen.redo());
    assert_eq!(screen.mode(), &Mode::Idle);
    assert_eq!(screen.set_field("name", "x"), Err(ScreenError::NoOpenForm));
}

#[test]
fn scenarios_saturate_at_counter_limits() {
    let max = u32::MAX.to_string();

    let mut screen = athletes();
    let luka = id_of(&screen, "Luka Perić");
    screen.open_edit(luka).unwrap();
    screen.set_field("window_days", max.as_str()).unwrap();
    screen.submit().unwrap();
    let extended = screen.simulate(luka, "extend-window", today()).unwrap();
    assert_eq!(extended.window_days, u32::MAX);

    let mut pipeline = seeded_screen::<Innovation>(8);
    let id = pipeline.store().items()[0].id;
    pipeline.open_edit(id).unwrap();
    pipeline.set_field("votes", max.as_str()).unwrap();
    pipeline.submit().unwrap();
    let voted = pipeline.simulate(id, "vote", today()).unwrap();
    assert_eq!(voted.votes, u32::MAX);
    assert_eq!(voted.log.len(), 2);
}

#[test]
fn simulation_goes_through_undo_history() {
    let mut screen = athletes();
    let marin = id_of(&screen, "Marin Kovač");
    let original = screen.store().get(marin).unwrap().clone();

    let pushed = screen.simulate(marin, "push-load", today()).unwrap();
    assert_eq!(pushed.fatigue, 81.0);
    assert_eq!(pushed.log.len(), original.log.len() + 1);

    assert!(screen.undo());
    assert_eq!(screen.store().get(marin), Some(&original));
    assert!(screen.redo());
    assert_eq!(screen.store().get(marin).unwrap().fatigue, 81.0);

    assert_eq!(
        screen.simulate(marin, "teleport", today()).unwrap_err(),
        ScreenError::UnknownScenario("teleport".to_string())
    );
}

#[test]
fn visible_rows_respect_criteria() {
    let mut screen = athletes();
    screen.set_criteria(Criteria::new().equals("position", "Center").min("readiness", 60.0));

    let names: Vec<_> = screen.visible().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Tomislav Šarić"]);
}

#[test]
fn csv_export_survives_commas_in_names() {
    let mut screen = seeded_screen::<Stakeholder>(8);
    let id = screen.store().items()[0].id;
    screen.open_edit(id).unwrap();
    screen.set_field("name", "Kos, Zdravko").unwrap();
    screen.set_field("notes", "Chairs budget, audit and \"strategy\" committees").unwrap();
    screen.submit().unwrap();

    let mut sink = MemorySink::new();
    let name = screen.export_csv(&mut sink, today()).unwrap();
    assert_eq!(name, "Stakeholders_2026-02-09.csv");

    let bytes = sink.files.get(&name).unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), screen.store().len());
    assert_eq!(&rows[0][1], "Kos, Zdravko");
    assert_eq!(&rows[0][7], "Chairs budget, audit and \"strategy\" committees");
}

#[test]
fn pdf_and_report_exports_cover_visible_records() {
    let mut screen = seeded_screen::<Innovation>(8);
    screen.set_criteria(Criteria::new().min("impact", 60.0));
    let mut sink = MemorySink::new();

    let pdf = screen
        .export_pdf(&mut sink, &PdfLayout::default(), today())
        .unwrap();
    let pages = &sink.pages[&pdf];
    let titles: usize = pages
        .iter()
        .flat_map(|p| p.texts())
        .filter(|t| t.contains(" (") && !t.contains(':'))
        .count();
    assert_eq!(titles, 3);

    let report = screen.export_report(&mut sink, today()).unwrap();
    let text = sink.text(&report).unwrap();
    assert!(text.starts_with("# Innovation Pipeline Board Report"));
    assert!(text.contains("for 3 records"));
    assert!(!text.contains("Cryotherapy"));
}

#[test]
fn directory_export_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let screen = athletes();
    let mut sink = DirectorySink::new(dir.path(), b'|');

    screen.export_csv(&mut sink, today()).unwrap();
    screen
        .export_pdf(&mut sink, &PdfLayout::default(), today())
        .unwrap();
    screen.export_report(&mut sink, today()).unwrap();

    assert_eq!(sink.written().len(), 3);
    let csv = std::fs::read_to_string(dir.path().join("Athletes_2026-02-09.csv")).unwrap();
    assert!(csv.starts_with("id|name|position"));
    assert!(dir.path().join("Athletes_2026-02-09.pdf.json").exists());
    assert!(dir.path().join("Athletes_2026-02-09.md").exists());
}
