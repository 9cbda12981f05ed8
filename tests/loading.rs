use std::path::PathBuf;

use euro24_terminal::dataset::{GOALS_SCORED, KEEPER_SAVES, SHOTS_ON_TARGET, load_dataset};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn loads_sample_fixture() {
    let ds = load_dataset(&fixture("euro_sample.csv")).expect("fixture should load");
    assert_eq!(ds.len(), 5);
    assert_eq!(ds.teams()[0], "Spain");
    assert_eq!(ds.text_columns, vec!["coach".to_string()]);
    let goals = ds.column_index(GOALS_SCORED).expect("goals column");
    assert_eq!(ds.records[1].values[goals], Some(11.0));
}

#[test]
fn shipped_dataset_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Euro_2024_Team_Stats_Reduced.csv");
    let ds = load_dataset(&path).expect("shipped dataset should load");
    assert_eq!(ds.teams().len(), 24);
    assert!(ds.contains_team("Germany"));
}

#[test]
fn missing_file_is_an_error() {
    let err = load_dataset(&fixture("does_not_exist.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.csv"));
}

#[test]
fn missing_required_column_is_an_error() {
    let err = load_dataset(&fixture("missing_column.csv")).unwrap_err();
    assert!(format!("{err:#}").contains(SHOTS_ON_TARGET));
}

#[test]
fn ragged_rows_are_an_error() {
    assert!(load_dataset(&fixture("ragged.csv")).is_err());
}

#[test]
fn non_numeric_stat_is_an_error() {
    let err = load_dataset(&fixture("bad_number.csv")).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains(GOALS_SCORED));
    assert!(msg.contains("eleven"));
}

#[test]
fn blank_cells_load_as_missing() {
    let ds = load_dataset(&fixture("multi_row.csv")).expect("fixture should load");
    let saves = ds.column_index(KEEPER_SAVES).expect("saves column");
    assert_eq!(ds.records[2].values[saves], None);
}
