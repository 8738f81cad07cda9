use std::fs::File;
use std::io::Write;

use magneto_config::{ReadingRow, load_samples_csv, readings_to_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("samples.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn loads_raw_stream() {
    let (_dir, path) = write_csv("x,y,z\n1.5,-2,30\n 0.25 , 0 , -4 \n");
    let rows = load_samples_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].axes(), [1.5, -2.0, 30.0]);
    assert_eq!(rows[1].axes(), [0.25, 0.0, -4.0]);
    assert!(rows[0].norm.is_none());
}

#[rstest]
fn accepts_export_layout() {
    let (_dir, path) = write_csv("x,y,z,norm\n3,4,0,5\n");
    let rows = load_samples_csv(&path).unwrap();
    assert_eq!(rows[0].norm, Some(5.0));
}

#[rstest]
#[case::wrong_order("y,x,z\n1,2,3\n", "must have headers")]
#[case::extra_column("x,y,z,t\n1,2,3,4\n", "must have headers")]
#[case::not_a_number("x,y,z\n1,abc,3\n", "invalid CSV row 2")]
#[case::short_row("x,y,z\n1,2,3\n4,5\n", "invalid CSV row 3")]
#[case::non_finite("x,y,z\n1,inf,3\n", "non-finite sample in CSV row 2")]
fn rejects_malformed(#[case] contents: &str, #[case] needle: &str) {
    let (_dir, path) = write_csv(contents);
    let err = load_samples_csv(&path).unwrap_err();
    assert!(
        format!("{err}").contains(needle),
        "error `{err}` does not mention `{needle}`"
    );
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_samples_csv(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err}").contains("open samples CSV"));
}

#[rstest]
fn readings_render_with_header() {
    let bytes = readings_to_csv(&[
        ReadingRow {
            x: 1.5,
            y: -2.0,
            z: 0.0,
            norm: 2.5,
        },
        ReadingRow {
            x: 0.01,
            y: 0.0,
            z: 10.0,
            norm: 10.0,
        },
    ])
    .unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "x,y,z,norm\n1.5,-2,0,2.5\n0.01,0,10,10\n"
    );
}
