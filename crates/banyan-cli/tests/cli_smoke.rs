use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const STORE: &str = r#"{
  "people": [
    {
      "person_id": 1,
      "person_name": "George Banyan",
      "gender": "male",
      "date_of_birth": "1887-03-04",
      "date_of_death": "1953-05-01",
      "occupation": "Joiner"
    },
    {
      "person_id": 2,
      "person_name": "Ada Banyan",
      "gender": "female",
      "date_of_birth": "1890-01-01",
      "date_of_birth_precision": 1
    },
    {
      "person_id": 3,
      "person_name": "Harold Banyan",
      "gender": "male",
      "date_of_birth": "1912-02-10",
      "father_id": 1,
      "mother_id": 2
    }
  ],
  "relationships": [
    {
      "relationship_id": "1",
      "relationship_type": "marriage",
      "person_a_id": 1,
      "person_b_id": 2,
      "start_date": "1910-06-04",
      "place": "York"
    }
  ]
}"#;

fn write_store(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("family_tree.json");
    fs::write(&path, STORE).expect("write store");
    path
}

#[test]
fn cli_prints_tree_svg_with_subject_marker() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = write_store(tmp.path());

    let exe = assert_cmd::cargo_bin!("banyan-cli");
    let output = Command::new(exe)
        .args(["tree", "3", "--store", store.to_string_lossy().as_ref()])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let svg = String::from_utf8(output.stdout).expect("utf8 svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("viewBox=\""));
    assert!(svg.contains(r#"id="subject""#));
    assert!(svg.contains("George Banyan"));
}

#[test]
fn cli_writes_page_to_out_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = write_store(tmp.path());
    let out = tmp.path().join("page.html");

    let exe = assert_cmd::cargo_bin!("banyan-cli");
    Command::new(exe)
        .args([
            "page",
            "1",
            "--store",
            store.to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let html = fs::read_to_string(&out).expect("read page");
    assert!(html.contains("<h1>George Banyan"));
    assert!(html.contains("data-scroll-y="));
}

#[test]
fn cli_render_all_writes_a_page_and_tree_per_person() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = write_store(tmp.path());
    let site = tmp.path().join("site");

    let exe = assert_cmd::cargo_bin!("banyan-cli");
    Command::new(exe)
        .args([
            "render-all",
            "--store",
            store.to_string_lossy().as_ref(),
            "--out",
            site.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    for id in [1, 2, 3] {
        assert!(site.join("pages").join(format!("{id}.html")).exists());
        assert!(site.join("trees").join(format!("{id}.svg")).exists());
    }

    // Page links stay relative so the flat site works from disk.
    let page = fs::read_to_string(site.join("pages").join("3.html")).expect("read page");
    assert!(page.contains(r#"href="1.html""#));
    assert!(page.contains(r#"src="../trees/3.svg""#));
}

#[test]
fn cli_rejects_unknown_person() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = write_store(tmp.path());

    let exe = assert_cmd::cargo_bin!("banyan-cli");
    Command::new(exe)
        .args(["tree", "99", "--store", store.to_string_lossy().as_ref()])
        .assert()
        .failure();
}

#[test]
fn cli_usage_on_missing_subject() {
    let exe = assert_cmd::cargo_bin!("banyan-cli");
    Command::new(exe).args(["page"]).assert().code(2);
}
