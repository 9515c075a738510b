mod common;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::str::contains;

const PEOPLE: &str = "id,name,email\n1,John Doe,john@x.com\n2,Jane,jane@x.com\n";

fn command() -> Command {
    Command::cargo_bin("csv-upsert").expect("binary exists")
}

#[test]
fn upsert_json_records_into_csv_in_place() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write(
        "batch.json",
        r#"[{"id": "1", "phone": "555"}, {"id": 3, "name": "Alice", "email": "alice@x.com"}]"#,
    );

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-k",
            "id",
        ])
        .assert()
        .success();

    assert_eq!(
        workspace.read("people.csv"),
        "id,name,email,phone\n1,John Doe,john@x.com,555\n2,Jane,jane@x.com,\n3,Alice,alice@x.com,\n"
    );
}

#[test]
fn upsert_with_anchor_writes_to_separate_output() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.jsonl", "{\"id\":\"2\",\"nickname\":\"JJ\"}\n");
    let output = workspace.path().join("merged.csv");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-k",
            "id",
            "--anchor",
            "name",
        ])
        .assert()
        .success();

    assert_eq!(workspace.read("people.csv"), PEOPLE);
    assert_eq!(
        workspace.read("merged.csv"),
        "id,name,nickname,email\n1,John Doe,,john@x.com\n2,Jane,JJ,jane@x.com\n"
    );
}

#[test]
fn missing_anchor_fails_and_leaves_target_alone() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "id,department\n9,ops\n");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-k",
            "id",
            "--growth",
            "adjacent",
            "--anchor",
            "department",
        ])
        .assert()
        .failure()
        .stderr(contains("Column 'department' not found in header"));

    assert_eq!(workspace.read("people.csv"), PEOPLE);
}

#[test]
fn aborted_batch_is_not_saved() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "id,name\n1,Johnny\n,ghost\n");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-k",
            "id",
            "--ignore-empty-fields",
        ])
        .assert()
        .failure()
        .stderr(contains("Record 1 is missing key field 'id'"));

    assert_eq!(workspace.read("people.csv"), PEOPLE);
}

#[test]
fn skip_policy_saves_remaining_records() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "id,name\n1,Johnny\n,ghost\n");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-k",
            "id",
            "--ignore-empty-fields",
            "--on-missing-key",
            "skip",
        ])
        .assert()
        .success();

    assert_eq!(
        workspace.read("people.csv"),
        "id,name,email\n1,Johnny,john@x.com\n2,Jane,jane@x.com\n"
    );
}

#[test]
fn dry_run_prints_table_without_saving() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "id,name\n3,Alice\n");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-k",
            "id",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(contains("3    Alice"));

    assert_eq!(workspace.read("people.csv"), PEOPLE);
}

#[test]
fn config_file_supplies_key_spec() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "ID,Nickname\n1,JD\n");
    let config = workspace.write(
        "spec.yml",
        "key_column: id\ncomparison_field: id\ngrowth:\n  mode: adjacent\n  anchor: id\n",
    );

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        workspace.read("people.csv"),
        "id,Nickname,name,email\n1,JD,John Doe,john@x.com\n2,,Jane,jane@x.com\n"
    );
}

#[test]
fn records_from_stdin_create_new_dataset() {
    let workspace = TestWorkspace::new();
    let target = workspace.path().join("fresh.csv");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            "-",
            "--records-format",
            "jsonl",
            "-k",
            "sku",
        ])
        .write_stdin("{\"sku\":\"A1\",\"qty\":2}\n{\"sku\":\"a1\",\"qty\":5}\n")
        .assert()
        .success();

    assert_eq!(workspace.read("fresh.csv"), "sku,qty\na1,5\n");
}

#[test]
fn upsert_requires_a_key() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);
    let records = workspace.write("batch.csv", "id\n1\n");

    command()
        .args([
            "upsert",
            "-t",
            target.to_str().unwrap(),
            "-r",
            records.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Provide --key"));
}

#[test]
fn preview_renders_first_rows() {
    let workspace = TestWorkspace::new();
    let target = workspace.write("people.csv", PEOPLE);

    command()
        .args(["preview", "-i", target.to_str().unwrap(), "--rows", "1"])
        .assert()
        .success()
        .stdout(contains("John Doe"))
        .stdout(contains("... 1 more row(s)"));
}
