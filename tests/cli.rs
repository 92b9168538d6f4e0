use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn medlog(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medlog").unwrap();
    cmd.env("HOME", home).env_remove("MEDLOG_LOG");
    cmd
}

fn init(home: &Path) {
    let data_dir = home.join("data");
    medlog(home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap(), "--name", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized medlog"))
        .stdout(predicate::str::contains("Profile: Alice"));
}

const VISITS: &str = "\
Visit Date,Hospital Name,Doctor Name,Patient Name,Hospital Charges,Medicine Charges,Medicine Name,Address
2024-01-15,City Hospital,Dr. Smith,John Doe,5000,1200,Paracetamol,123 Main St
01/20/2024,General Hospital,Dr. Jones,Jane Doe,300.9,0,\"Amoxicillin, 500mg\",\"45 Park Rd\"
not-a-date,Clinic,Dr. X,Pat,abc,10,Aspirin,Somewhere
";

#[test]
fn import_then_list_as_json() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.csv");
    std::fs::write(&file, VISITS).unwrap();

    medlog(home.path())
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 valid entries ready to import"))
        .stdout(predicate::str::contains("2 errors found"))
        .stdout(predicate::str::contains("Imported 2 entries"));

    let out = medlog(home.path()).args(["list", "--json"]).output().unwrap();
    assert!(out.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // newest visit first
    assert_eq!(entries[0]["hospitalName"], "General Hospital");
    assert_eq!(entries[0]["hospitalRs"], 300);
    assert_eq!(entries[0]["medicineName"], "Amoxicillin, 500mg");
    assert_eq!(entries[1]["owner"], "Alice");
}

#[test]
fn reimporting_same_file_needs_force() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.csv");
    std::fs::write(&file, VISITS).unwrap();

    medlog(home.path()).args(["import", file.to_str().unwrap()]).assert().success();
    medlog(home.path())
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
    medlog(home.path())
        .args(["import", file.to_str().unwrap(), "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 entries"));
}

#[test]
fn dry_run_and_json_do_not_save() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.csv");
    std::fs::write(&file, VISITS).unwrap();

    medlog(home.path())
        .args(["import", file.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    let out = medlog(home.path())
        .args(["import", file.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed["entries"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["errors"][0]["row"], 4);
    assert_eq!(parsed["errors"][0]["field"], "Visit Date");

    medlog(home.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries yet"));
}

#[test]
fn non_csv_file_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.txt");
    std::fs::write(&file, VISITS).unwrap();

    medlog(home.path())
        .args(["import", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select a CSV file (.csv)"));
}

#[test]
fn add_edit_and_delete_with_confirmation() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    medlog(home.path())
        .args([
            "add",
            "--hospital", "City Hospital",
            "--date", "2024-03-01",
            "--doctor", "Dr. Smith",
            "--patient", "John Doe",
            "--hospital-rs", "100",
            "--medicine-rs", "25",
            "--medicine", "Ibuprofen",
            "--address", "1 High St",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry 1"));

    medlog(home.path())
        .args(["edit", "1", "--medicine-rs", "12.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("whole numbers only"));

    medlog(home.path())
        .args(["edit", "1", "--medicine-rs", "30"])
        .assert()
        .success();

    medlog(home.path())
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rs 130"));

    medlog(home.path())
        .args(["delete", "1", "--confirm", "city hospital"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Confirmation does not match"));

    medlog(home.path())
        .args(["delete", "1", "--confirm", "City Hospital"])
        .assert()
        .success();

    medlog(home.path())
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry not found"));
}

#[test]
fn add_reports_every_invalid_field() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    medlog(home.path())
        .args(["add", "--hospital", "City"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Visit date is required"))
        .stderr(predicate::str::contains("Hospital charges are required"));
}

#[test]
fn export_csv_writes_file() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.csv");
    std::fs::write(&file, VISITS).unwrap();
    medlog(home.path()).args(["import", file.to_str().unwrap()]).assert().success();

    let out = home.path().join("out").join("export.csv");
    medlog(home.path())
        .args(["export", "csv", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 entries"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Visit Date,Hospital Name"));
    assert!(text.contains("\"Amoxicillin, 500mg\""));
}

#[test]
fn analytics_summary_totals() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("visits.csv");
    std::fs::write(&file, VISITS).unwrap();
    medlog(home.path()).args(["import", file.to_str().unwrap()]).assert().success();

    medlog(home.path())
        .args(["analytics", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries:           2"))
        .stdout(predicate::str::contains("Rs 6,500"));

    medlog(home.path())
        .args(["analytics", "monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jan 2024"));
}

#[test]
fn status_before_init_suggests_init() {
    let home = tempfile::tempdir().unwrap();
    medlog(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("medlog init"));
}
