mod support;

use support::{days_from_now, TestWorkspace};

fn seeded_workspace() -> TestWorkspace {
    let ws = TestWorkspace::init();
    ws.seed_actor();
    ws.trk_cmd().args(["user", "add", "Marc"]).assert().success();
    ws.trk_cmd().args(["user", "add", "Noor"]).assert().success();
    ws.trk_cmd()
        .args([
            "project",
            "add",
            "Dashboard",
            "--start",
            &days_from_now(-10),
            "--end",
            &days_from_now(180),
            "--leader",
            "1",
            "--members",
            "2,3",
        ])
        .assert()
        .success();
    ws
}

#[test]
fn one_record_serves_all_recipients() {
    let ws = seeded_workspace();

    let notifications = ws.read_collection("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["recipients"], serde_json::json!([2, 3]));

    // Both recipients see the shared record.
    for user in ["2", "3"] {
        let envelope = ws.trk_json(&["notify", "list", "--user", user]);
        assert_eq!(envelope["data"].as_array().expect("array").len(), 1);
    }
}

#[test]
fn dismissal_is_per_recipient_and_deletes_when_exhausted() {
    let ws = seeded_workspace();

    // First recipient clears; the shared record must survive for the other.
    ws.trk_json(&["notify", "clear", "--user", "2"]);
    let envelope = ws.trk_json(&["notify", "list", "--user", "2"]);
    assert!(envelope["data"].as_array().expect("array").is_empty());

    let notifications = ws.read_collection("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["dismissedBy"], serde_json::json!([2]));

    let envelope = ws.trk_json(&["notify", "list", "--user", "3"]);
    assert_eq!(envelope["data"].as_array().expect("array").len(), 1);

    // Last recipient clears; the record is gone from disk.
    ws.trk_json(&["notify", "clear", "--user", "3"]);
    assert!(ws.read_collection("notifications").is_empty());
}

#[test]
fn notifications_list_newest_first() {
    let ws = seeded_workspace();

    ws.trk_cmd()
        .args([
            "task",
            "add",
            "Second event",
            "--project",
            "1",
            "--start",
            &days_from_now(1),
            "--end",
            &days_from_now(5),
            "--assign",
            "2",
        ])
        .assert()
        .success();

    let envelope = ws.trk_json(&["notify", "list", "--user", "2"]);
    let notes = envelope["data"].as_array().expect("array");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["type"], "task");
    assert_eq!(notes[1]["type"], "project");
}

#[test]
fn ticket_lifecycle_notifies_the_submitter() {
    let ws = seeded_workspace();

    ws.trk_cmd()
        .args([
            "ticket",
            "add",
            "Export broken",
            "--description",
            "CSV export 500s",
            "--priority",
            "high",
            "--actor",
            "2",
        ])
        .assert()
        .success();

    ws.trk_cmd()
        .args(["ticket", "status", "1", "resolved"])
        .assert()
        .success();

    let envelope = ws.trk_json(&["notify", "list", "--user", "2"]);
    let notes = envelope["data"].as_array().expect("array");
    let supports: Vec<_> = notes.iter().filter(|n| n["type"] == "support").collect();
    assert_eq!(supports.len(), 2); // filed + resolved

    let envelope = ws.trk_json(&["ticket", "list"]);
    assert_eq!(envelope["data"][0]["status"], "resolved");
}

#[test]
fn clear_defaults_to_the_acting_user() {
    let ws = seeded_workspace();

    ws.trk_cmd()
        .args(["notify", "clear", "--actor", "3"])
        .assert()
        .success();

    let notifications = ws.read_collection("notifications");
    assert_eq!(notifications[0]["dismissedBy"], serde_json::json!([3]));
}
