#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trak(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trak").unwrap();
    cmd.current_dir(dir.path()).env("TRAK_ROOT", dir.path());
    cmd
}

const ADMIN: &str = "admin@example.com";

fn init_workspace(dir: &TempDir) {
    trak(dir).arg("init").assert().success();
}

/// Register an approved user via admin, returning nothing; ids are
/// sequential (admin is 1).
fn add_user(dir: &TempDir, name: &str, email: &str, role: &str, team: Option<u32>) {
    let mut cmd = trak(dir);
    cmd.args([
        "user", "register", "--name", name, "--email", email, "--password", "pw", "--role", role,
    ]);
    if let Some(team) = team {
        cmd.args(["--team", &team.to_string()]);
    }
    cmd.assert().success();
}

// ---------------------------------------------------------------------------
// trak init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_workspace_tree() {
    let dir = TempDir::new().unwrap();
    trak(&dir).arg("init").assert().success();

    assert!(dir.path().join(".trak").is_dir());
    assert!(dir.path().join(".trak/config.yaml").exists());
    assert!(dir.path().join(".trak/users").is_dir());
    assert!(dir.path().join(".trak/teams").is_dir());
    assert!(dir.path().join(".trak/projects").is_dir());
    assert!(dir.path().join(".trak/tickets").is_dir());
    assert!(dir.path().join(".trak/notifications").is_dir());
    // The seeded admin account
    assert!(dir.path().join(".trak/users/1.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    trak(&dir).arg("init").assert().success();
    trak(&dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// Registration and approval
// ---------------------------------------------------------------------------

#[test]
fn register_approve_flow() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    trak(&dir)
        .args(["team", "create", "alpha", "--manager", "1", "--as", ADMIN])
        .assert()
        .success();

    add_user(&dir, "Bob", "bob@example.com", "developer", Some(1));

    // Bob cannot act while pending.
    trak(&dir)
        .args(["board", "--as", "bob@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pending approval"));

    // Admin sees and approves the registration.
    trak(&dir)
        .args(["user", "pending", "1", "--as", ADMIN])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob@example.com"));

    trak(&dir)
        .args(["user", "approve", "1", "2", "--as", ADMIN])
        .assert()
        .success();

    trak(&dir)
        .args(["board", "--as", "bob@example.com"])
        .assert()
        .success();

    // Approval left Bob a notification.
    trak(&dir)
        .args(["notifications", "list", "--as", "bob@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"));
}

#[test]
fn developer_cannot_approve() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    trak(&dir)
        .args(["team", "create", "alpha", "--manager", "1", "--as", ADMIN])
        .assert()
        .success();
    add_user(&dir, "Bob", "bob@example.com", "developer", Some(1));
    trak(&dir)
        .args(["user", "approve", "1", "2", "--as", ADMIN])
        .assert()
        .success();
    add_user(&dir, "Eve", "eve@example.com", "developer", Some(1));

    trak(&dir)
        .args(["user", "approve", "1", "3", "--as", "bob@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permission denied"));
}

#[test]
fn admin_registration_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    trak(&dir)
        .args([
            "user",
            "register",
            "--name",
            "Mallory",
            "--email",
            "mallory@example.com",
            "--password",
            "pw",
            "--role",
            "admin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot self-register"));
}

// ---------------------------------------------------------------------------
// Tickets and the board
// ---------------------------------------------------------------------------

#[test]
fn ticket_lifecycle_through_the_engine() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    add_user(&dir, "Carl", "carl@example.com", "manager", None);
    trak(&dir)
        .args(["team", "create", "alpha", "--manager", "2", "--member", "2", "--as", ADMIN])
        .assert()
        .success();
    // Carl registered team-less; team create moved him in. Approve via team.
    trak(&dir)
        .args(["user", "approve", "1", "2", "--as", ADMIN])
        .assert()
        .success();
    add_user(&dir, "Bob", "bob@example.com", "developer", Some(1));
    trak(&dir)
        .args(["user", "approve", "1", "3", "--as", ADMIN])
        .assert()
        .success();

    trak(&dir)
        .args([
            "project", "create", "Apollo", "--team", "1", "--lead", "2", "--as", ADMIN,
        ])
        .assert()
        .success();

    // Carl assigns Bob a ticket in the project.
    trak(&dir)
        .args([
            "ticket",
            "create",
            "--title",
            "Fix login",
            "--kind",
            "bug",
            "--priority",
            "high",
            "--assignee",
            "3",
            "--project",
            "1",
            "--as",
            "carl@example.com",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login"));

    // Bob (assignee) moves it.
    trak(&dir)
        .args(["ticket", "status", "1", "In Progress", "--as", "bob@example.com"])
        .assert()
        .success();

    // Board shows the ticket for Bob.
    trak(&dir)
        .args(["board", "--as", "bob@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login"));

    // Ticket show is gated: Bob yes, an out-of-team manager no.
    add_user(&dir, "Dana", "dana@example.com", "manager", None);
    trak(&dir)
        .args(["team", "create", "beta", "--manager", "4", "--member", "4", "--as", ADMIN])
        .assert()
        .success();
    trak(&dir)
        .args(["user", "approve", "2", "4", "--as", ADMIN])
        .assert()
        .success();

    trak(&dir)
        .args(["ticket", "show", "1", "--as", "dana@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permission denied"));

    trak(&dir)
        .args(["ticket", "show", "1", "--as", "bob@example.com"])
        .assert()
        .success();

    // Reassign by the assignee, then the old assignee loses the right.
    trak(&dir)
        .args(["ticket", "reassign", "1", "2", "--as", "bob@example.com"])
        .assert()
        .success();
    trak(&dir)
        .args(["ticket", "reassign", "1", "3", "--as", "bob@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permission denied"));
}

#[test]
fn invalid_status_fails() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    trak(&dir)
        .args([
            "ticket", "create", "--title", "T", "--assignee", "1", "--as", ADMIN,
        ])
        .assert()
        .success();

    trak(&dir)
        .args(["ticket", "status", "1", "Cancelled", "--as", ADMIN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ticket status"));
}

#[test]
fn search_and_summary_run_scoped() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    trak(&dir)
        .args([
            "ticket", "create", "--title", "Lunar lander", "--assignee", "1", "--as", ADMIN,
        ])
        .assert()
        .success();

    trak(&dir)
        .args(["search", "lunar", "--as", ADMIN])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lunar lander"));

    trak(&dir)
        .args(["summary", "--as", ADMIN])
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 tickets completed"));
}

#[test]
fn missing_acting_user_is_an_error() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    trak(&dir)
        .arg("board")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--as"));
}
