use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn refile() -> Command {
    let mut cmd = Command::cargo_bin("refile").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_command() {
    refile()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PATTERN|TABLE"));
}

#[test]
fn test_version_command() {
    refile()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refile"));
}

#[test]
fn test_missing_args_touch_nothing() {
    let temp = TempDir::new().unwrap();
    temp.child("only_file.html").write_str("only_file").unwrap();

    refile()
        .arg(temp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));

    refile().assert().failure().code(2);

    temp.child("only_file.html").assert("only_file");
}

#[test]
fn test_single_pattern_mode() {
    let temp = TempDir::new().unwrap();
    temp.child("a/ITEM_G001.html")
        .write_str("<a href=\"ITEM_G002.html\">ITEM_G001</a>")
        .unwrap();
    temp.child("a/ITEM_G002.html").write_str("").unwrap();

    refile()
        .arg(temp.path())
        .arg(r"(ITEM)_G(0\d{2})")
        .arg("$1_G1$2")
        .assert()
        .success()
        .stdout(predicate::str::contains("replaced in"))
        .stdout(predicate::str::contains("ITEM_G1001.html"))
        .stdout(predicate::str::contains("✓ Moved 2 of 2 files"));

    temp.child("a/ITEM_G001.html").assert(predicate::path::missing());
    temp.child("a/ITEM_G1001.html")
        .assert("<a href=\"ITEM_G1002.html\">ITEM_G1001</a>");
    temp.child("a/ITEM_G1002.html").assert(predicate::path::exists());
}

#[test]
fn test_batch_mode_logs_each_row() {
    let site = TempDir::new().unwrap();
    let tables = TempDir::new().unwrap();
    site.child("page_A.html").write_str("page_A").unwrap();
    tables
        .child("renames.csv")
        .write_str("page_A,page_B\npage_B,page_C\n")
        .unwrap();

    refile()
        .arg(site.path())
        .arg(tables.child("renames.csv").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("page_A -> page_B"))
        .stdout(predicate::str::contains("page_B -> page_C"))
        .stdout(predicate::str::contains("Pattern"));

    site.child("page_C.html").assert("page_C");
    site.child("page_A.html").assert(predicate::path::missing());
}

#[test]
fn test_batch_mode_with_delimiter() {
    let site = TempDir::new().unwrap();
    let tables = TempDir::new().unwrap();
    site.child("one_item.txt").write_str("").unwrap();
    tables
        .child("renames.tsv")
        .write_str("one_item\ttwo_item\n")
        .unwrap();

    refile()
        .arg(site.path())
        .arg(tables.child("renames.tsv").path())
        .args(["--delimiter", "\t", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    site.child("two_item.txt").assert(predicate::path::exists());
}

#[test]
fn test_json_output() {
    let temp = TempDir::new().unwrap();
    temp.child("draft_post.html").write_str("draft_post").unwrap();

    let output = refile()
        .arg(temp.path())
        .args(["draft_post", "final_post", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["operation"], "single");
    assert_eq!(value["summary"]["files_moved"], 1);
    assert_eq!(value["summary"]["documents_rewritten"], 1);
}

#[test]
fn test_ext_flag_selects_documents() {
    let temp = TempDir::new().unwrap();
    temp.child("notes_old.md").write_str("notes_old").unwrap();
    temp.child("index.html").write_str("notes_old").unwrap();

    refile()
        .arg(temp.path())
        .args(["notes_old", "notes_new", "--ext", "md"])
        .assert()
        .success();

    temp.child("notes_new.md").assert("notes_new");
    temp.child("index.html").assert("notes_old");
}

#[test]
fn test_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();

    refile()
        .arg(temp.child("missing").path())
        .args(["a_1", "b_1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Root directory does not exist"));
}

#[test]
fn test_invalid_pattern_is_fatal() {
    let temp = TempDir::new().unwrap();
    temp.child("keep_me.html").write_str("").unwrap();

    refile()
        .arg(temp.path())
        .args(["(unclosed", "x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid pattern"));

    temp.child("keep_me.html").assert(predicate::path::exists());
}

#[test]
fn test_missing_table_is_fatal() {
    let temp = TempDir::new().unwrap();

    refile()
        .arg(temp.path())
        .arg(temp.child("no_such_table.csv").path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no_such_table.csv"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    temp.child("guide_old.htm").write_str("guide_old").unwrap();
    config
        .child("config.toml")
        .write_str("[defaults]\ntext_extensions = [\"htm\"]\n")
        .unwrap();

    refile()
        .arg(temp.path())
        .args(["guide_old", "guide_new", "--config"])
        .arg(config.child("config.toml").path())
        .assert()
        .success();

    temp.child("guide_new.htm").assert("guide_new");
}

#[test]
fn test_log_file_records_changes() {
    let temp = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    temp.child("entry_old.txt").write_str("").unwrap();

    refile()
        .arg(temp.path())
        .args(["entry_old", "entry_new", "--quiet", "--log-file"])
        .arg(logs.child("refile.log").path())
        .assert()
        .success();

    logs.child("refile.log").assert(
        predicate::str::contains("INFO").and(predicate::str::contains("entry_new.txt")),
    );
}

#[cfg(unix)]
#[test]
fn test_strict_exit_code() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    temp.child("locked/item_old.txt").write_str("").unwrap();
    temp.child("item_old.txt").write_str("").unwrap();

    let locked = temp.child("locked");
    fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(locked.path()).is_ok() {
        // Permission bits are not enforced for this user (e.g. root).
        fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let lenient = refile()
        .arg(temp.path())
        .args(["item_old", "item_new"])
        .output()
        .unwrap();
    let strict = refile()
        .arg(temp.path())
        .args(["item_new", "item_newer", "--strict"])
        .output()
        .unwrap();
    fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(lenient.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&lenient.stderr).contains("Error: failed to list directory"));
    assert_eq!(strict.status.code(), Some(3));
    temp.child("item_newer.txt").assert(predicate::path::exists());
}

#[test]
fn test_strict_without_errors_succeeds() {
    let temp = TempDir::new().unwrap();
    temp.child("fine_old.txt").write_str("").unwrap();

    refile()
        .arg(temp.path())
        .args(["fine_old", "fine_new", "--strict"])
        .assert()
        .success();
}

#[test]
fn test_emptied_root_and_keep_root_flag() {
    let temp = TempDir::new().unwrap();
    temp.child("old_site/page.html").write_str("").unwrap();
    temp.child("old_copy/page.html").write_str("").unwrap();

    refile()
        .arg(temp.child("old_site").path())
        .args(["old_site", "new_site"])
        .assert()
        .success();
    refile()
        .arg(temp.child("old_copy").path())
        .args(["old_copy", "new_copy", "--keep-root"])
        .assert()
        .success();

    temp.child("new_site/page.html").assert(predicate::path::exists());
    temp.child("old_site").assert(predicate::path::missing());
    temp.child("new_copy/page.html").assert(predicate::path::exists());
    temp.child("old_copy").assert(predicate::path::is_dir());
}

#[test]
fn test_strict_exit_code_for_per_file_error() {
    let temp = TempDir::new().unwrap();
    temp.child("erase_me.txt").write_str("").unwrap();
    temp.child("other_file.txt").write_str("").unwrap();

    refile()
        .arg(temp.path())
        .args([r"erase_me\.txt", ""])
        .assert()
        .success()
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("empty file name")));

    refile()
        .arg(temp.path())
        .args([r"erase_me\.txt", "", "--strict"])
        .assert()
        .failure()
        .code(3);

    temp.child("erase_me.txt").assert(predicate::path::exists());
    temp.child("other_file.txt").assert(predicate::path::exists());
}
