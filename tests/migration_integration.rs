//! Integration tests for a full migration run
//!
//! Builds a small Unity-like project in a temp dir and checks enumeration,
//! rewriting, backups, error isolation and idempotency end to end.

use mirror_migrate::{
    enumerate, load_from_str, migrate_files, Migration, MigrationError, ProcessOptions,
    ScanOptions,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PLAYER: &str = r#"using UnityEngine;
using UnityEngine.Networking;

[NetworkSettings(channel = 1, sendInterval = 0.05f)]
public class Player : NetworkBehaviour
{
    [SyncVar] public NetworkInstanceId target;

    [Command(channel = Channels.DefaultUnreliable)]
    void CmdMove(Vector3 pos) {}

    [TargetRpc]
    void TargetRespawn(NetworkConnection conn) {}
}
"#;

const PLAYER_MIGRATED: &str = r#"using UnityEngine;
using Mirror;

[NetworkSettings(sendInterval = 0.05f)]
public class Player : NetworkBehaviour
{
    [SyncVar] public uint target;

    [Command]
    void CmdMove(Vector3 pos) {}

    [TargetRpc]
    void TargetRespawn(NetworkConnection conn) {}
}
"#;

const DOWNLOADER: &str = r#"using UnityEngine;
using UnityEngine.Networking;

[NetworkSettings(channel = 2)]
public class Downloader : NetworkBehaviour
{
    IEnumerator Fetch()
    {
        using (UnityWebRequest req = UnityWebRequest.Get(url)) { yield return req.SendWebRequest(); }
    }
}
"#;

const DOWNLOADER_MIGRATED: &str = r#"using UnityEngine;
using Mirror;
using UnityWebRequest = UnityEngine.Networking.UnityWebRequest;


public class Downloader : NetworkBehaviour
{
    IEnumerator Fetch()
    {
        using (UnityWebRequest req = UnityWebRequest.Get(url)) { yield return req.SendWebRequest(); }
    }
}
"#;

const CLEAN: &str = "using Mirror;\n\npublic class Door : NetworkBehaviour {}\n";

/// Helper to lay out a project: three scripts to consider, two non-script
/// files, and vendored Mirror sources that must never be touched.
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "Scripts/Player.cs", PLAYER);
    write(root, "Scripts/Net/Downloader.cs", DOWNLOADER);
    write(root, "Scripts/Door.cs", CLEAN);
    write(root, "Scripts/Player.cs.meta", "guid: 1234");
    write(root, "Notes.txt", "using UnityEngine.Networking;");
    write(root, "Mirror/Runtime/NetworkServer.cs", PLAYER);

    dir
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn test_enumerate_matches_only_project_scripts() {
    let project = setup_project();

    let mut files = enumerate(project.path(), &ScanOptions::default()).unwrap();
    files.sort();

    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|f| f.extension().unwrap() == "cs"));
    assert!(files.iter().all(|f| !f.components().any(|c| c.as_os_str() == "Mirror")));
}

#[test]
fn test_migrate_project() {
    let project = setup_project();
    let root = project.path();

    let report = Migration::new(ProcessOptions::default()).run(root).unwrap();

    assert_eq!(report.files_found, 3);
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.files_changed, 2);
    assert!(report.errors.is_empty());

    assert_eq!(read(root, "Scripts/Player.cs"), PLAYER_MIGRATED);
    assert_eq!(read(root, "Scripts/Net/Downloader.cs"), DOWNLOADER_MIGRATED);
    assert_eq!(read(root, "Scripts/Door.cs"), CLEAN);

    // Vendored and non-script files are left alone
    assert_eq!(read(root, "Mirror/Runtime/NetworkServer.cs"), PLAYER);
    assert_eq!(read(root, "Notes.txt"), "using UnityEngine.Networking;");
}

#[test]
fn test_second_run_changes_nothing() {
    let project = setup_project();
    let migration = Migration::new(ProcessOptions::default());

    migration.run(project.path()).unwrap();
    let player = read(project.path(), "Scripts/Player.cs");
    let downloader = read(project.path(), "Scripts/Net/Downloader.cs");

    let report = migration.run(project.path()).unwrap();

    assert_eq!(report.files_processed, 3);
    assert_eq!(report.files_changed, 0);
    assert_eq!(read(project.path(), "Scripts/Player.cs"), player);
    assert_eq!(read(project.path(), "Scripts/Net/Downloader.cs"), downloader);
}

#[test]
fn test_backups_are_created_once() {
    let project = setup_project();
    let root = project.path();
    let migration = Migration::new(ProcessOptions {
        backup: true,
        dry_run: false,
    });

    migration.run(root).unwrap();

    assert_eq!(read(root, "Scripts/Player.cs.bak"), PLAYER);
    assert_eq!(read(root, "Scripts/Door.cs.bak"), CLEAN);
    assert!(!root.join("Mirror/Runtime/NetworkServer.cs.bak").exists());

    // Re-running on migrated content must not replace the pristine backup
    migration.run(root).unwrap();
    assert_eq!(read(root, "Scripts/Player.cs.bak"), PLAYER);
}

#[test]
fn test_one_bad_file_does_not_stop_the_batch() {
    let project = setup_project();
    let root = project.path();
    fs::write(root.join("Scripts/Broken.cs"), [0xC3u8, 0x28, 0xA0, 0xA1]).unwrap();

    let report = Migration::new(ProcessOptions::default()).run(root).unwrap();

    assert_eq!(report.files_found, 4);
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.files_changed, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, root.join("Scripts/Broken.cs"));
    assert_eq!(read(root, "Scripts/Player.cs"), PLAYER_MIGRATED);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let project = setup_project();
    let root = project.path();

    let report = Migration::new(ProcessOptions {
        backup: true,
        dry_run: true,
    })
    .run(root)
    .unwrap();

    assert_eq!(report.files_changed, 2);
    assert_eq!(read(root, "Scripts/Player.cs"), PLAYER);
    assert!(!root.join("Scripts/Player.cs.bak").exists());
}

#[test]
fn test_explicit_file_list() {
    let project = setup_project();
    let root = project.path();
    let files = vec![
        root.join("Scripts/Player.cs"),
        root.join("Scripts/DoesNotExist.cs"),
    ];

    let report = migrate_files(&files, false);

    assert_eq!(report.files_found, 2);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_changed, 1);
    assert_eq!(report.errors.len(), 1);
    // Only the listed file was touched
    assert_eq!(read(root, "Scripts/Net/Downloader.cs"), DOWNLOADER);
}

#[test]
fn test_invalid_config_rule_touches_no_file() {
    let project = setup_project();
    let config = load_from_str(
        r#"
[[rules]]
name = "command-attribute"
pattern = "Cmd"
replacement = "Command"
"#,
    )
    .unwrap();

    let result = Migration::from_config(&config, ProcessOptions::default());

    assert!(matches!(result, Err(MigrationError::Rules(_))));
    assert_eq!(read(project.path(), "Scripts/Player.cs"), PLAYER);
}

#[test]
fn test_config_scan_options() {
    let project = setup_project();
    let root = project.path();
    write(root, "ThirdParty/Lib.cs", PLAYER);
    let config = load_from_str(
        r#"
[scan]
exclude = ["Mirror", "ThirdParty"]
"#,
    )
    .unwrap();

    let migration = Migration::from_config(&config, ProcessOptions::default()).unwrap();
    let report = migration.run(root).unwrap();

    assert_eq!(report.files_found, 3);
    assert_eq!(read(root, "ThirdParty/Lib.cs"), PLAYER);
}
