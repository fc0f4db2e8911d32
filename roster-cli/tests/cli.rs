use std::io::Write;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use predicates::str::contains;
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

const TEST_KEY: &str = include_str!("fixtures/test-key.pem");

const ORG: &str = "00000000-0000-0000-0000-0000000000d0";
const CATLOVERS: &str = "00000000-0000-0000-0000-0000000000b1";
const DOGLOVERS: &str = "00000000-0000-0000-0000-0000000000b2";
const ALICE: &str = "00000000-0000-0000-0000-0000000000c1";

fn roster_cmd(home: &Path, server: &MockServer, key_file: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("roster"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .env("ROSTER_ADMIN_EMAIL", "admin@example.com")
        .env("ROSTER_DOMAIN", "example.com")
        .env("ROSTER_CREDENTIALS_FILE", key_file)
        .env("ROSTER_TARGET_URL", server.base_url())
        .env("ROSTER_SESSION_TOKEN", "owner-token")
        .env("ROSTER_CUSTOMER_ID", "my_customer")
        .env("ROSTER_DIRECTORY_URL", server.base_url());
    cmd
}

fn key_file(server: &MockServer) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    let key = json!({
        "type": "service_account",
        "client_email": "sync@roster-test.iam.gserviceaccount.com",
        "private_key_id": "kid-1",
        "private_key": TEST_KEY,
        "token_uri": server.url("/token"),
    });
    file.write_all(key.to_string().as_bytes()).expect("write key");
    file
}

fn group_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "display_name": "",
        "organization_id": ORG,
        "avatar_url": "",
        "quota_allowance": 0
    })
}

/// Alice is in "catlovers" on the target and in "Dog Lovers" in the
/// directory.
fn mock_alice_world(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/organizations");
        then.status(200)
            .json_body(json!([{"id": ORG, "name": "coder", "is_default": true}]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/groups")
            .query_param("organization", ORG);
        then.status(200).json_body(json!([
            group_json(ORG, "Everyone"),
            group_json(CATLOVERS, "catlovers")
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/users");
        then.status(200).json_body(json!({
            "users": [{
                "id": ALICE,
                "username": "alice",
                "email": "alice@example.com",
                "login_type": "oidc"
            }],
            "count": 1
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/groups")
            .query_param("organization", ORG)
            .query_param("has_member", "alice");
        then.status(200).json_body(json!([
            group_json(ORG, "Everyone"),
            group_json(CATLOVERS, "catlovers")
        ]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200)
            .json_body(json!({"access_token": "dir-token", "expires_in": 3600}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/admin/directory/v1/groups")
            .query_param("userKey", "alice@example.com")
            .header("Authorization", "Bearer dir-token");
        then.status(200).json_body(json!({
            "groups": [{"id": "g1", "email": "dog-lovers@example.com", "name": "Dog Lovers"}]
        }));
    });
}

#[test]
fn help_lists_subcommands() {
    Command::new(assert_cmd::cargo::cargo_bin!("roster"))
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("sync"))
        .stdout(contains("users"))
        .stdout(contains("check"));
}

#[test]
fn missing_credentials_file_fails() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let missing = home.path().join("absent.json");

    roster_cmd(home.path(), &server, &missing)
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("failed to load directory credentials"));
}

#[test]
fn sync_without_default_organization_fails() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/organizations");
        then.status(200)
            .json_body(json!([{"id": ORG, "name": "side", "is_default": false}]));
    });

    roster_cmd(home.path(), &server, key.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("default organization not found"));
}

#[test]
fn dry_run_prints_plan_and_mutates_nothing() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    mock_alice_world(&server);
    let create = server.mock(|when, then| {
        when.method(POST).path(format!("/api/v2/organizations/{ORG}/groups"));
        then.status(201).json_body(group_json(DOGLOVERS, "doglovers"));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH);
        then.status(200).json_body(group_json(CATLOVERS, "catlovers"));
    });

    roster_cmd(home.path(), &server, key.path())
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("Would create group: doglovers"))
        .stdout(contains("Group catlovers: 0 added, 1 removed"));

    create.assert_hits(0);
    patch.assert_hits(0);
}

#[test]
fn sync_creates_group_and_patches_memberships() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    mock_alice_world(&server);
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/api/v2/organizations/{ORG}/groups"))
            .json_body(json!({
                "name": "doglovers",
                "display_name": "",
                "avatar_url": "/emojis/1f195.png",
                "quota_allowance": 0
            }));
        then.status(201).json_body(group_json(DOGLOVERS, "doglovers"));
    });
    let remove = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/api/v2/groups/{CATLOVERS}"))
            .json_body(json!({"add_users": [], "remove_users": [ALICE]}));
        then.status(200).json_body(group_json(CATLOVERS, "catlovers"));
    });
    let add = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/api/v2/groups/{DOGLOVERS}"))
            .json_body(json!({"add_users": [ALICE], "remove_users": []}));
        then.status(200).json_body(group_json(DOGLOVERS, "doglovers"));
    });

    roster_cmd(home.path(), &server, key.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("changes applied"))
        .stdout(contains(format!("Created group: doglovers :: {DOGLOVERS}")))
        .stdout(contains("Added: [alice@example.com]"));

    create.assert();
    remove.assert();
    add.assert();
}

#[test]
fn users_lists_directory_accounts() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "dir-token"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/admin/directory/v1/users")
            .query_param("customer", "my_customer");
        then.status(200).json_body(json!({
            "users": [
                {"id": "u1", "primaryEmail": "alice@example.com", "name": {"fullName": "Alice Liddell"}},
                {"id": "u2", "primaryEmail": "bob@example.com", "suspended": true}
            ]
        }));
    });

    roster_cmd(home.path(), &server, key.path())
        .arg("users")
        .assert()
        .success()
        .stdout(contains("alice@example.com  Alice Liddell"))
        .stdout(contains("bob@example.com"))
        .stdout(contains("2 users"));
}

#[test]
fn check_verifies_both_systems() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/users/me")
            .header("Coder-Session-Token", "owner-token");
        then.status(200).json_body(json!({
            "id": ALICE,
            "username": "owner",
            "email": "owner@example.com",
            "login_type": "password"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/organizations");
        then.status(200)
            .json_body(json!([{"id": ORG, "name": "coder", "is_default": true}]));
    });
    let token = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "dir-token"}));
    });

    roster_cmd(home.path(), &server, key.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("signed in as owner"))
        .stdout(contains(format!("default organization coder ({ORG})")))
        .stdout(contains("directory: authenticated as admin@example.com"));

    token.assert();
}

#[test]
fn check_fails_on_rejected_session_token() {
    let home = TempDir::new().expect("home");
    let server = MockServer::start();
    let key = key_file(&server);
    server.mock(|when, then| {
        when.method(GET).path("/api/v2/users/me");
        then.status(401)
            .json_body(json!({"message": "You must be logged in."}));
    });

    roster_cmd(home.path(), &server, key.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("cannot authenticate to"));
}
