use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const SUMMARY: &str = r#"{
    "client": { "isLocal": true, "ip": "192.168.1.20" },
    "server": { "hostname": "homelab", "uptimeSec": 93784, "time": "2024-05-01T10:00:00Z",
                "os": "linux", "arch": "amd64", "goVersion": "go1.22.2" }
}"#;

fn homedash() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("homedash"));
    cmd.env_remove("HOMEDASH_CONFIG")
        .env_remove("HOMEDASH_URL")
        .env_remove("HOMEDASH_FORMAT")
        .env_remove("HOMEDASH_DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

/// Config pointing at `base_url` with the asset cache under `dir`
fn write_config(dir: &Path, base_url: &str, assets: &[&str]) -> PathBuf {
    let path = dir.join("config.yaml");
    let mut contents = format!(
        "base_url: {base_url}\nrequest_timeout_ms: 2000\ncache:\n  dir: {}\n  assets:\n",
        dir.join("cache").display()
    );
    for asset in assets {
        contents.push_str(&format!("    - {asset}\n"));
    }
    fs::write(&path, contents).expect("failed to write config");
    path
}

#[test]
fn config_path_uses_custom_location() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("elsewhere.yaml");

    homedash()
        .args(["config", "path", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.yaml"));

    Ok(())
}

#[test]
fn config_show_applies_url_override() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://from-file:8080", &[]);

    homedash()
        .args(["config", "show", "--url", "http://dash.lan:9000", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: http://dash.lan:9000"))
        .stdout(predicate::str::contains("homepage-static"));

    Ok(())
}

#[test]
fn config_init_writes_defaults_once() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");

    homedash()
        .args(["config", "init", "--config"])
        .arg(&config_path)
        .assert()
        .success();
    let saved = fs::read_to_string(&config_path)?;
    assert!(saved.contains("retry_interval_secs: 5"));

    homedash()
        .args(["config", "init", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    Ok(())
}

#[test]
fn invalid_base_url_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "not a url", &[]);

    homedash()
        .args(["status", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("base_url"));

    Ok(())
}

#[test]
fn status_unreachable_backend_exits_nonzero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    // Port 9 (discard) on loopback is not expected to accept HTTP connections
    let config_path = write_config(temp.path(), "http://127.0.0.1:9", &[]);

    homedash()
        .args(["status", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Offline"))
        .stderr(predicate::str::contains("offline"));

    Ok(())
}

#[test]
fn assets_path_and_status_use_configured_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://127.0.0.1:9", &[]);

    homedash()
        .args(["assets", "path", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            temp.path().join("cache").display().to_string(),
        ));

    homedash()
        .args(["assets", "status", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current generation not installed"));

    Ok(())
}

#[test]
fn assets_activate_requires_install() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://127.0.0.1:9", &[]);

    homedash()
        .args(["assets", "activate", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn status_online_shows_server_panel() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _summary = server
        .mock("GET", "/api/summary")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SUMMARY)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url(), &[]);

    homedash()
        .args(["status", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Online"))
        .stdout(predicate::str::contains("homelab"))
        .stdout(predicate::str::contains("1d 2h 3m"))
        .stdout(predicate::str::contains("linux/amd64"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn status_server_error_is_offline() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _summary = server
        .mock("GET", "/api/summary")
        .with_status(500)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url(), &[]);

    homedash()
        .args(["status", "--format", "json", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"state\":\"offline\""))
        .stderr(predicate::str::contains("Server returned error status: 500"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn ip_shows_lan_addresses() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _summary = server
        .mock("GET", "/api/summary")
        .with_status(200)
        .with_body(SUMMARY)
        .create();
    let _ip = server
        .mock("GET", "/api/ip")
        .with_status(200)
        .with_body(
            r#"{"network": {"hostIps": [{"ip": "192.168.1.2", "ptr": "nas.lan"}]},
                "public": {"ip": "203.0.113.9"}}"#,
        )
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url(), &[]);

    homedash()
        .args(["ip", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("LAN IPs"))
        .stdout(predicate::str::contains("192.168.1.2"))
        .stdout(predicate::str::contains("203.0.113.9"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn assets_install_list_and_fetch() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _core = server
        .mock("GET", "/static/js/core.js")
        .with_status(200)
        .with_body("export const core = 1;")
        .create();
    let _missing = server
        .mock("GET", "/static/js/missing.js")
        .with_status(404)
        .create();
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>dashboard</html>")
        .create();

    let temp = tempdir()?;
    let config_path = write_config(
        temp.path(),
        &server.url(),
        &["/static/js/core.js", "/static/js/missing.js"],
    );

    homedash()
        .args(["assets", "install", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 assets cached"))
        .stdout(predicate::str::contains("/static/js/missing.js"));

    homedash()
        .args(["assets", "fetch", "/", "--navigate", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("navigation"));

    homedash()
        .args(["assets", "list", "--format", "json", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("/static/js/core.js"))
        .stdout(predicate::str::contains("\"meta\""));

    Ok(())
}
