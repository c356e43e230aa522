use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_dir(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("declarative_ui_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn file_values_override_defaults() {
    let dir = temp_dir("settings_file");
    let path = dir.join("client.toml");
    fs::write(
        &path,
        "base_url = \"https://cloud.example.com\"\nrequest_timeout_secs = 5\nusername = \"alice\"\n",
    )
    .expect("write settings");

    let settings = load_settings(Some(path.as_path())).expect("load");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.username.as_deref(), Some("alice"));
    assert_eq!(settings.app_password, None);
    assert_eq!(settings.user_agent, ClientSettings::default().user_agent);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = temp_dir("settings_missing");
    let settings = load_settings(Some(dir.join("absent.toml").as_path())).expect("load");
    assert_eq!(settings.request_timeout_secs, 30);
    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn malformed_file_is_an_error() {
    let dir = temp_dir("settings_broken");
    let path = dir.join("client.toml");
    fs::write(&path, "base_url = [").expect("write settings");

    let err = load_settings(Some(path.as_path())).expect_err("broken toml");
    assert!(err.to_string().contains("failed to parse settings file"));

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn env_overrides_win_and_bad_timeout_is_ignored() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("NEXTCLOUD_URL", "https://legacy.example.com"),
        ("APP__BASE_URL", "https://cloud.example.com"),
        ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ("APP__APP_PASSWORD", "secret"),
    ]);
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));

    assert_eq!(settings.base_url, "https://cloud.example.com");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.app_password.as_deref(), Some("secret"));
}

#[test]
fn normalizes_base_urls() {
    assert_eq!(
        normalize_base_url(" cloud.example.com/nextcloud/ ")
            .expect("url")
            .as_str(),
        "https://cloud.example.com/nextcloud"
    );
    assert_eq!(
        normalize_base_url("http://127.0.0.1:8080/").expect("url").as_str(),
        "http://127.0.0.1:8080/"
    );
    assert!(normalize_base_url("ftp://files.example.com").is_err());
    assert!(normalize_base_url("  ").is_err());
}
