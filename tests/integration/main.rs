//! Integration tests for keeper-mobile

mod support;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use keeper_mobile::storage::LAST_TOPIC_KEY;
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated to a temporary config and state directory
    fn keeper(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("keeper-mobile");
        cmd.env("KEEPER_MOBILE_CONFIG", home.path().join("config.toml"))
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path().join("config"))
            .env("XDG_STATE_HOME", home.path().join("state"))
            .env("CI", "1");
        cmd
    }

    fn storage_file(home: &TempDir) -> std::path::PathBuf {
        home.path()
            .join("state")
            .join("keeper-mobile")
            .join("storage.json")
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Keeper Mobile signer provider"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("keeper-mobile"));
    }

    #[test]
    fn config_path_uses_override() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                home.path().join("config.toml").display().to_string(),
            ));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[network]"))
            .stdout(predicate::str::contains("network_byte = 87"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .args(["config", "set", "network.network_byte", "T"])
            .assert()
            .success();

        keeper(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("network_byte = 84"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .args(["config", "set", "vm.memory", "4"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.toml"), "[network\n").unwrap();

        keeper(&home)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("config.toml"));
    }

    #[test]
    fn status_without_session() {
        let home = TempDir::new().unwrap();
        keeper(&home)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("waves:W"))
            .stdout(predicate::str::contains("Last topic: none"));
    }

    #[test]
    fn status_shows_persisted_topic() {
        let home = TempDir::new().unwrap();
        let storage = storage_file(&home);
        std::fs::create_dir_all(storage.parent().unwrap()).unwrap();
        let items = serde_json::json!({ LAST_TOPIC_KEY: "abc123" });
        std::fs::write(&storage, items.to_string()).unwrap();

        keeper(&home)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("abc123"));
    }

    #[test]
    fn forget_removes_persisted_topic() {
        let home = TempDir::new().unwrap();
        let storage = storage_file(&home);
        std::fs::create_dir_all(storage.parent().unwrap()).unwrap();
        let items = serde_json::json!({ LAST_TOPIC_KEY: "abc123" });
        std::fs::write(&storage, items.to_string()).unwrap();

        keeper(&home)
            .args(["forget", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("forgotten"));

        let items: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&storage).unwrap()).unwrap();
        assert!(items.get(LAST_TOPIC_KEY).is_none());
    }
}
