// SPDX-License-Identifier: MIT

use super::*;
use std::io::Write;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const TWO_TARGETS: &str = r#"
[[target]]
nick = "test"
path = "/home/minecraft/test"
jar = "test-server.jar"
start_script = "ServerStart.sh"
enable_chatlog = true
enable_responsiveness_check = true
enable_automated_restarts = true
start_at_launch = true
multi_user = true
authorised_accounts = ["anedaar", "jeronimokant"]
host = "localhost"
port = 25595
startup_grace_seconds = 30
restart_period_seconds = 120

[[target]]
nick = "skies"
path = "/home/minecraft/skies"
jar = "skies-server.jar"
start_script = "ServerStart.sh"
enable_chatlog = false
enable_responsiveness_check = true
enable_automated_restarts = true
start_at_launch = false
host = "localhost"
port = 25575
startup_grace_seconds = 120
restart_period_seconds = 43200
"#;

#[test]
fn loads_multiple_targets_with_defaults() {
    let file = write_temp(TWO_TARGETS);
    let targets = load(file.path()).unwrap();

    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].nick.as_str(), "test");
    assert_eq!(targets[0].authorised_accounts, vec!["anedaar", "jeronimokant"]);
    assert!(!targets[1].multi_user);
    assert!(targets[1].authorised_accounts.is_empty());
    assert_eq!(targets[1].restart_period, Duration::from_secs(43200));
}

#[test]
fn rejects_duplicate_nick() {
    let contents = format!(
        "{TWO_TARGETS}\n[[target]]\nnick = \"test\"\npath = \"/x\"\njar = \"other.jar\"\nstart_script = \"s.sh\"\nenable_chatlog = false\nenable_responsiveness_check = false\nenable_automated_restarts = false\nstart_at_launch = false\nhost = \"localhost\"\nport = 1\nstartup_grace_seconds = 1\nrestart_period_seconds = 1\n"
    );
    let file = write_temp(&contents);
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateNick(nick) if nick == "test"));
}

#[test]
fn rejects_duplicate_jar() {
    let contents = format!(
        "{TWO_TARGETS}\n[[target]]\nnick = \"third\"\npath = \"/x\"\njar = \"test-server.jar\"\nstart_script = \"s.sh\"\nenable_chatlog = false\nenable_responsiveness_check = false\nenable_automated_restarts = false\nstart_at_launch = false\nhost = \"localhost\"\nport = 1\nstartup_grace_seconds = 1\nrestart_period_seconds = 1\n"
    );
    let file = write_temp(&contents);
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateJar(jar) if jar == "test-server.jar"));
}

#[test]
fn rejects_malformed_toml() {
    let file = write_temp("this is not [[ valid toml");
    assert!(matches!(load(file.path()), Err(ConfigError::Parse { .. })));
}

#[test]
fn rejects_missing_required_field() {
    let file = write_temp("[[target]]\nnick = \"test\"\n");
    assert!(matches!(load(file.path()), Err(ConfigError::Parse { .. })));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load(Path::new("/nonexistent/path/mcsup.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
