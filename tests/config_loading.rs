// tests/config_loading.rs

use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;

use dirmon::config::{load_and_validate, load_from_path, ConfigFile};
use dirmon::errors::MonitorError;
use dirmon::MonitorOptions;
use dirmon_test_utils::builders::{ConfigFileBuilder, EntryConfigBuilder};

type TestResult = Result<()>;

fn write_config(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn loads_full_config() -> TestResult {
    let file = write_config(
        r#"
[monitor]
capacity = 8
max_dir_len = 64
timeout_ms = 1500

[[entry]]
name = "style"
files = ["hss/style.hss"]

[[entry]]
name = "light"
files = ["hss/light.hss", "hss/subs/_vars.hss"]
cmd = "hss -output css hss/light.hss"
"#,
    )?;

    let cfg = load_and_validate(file.path())?;

    assert_eq!(
        cfg.monitor_options(),
        MonitorOptions {
            capacity: 8,
            max_dir_len: 64
        }
    );
    assert_eq!(cfg.monitor.timeout_ms, Some(1500));
    assert_eq!(cfg.entries.len(), 2);
    assert_eq!(cfg.entries[1].primary(), "hss/light.hss");
    assert_eq!(cfg.entries[1].label(), "light");
    assert_eq!(
        cfg.entries[1].cmd.as_deref(),
        Some("hss -output css hss/light.hss")
    );
    assert_eq!(
        cfg.entry_files(),
        vec![
            vec!["hss/style.hss".to_string()],
            vec!["hss/light.hss".to_string(), "hss/subs/_vars.hss".to_string()],
        ]
    );
    Ok(())
}

#[test]
fn monitor_section_defaults_apply() -> TestResult {
    let file = write_config("[[entry]]\nfiles = [\"a.txt\"]\n")?;

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.monitor_options(), MonitorOptions::default());
    assert_eq!(cfg.monitor.timeout_ms, None);
    assert_eq!(cfg.entries[0].label(), "a.txt");
    Ok(())
}

#[test]
fn unnamed_entries_may_share_a_primary() -> TestResult {
    let file = write_config(
        r#"
[[entry]]
files = ["a.txt"]

[[entry]]
files = ["a.txt", "b.txt"]
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.entries.len(), 2);
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/Dirmon.toml").unwrap_err();
    assert!(matches!(err, MonitorError::IoError(_)));
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let file = write_config("[[entry]\nfiles = [\"a.txt\"]\n")?;

    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, MonitorError::TomlError(_)));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_after_parsing() -> TestResult {
    let file = write_config("[monitor]\nmax_dir_len = 0\n\n[[entry]]\nfiles = [\"a.txt\"]\n")?;

    // Parsing alone accepts it.
    let raw = load_from_path(file.path())?;
    assert_eq!(raw.monitor.max_dir_len, 0);

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, MonitorError::ConfigError(msg) if msg.contains("max_dir_len")));
    Ok(())
}

#[test]
fn builder_produces_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .with_capacity(4)
        .with_max_dir_len(64)
        .with_timeout_ms(250)
        .with_entry(
            EntryConfigBuilder::new("src/main.scss")
                .name("main")
                .depends_on("src/_vars.scss")
                .cmd("sass src/main.scss out/main.css")
                .build(),
        )
        .build();

    assert_eq!(
        cfg.monitor_options(),
        MonitorOptions {
            capacity: 4,
            max_dir_len: 64
        }
    );
    assert_eq!(cfg.monitor.timeout_ms, Some(250));
    assert_eq!(cfg.entries[0].files.len(), 2);
}

#[test]
fn builder_raw_config_fails_validation_without_entries() {
    let raw = ConfigFileBuilder::new().raw();
    assert!(ConfigFile::try_from(raw).is_err());
}
