use std::{
    fs, io,
    sync::{Arc, Mutex},
    time::Duration,
};

use cartes_config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader, EnvConfig,
};
use tempfile::tempdir;

const FULL_CONFIG: &str = r#"
dev_mode = false

[server]
host = "127.0.0.1"
port = 4100

[database]
url = "postgres://cartes:cartes@db:5432/cartes"
max_connections = 4
acquire_timeout = "2s"
run_migrations = true

[auth]
password_pepper = "0123456789abcdef0123456789abcdef-pepper"
token_secret = "0123456789abcdef0123456789abcdef-secret"
token_ttl = "30m"

[catalog]
default_page_size = 20
max_page_size = 200

[cors]
allowed_origins = ["http://localhost:5173"]
"#;

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn config_file_load_is_logged() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(&path, FULL_CONFIG).expect("write config");

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        ConfigLoader::new()
            .with_config_path(&path)
            .load_with_env(EnvConfig::default())
            .expect("load config");
    });

    let output = logs.contents();
    assert!(output.contains("loaded configuration file"), "{output}");
    assert!(output.contains("cartes.toml"), "{output}");
}

#[test]
fn reads_every_section_from_toml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(&path, FULL_CONFIG).expect("write config");

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .expect("load");
    let config = load.config;

    assert_eq!(config.server.bind_address(), "127.0.0.1:4100");
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.database.acquire_timeout, Duration::from_secs(2));
    assert!(config.database.run_migrations);
    assert_eq!(config.auth.token_ttl, Duration::from_secs(30 * 60));
    assert_eq!(config.catalog.default_page_size, 20);
    assert_eq!(config.catalog.max_page_size, 200);
    assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
    assert!(load.warnings.is_empty(), "{:?}", load.warnings);
}

#[test]
fn environment_wins_over_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(&path, FULL_CONFIG).expect("write config");

    let env = EnvConfig {
        server_port: Some(5000),
        catalog_max_page_size: Some(50),
        ..EnvConfig::default()
    };
    let config = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .expect("load")
        .config;

    assert_eq!(config.server.port, 5000);
    assert_eq!(config.catalog.max_page_size, 50);
    assert_eq!(config.catalog.default_page_size, 20);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");

    let err = ConfigLoader::new()
        .with_config_path(&missing)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::MissingConfig { path } if path == missing
    ));
}

#[test]
fn malformed_toml_reports_the_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(&path, "[server\nport = ").expect("write config");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
    assert!(err.to_string().contains("cartes.toml"));
}

#[test]
fn wildcard_cors_requires_dev_mode() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(
        &path,
        FULL_CONFIG.replace(r#"["http://localhost:5173"]"#, r#"["*"]"#),
    )
    .expect("write config");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::DangerousCorsWildcard)
    ));

    let env = EnvConfig {
        dev_mode: Some(true),
        ..EnvConfig::default()
    };
    ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(env)
        .expect("dev mode accepts wildcard");
}

#[test]
fn default_page_size_above_max_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(
        &path,
        FULL_CONFIG.replace("max_page_size = 200", "max_page_size = 10"),
    )
    .expect("write config");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidPageSizes { .. }
        )
    ));
}

#[test]
fn unknown_sections_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cartes.toml");
    fs::write(&path, format!("{FULL_CONFIG}\n[redis]\nurl = \"redis://x\"\n"))
        .expect("write config");

    assert!(matches!(
        ConfigLoader::new()
            .with_config_path(&path)
            .load_with_env(EnvConfig::default()),
        Err(ConfigLoadError::Parse { .. })
    ));
}
