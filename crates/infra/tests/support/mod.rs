#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use extraction_domain::{AccountCredentials, AuthConfig, Config};
use extraction_infra::database::DbManager;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ACCOUNT: &str = "reporting";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    pub path: PathBuf,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), path, _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration pointing the token endpoint at `server_uri` with a single
/// configured account.
pub fn pipeline_config(server_uri: &str, db: &TestDatabase) -> Config {
    let mut accounts = HashMap::new();
    accounts.insert(
        ACCOUNT.to_string(),
        AccountCredentials { username: "svc".into(), password: "pw".into() },
    );

    let mut config = Config::default();
    config.database.path = db.path.display().to_string();
    config.http.timeout_secs = 5;
    config.auth = AuthConfig {
        token_url: format!("{server_uri}/token"),
        token_lifetime_secs: 900,
        accounts,
    };
    config
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({"access_token": access, "refresh_token": refresh, "expires_in": 1200})
}
