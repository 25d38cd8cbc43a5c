use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_redis")]
    pub redis_url: String,
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: usize,
}

fn default_data_dir() -> String { "./barangay-data".into() }
fn default_redis() -> String { "redis://localhost:6379".into() }
fn default_redis_prefix() -> String { "barangay".into() }
fn default_admin_username() -> String { "barangay_admin".into() }
fn default_admin_password() -> String { "barangay123".into() }
fn default_admin_name() -> String { "Barangay Admin".into() }
fn default_audit_capacity() -> usize { 200 }
fn default_max_photo_bytes() -> usize { 5 * 1024 * 1024 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            data_dir: default_data_dir(),
            redis_url: default_redis(),
            redis_prefix: default_redis_prefix(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            admin_name: default_admin_name(),
            audit_capacity: default_audit_capacity(),
            max_photo_bytes: default_max_photo_bytes(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("barangay").required(false))
            .add_source(config::Environment::with_prefix("BARANGAY").separator("__"))
            .build()?;
        Self::from_sources(config)
    }

    /// Fails on any value that does not deserialize; nothing is defaulted silently.
    fn from_sources(config: config::Config) -> anyhow::Result<Self> {
        config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))
    }

    pub fn admin_credentials(&self) -> AdminCredentials {
        AdminCredentials {
            username: self.admin_username.clone(),
            password: self.admin_password.clone(),
            name: self.admin_name.clone(),
        }
    }
}

/// The built-in administrator credential pair. Lives outside the User collection.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    pub name: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        AppConfig::default().admin_credentials()
    }
}
