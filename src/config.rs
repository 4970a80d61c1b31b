use secstr::SecUtf8;
use serde::{Deserialize, Deserializer};

/// Read from `FOXHOOK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_host")]
    pub phabricator_host: String,
    pub phabricator_username: String,
    #[serde(deserialize_with = "deserialize_secutf8")]
    pub phabricator_certificate: SecUtf8,
    #[serde(deserialize_with = "deserialize_secutf8")]
    pub hipchat_token: SecUtf8,
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub debug: bool,
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}

fn deserialize_secutf8<'de, D>(de: D) -> Result<SecUtf8, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(SecUtf8::from)
}

fn deserialize_host<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| s.trim_end_matches('/').to_owned())
}
