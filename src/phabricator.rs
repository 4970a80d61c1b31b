//! Minimal Conduit client, enough to turn a PHID into a user name.

use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::eyre::{self, WrapErr as _};
use secstr::SecUtf8;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha1::{Digest as _, Sha1};

const CLIENT_NAME: &str = "foxhook";
const CLIENT_VERSION: u32 = 1;

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL without trailing slash, e.g. `https://phabricator.example.org`.
    pub host: String,
    pub username: String,
    pub certificate: SecUtf8,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error_code: Option<String>,
    error_info: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> eyre::Result<T> {
        if let Some(code) = self.error_code {
            eyre::bail!(
                "Conduit returned {}: {}",
                code,
                self.error_info.unwrap_or_default()
            );
        }
        self.result
            .ok_or_else(|| eyre::eyre!("Conduit response has no result"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    #[serde(rename = "sessionKey")]
    session_key: String,
    #[serde(rename = "connectionID")]
    connection_id: u64,
}

#[derive(Debug, Serialize)]
struct ConnectParams<'a> {
    client: &'a str,
    #[serde(rename = "clientVersion")]
    client_version: u32,
    user: &'a str,
    host: &'a str,
    #[serde(rename = "authToken")]
    auth_token: u64,
    #[serde(rename = "authSignature")]
    auth_signature: String,
}

#[derive(Debug, Serialize)]
struct LookupParams<'a> {
    names: [&'a str; 1],
    #[serde(rename = "__conduit__")]
    conduit: &'a Session,
}

fn auth_signature(token: u64, certificate: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(token.to_string().as_bytes());
    hasher.update(certificate.as_bytes());
    hex::encode(hasher.finalize())
}

/// Picks the `name` of `phid` out of a `phid.lookup` result. Conduit sends an
/// empty result as `[]`, which simply has no entry.
fn name_from_lookup(result: &serde_json::Value, phid: &str) -> Option<String> {
    result
        .get(phid)?
        .get("name")?
        .as_str()
        .map(str::to_owned)
}

pub struct Phabricator {
    http: awc::Client,
    config: Config,
}

impl Phabricator {
    pub fn new(config: Config) -> Self {
        Self {
            http: awc::Client::new(),
            config,
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn api_url(&self) -> String {
        format!("{}/api/", self.config.host)
    }

    async fn call<P, T>(&self, method: &str, params: &P, bootstrap: bool) -> eyre::Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let params = serde_json::to_string(params).wrap_err("Failed to encode Conduit params")?;
        let mut form = vec![("params", params.as_str()), ("output", "json")];
        if bootstrap {
            form.push(("__conduit__", "true"));
        }

        let mut resp = self
            .http
            .post(format!("{}{}", self.api_url(), method))
            .send_form(&form)
            .await
            .map_err(|err| eyre::eyre!("Failed to call Conduit method {}: {}", method, err))?;
        let body = resp
            .body()
            .await
            .wrap_err("Failed to fetch Conduit response body")?;
        if !resp.status().is_success() {
            eyre::bail!(
                "Conduit method {} returned HTTP {}: {}",
                method,
                resp.status(),
                String::from_utf8_lossy(body.as_ref())
            );
        }

        serde_json::from_slice::<Envelope<T>>(&body)
            .wrap_err_with(|| format!("Invalid Conduit response for {}", method))?
            .into_result()
    }

    async fn connect(&self) -> eyre::Result<Session> {
        let auth_token = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .wrap_err("System clock is before UNIX epoch")?
            .as_secs();
        let api_url = self.api_url();
        let params = ConnectParams {
            client: CLIENT_NAME,
            client_version: CLIENT_VERSION,
            user: &self.config.username,
            host: &api_url,
            auth_token,
            auth_signature: auth_signature(auth_token, self.config.certificate.unsecure()),
        };
        self.call("conduit.connect", &params, true)
            .await
            .wrap_err("Failed to open Conduit session")
    }

    /// Resolves a PHID to a user name, `None` if Phabricator doesn't know it.
    pub async fn username_from_phid(&self, phid: &str) -> eyre::Result<Option<String>> {
        let session = self.connect().await?;
        let result: serde_json::Value = self
            .call(
                "phid.lookup",
                &LookupParams {
                    names: [phid],
                    conduit: &session,
                },
                false,
            )
            .await?;
        Ok(name_from_lookup(&result, phid))
    }
}
