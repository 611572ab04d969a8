//! Broker account provisioning.
//!
//! Two strategies exist for making a plugin's RabbitMQ account match its
//! freshly generated credential: the management HTTP API (scoped
//! permissions, idempotent hash check) and `rabbitmqctl` inside the running
//! stack (blanket permissions, fully local). One is selected per deployment
//! through [`BrokerConfig::provisioner`]. Failures are fatal for the whole
//! operation; nothing is retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BrokerConfig, ProvisionerKind};
use crate::credentials::{rabbitmq_password_hash, Credential};
use crate::docker::Compose;
use crate::error::{NodeError, Result};
use crate::identity::PluginIdentity;

/// Ensures a broker account exists with a known permission shape.
#[async_trait]
pub trait AccountProvisioner {
    async fn provision(&self, identity: &PluginIdentity, credential: &Credential) -> Result<()>;
}

/// Build the provisioner selected by configuration.
pub fn provisioner_for(
    config: &BrokerConfig,
    compose: &Compose,
) -> Result<Box<dyn AccountProvisioner + Send + Sync>> {
    match config.provisioner {
        ProvisionerKind::Rabbitmqctl => Ok(Box::new(RabbitmqctlProvisioner::new(compose.clone()))),
        ProvisionerKind::ManagementApi => Ok(Box::new(ManagementApiProvisioner::new(
            &config.management_url,
            &config.admin_username,
            &config.admin_password,
        )?)),
    }
}

// ── Management API strategy ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct UserBody {
    password_hash: String,
    tags: String,
}

#[derive(Debug, Serialize)]
struct PermissionsBody {
    configure: String,
    write: String,
    read: String,
}

#[derive(Debug, Deserialize)]
struct StoredUser {
    #[serde(default)]
    password_hash: Option<String>,
}

/// Provisions accounts through the RabbitMQ management HTTP API.
///
/// Permissions are scoped to the plugin's private inbound queue plus the
/// shared publishing topics. The user record is only rewritten when the
/// stored password hash differs from the freshly computed one.
pub struct ManagementApiProvisioner {
    client: reqwest::Client,
    base_url: String,
    admin_username: String,
    admin_password: String,
}

impl ManagementApiProvisioner {
    pub fn new(base_url: &str, admin_username: &str, admin_password: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_username: admin_username.to_string(),
            admin_password: admin_password.to_string(),
        })
    }

    fn provisioning_error(&self, username: &str, reason: impl Into<String>) -> NodeError {
        NodeError::Provisioning {
            username: username.to_string(),
            reason: reason.into(),
        }
    }

    async fn get_user(&self, username: &str) -> Result<Option<StoredUser>> {
        let url = format!("{}/api/users/{}", self.base_url, username);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.admin_username, Some(&self.admin_password))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(self.provisioning_error(
                username,
                format!("GET {} returned {}", url, resp.status()),
            ));
        }
        Ok(Some(resp.json().await?))
    }

    async fn put_user(&self, username: &str, password_hash: &str) -> Result<()> {
        let url = format!("{}/api/users/{}", self.base_url, username);
        let resp = self
            .client
            .put(&url)
            .basic_auth(&self.admin_username, Some(&self.admin_password))
            .json(&UserBody {
                password_hash: password_hash.to_string(),
                tags: String::new(),
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.provisioning_error(
                username,
                format!("PUT {} returned {}", url, resp.status()),
            ));
        }
        Ok(())
    }

    async fn put_permissions(&self, username: &str, permissions: &PermissionsBody) -> Result<()> {
        let url = format!("{}/api/permissions/%2f/{}", self.base_url, username);
        let resp = self
            .client
            .put(&url)
            .basic_auth(&self.admin_username, Some(&self.admin_password))
            .json(permissions)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.provisioning_error(
                username,
                format!("PUT {} returned {}", url, resp.status()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountProvisioner for ManagementApiProvisioner {
    async fn provision(&self, identity: &PluginIdentity, credential: &Credential) -> Result<()> {
        let username = &credential.username;
        let password_hash = rabbitmq_password_hash(&credential.password);

        let stored = self.get_user(username).await?;
        let up_to_date = stored
            .and_then(|user| user.password_hash)
            .map(|stored_hash| stored_hash == password_hash)
            .unwrap_or(false);

        if up_to_date {
            debug!(%username, "stored password hash matches, skipping user update");
        } else {
            self.put_user(username, &password_hash).await?;
        }

        let queue = identity.inbound_queue();
        self.put_permissions(
            username,
            &PermissionsBody {
                configure: format!("^{}$", queue),
                write: format!("^{}|messages|data-pipeline-in|logs|images$", queue),
                read: format!("^{}$", queue),
            },
        )
        .await
    }
}

// ── rabbitmqctl strategy ────────────────────────────────────────────────────

/// Provisions accounts with `rabbitmqctl` inside the running stack.
///
/// Grants blanket permissions; intended for the fully-local development
/// path where the stack is trusted end to end.
pub struct RabbitmqctlProvisioner {
    compose: Compose,
}

impl RabbitmqctlProvisioner {
    pub fn new(compose: Compose) -> Self {
        Self { compose }
    }
}

#[async_trait]
impl AccountProvisioner for RabbitmqctlProvisioner {
    async fn provision(&self, _identity: &PluginIdentity, credential: &Credential) -> Result<()> {
        let username = credential.username.as_str();
        let password = credential.password.as_str();

        // fails when the account already exists; change_password below
        // covers that case
        self.compose
            .exec_rabbitmq_quiet(&["rabbitmqctl", "add_user", username, password])
            .await?;

        let changed = self
            .compose
            .exec_rabbitmq_quiet(&["rabbitmqctl", "change_password", username, password])
            .await?;
        if !changed {
            return Err(NodeError::Provisioning {
                username: username.to_string(),
                reason: "rabbitmqctl change_password failed".to_string(),
            });
        }

        let granted = self
            .compose
            .exec_rabbitmq_quiet(&["rabbitmqctl", "set_permissions", username, ".*", ".*", ".*"])
            .await?;
        if !granted {
            return Err(NodeError::Provisioning {
                username: username.to_string(),
                reason: "rabbitmqctl set_permissions failed".to_string(),
            });
        }

        Ok(())
    }
}
