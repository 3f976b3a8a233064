// ── Generic resource mutation ──
//
// One `ResourceOp` covers create/update/delete for every resource kind;
// the (kind, action) pair selects the REST call.

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

use gostly_api::{Resource, ResourceKind};

use super::{Task, TaskId};
use crate::error::CoreError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Create, update or delete one named object.
///
/// A missing payload (create/update) or an empty name (update/delete)
/// makes the run a successful no-op, so callers never special-case
/// "nothing selected yet".
#[derive(Debug, Clone)]
pub struct ResourceOp<P = serde_json::Value> {
    kind: ResourceKind,
    action: Action,
    /// Target name for update/delete; subject name for create.
    name: String,
    payload: Option<P>,
}

impl<P: Serialize + Send + Sync> ResourceOp<P> {
    pub fn create(kind: ResourceKind, name: impl Into<String>, payload: Option<P>) -> Self {
        Self {
            kind,
            action: Action::Create,
            name: name.into(),
            payload,
        }
    }

    /// Update the object currently called `name`. The payload may carry a
    /// different name to rename it.
    pub fn update(kind: ResourceKind, name: impl Into<String>, payload: Option<P>) -> Self {
        Self {
            kind,
            action: Action::Update,
            name: name.into(),
            payload,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, session: &Session) -> Result<(), CoreError> {
        let client = session.client();

        match self.action {
            Action::Create => {
                let Some(payload) = &self.payload else {
                    return Ok(());
                };
                client.create(self.kind, self.encode(payload)?).await?;
            }
            Action::Update => {
                if self.name.is_empty() {
                    return Ok(());
                }
                let Some(payload) = &self.payload else {
                    return Ok(());
                };
                client
                    .update(self.kind, &self.name, self.encode(payload)?)
                    .await?;
            }
            Action::Delete => {
                if self.name.is_empty() {
                    return Ok(());
                }
                client.delete(self.kind, &self.name).await?;
            }
        }

        Ok(())
    }

    fn encode(&self, payload: &P) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(payload).map_err(|e| CoreError::Serialization {
            kind: self.kind,
            source: e.into(),
        })
    }
}

impl<T: Resource> ResourceOp<T> {
    /// Create from a typed object; the kind comes from `T::KIND`.
    pub fn create_resource(resource: Option<T>) -> Self {
        let name = resource
            .as_ref()
            .map(|r| r.name().to_owned())
            .unwrap_or_default();
        Self::create(T::KIND, name, resource)
    }

    pub fn update_resource(name: impl Into<String>, resource: Option<T>) -> Self {
        Self::update(T::KIND, name, resource)
    }
}

impl ResourceOp<()> {
    pub fn delete(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            action: Action::Delete,
            name: name.into(),
            payload: None,
        }
    }
}

impl<P: Serialize + Send + Sync> Task for ResourceOp<P> {
    fn id(&self) -> TaskId {
        TaskId::Resource {
            kind: self.kind,
            action: self.action,
        }
    }

    async fn run(&self, session: &Session) -> Result<(), CoreError> {
        let result = self.execute(session).await;
        match &result {
            Ok(()) => debug!(task = %self.id(), name = %self.name, "task finished"),
            Err(e) => debug!(task = %self.id(), name = %self.name, error = %e, "task failed"),
        }
        result
    }
}
