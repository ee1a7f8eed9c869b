//! Confirmation prompts resolved by correlation id, and the model save flow
//! built on them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pairs a confirmation answer with the prompt that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub id: CorrelationId,
    pub prompt: String,
}

/// A prompt together with the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogResolution {
    pub request: DialogRequest,
    pub accepted: bool,
}

/// Open confirmation prompts.
#[derive(Debug, Default)]
pub struct DialogBroker {
    open: HashMap<CorrelationId, DialogRequest>,
}

impl DialogBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, prompt: impl Into<String>) -> CorrelationId {
        let id = CorrelationId::new();
        self.open.insert(
            id,
            DialogRequest {
                id,
                prompt: prompt.into(),
            },
        );
        id
    }

    pub fn get(&self, id: CorrelationId) -> Option<&DialogRequest> {
        self.open.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Close a prompt. Unknown or already resolved ids give `None`.
    pub fn resolve(&mut self, id: CorrelationId, accepted: bool) -> Option<DialogResolution> {
        let request = self.open.remove(&id)?;
        tracing::debug!(%id, accepted, "dialog resolved");
        Some(DialogResolution { request, accepted })
    }
}

/// A model the user already owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedModel {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStep {
    /// Save under `name`, replacing model `overwrite` when set.
    Save { name: String, overwrite: Option<u64> },
    /// Ask the user first; answer with [`ModelSaveFlow::resolve`].
    Confirm(CorrelationId),
    Cancelled,
}

/// Saving a trained model, asking before a name clash overwrites one.
#[derive(Debug, Default)]
pub struct ModelSaveFlow {
    broker: DialogBroker,
    clashes: HashMap<CorrelationId, (String, u64)>,
}

impl ModelSaveFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, name: &str, owned_models: &[OwnedModel]) -> SaveStep {
        let name = name.trim();
        if name.is_empty() {
            return SaveStep::Cancelled;
        }
        match owned_models.iter().find(|m| m.name == name) {
            None => SaveStep::Save {
                name: name.to_string(),
                overwrite: None,
            },
            Some(existing) => {
                let id = self
                    .broker
                    .request(format!("A model named '{name}' already exists. Overwrite it?"));
                self.clashes.insert(id, (name.to_string(), existing.id));
                SaveStep::Confirm(id)
            }
        }
    }

    pub fn prompt(&self, id: CorrelationId) -> Option<&str> {
        self.broker.get(id).map(|r| r.prompt.as_str())
    }

    pub fn resolve(&mut self, id: CorrelationId, accepted: bool) -> SaveStep {
        let resolution = self.broker.resolve(id, accepted);
        let clash = self.clashes.remove(&id);
        let (Some(resolution), Some((name, model_id))) = (resolution, clash) else {
            return SaveStep::Cancelled;
        };
        if resolution.accepted {
            SaveStep::Save {
                name,
                overwrite: Some(model_id),
            }
        } else {
            SaveStep::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned() -> Vec<OwnedModel> {
        vec![OwnedModel {
            id: 7,
            name: "ridge".to_string(),
        }]
    }

    #[test]
    fn new_name_saves_directly() {
        let mut flow = ModelSaveFlow::new();
        assert_eq!(
            flow.begin("lasso", &owned()),
            SaveStep::Save {
                name: "lasso".to_string(),
                overwrite: None
            }
        );
    }

    #[test]
    fn clash_asks_then_overwrites() {
        let mut flow = ModelSaveFlow::new();
        let SaveStep::Confirm(id) = flow.begin("ridge", &owned()) else {
            panic!("expected a confirmation");
        };
        assert!(flow.prompt(id).unwrap().contains("ridge"));
        assert_eq!(
            flow.resolve(id, true),
            SaveStep::Save {
                name: "ridge".to_string(),
                overwrite: Some(7)
            }
        );
        // A second answer to the same prompt is ignored.
        assert_eq!(flow.resolve(id, true), SaveStep::Cancelled);
    }

    #[test]
    fn declined_clash_cancels() {
        let mut flow = ModelSaveFlow::new();
        let SaveStep::Confirm(id) = flow.begin("ridge", &owned()) else {
            panic!("expected a confirmation");
        };
        assert_eq!(flow.resolve(id, false), SaveStep::Cancelled);
    }

    #[test]
    fn broker_ids_are_independent() {
        let mut broker = DialogBroker::new();
        let a = broker.request("first");
        let b = broker.request("second");
        assert_ne!(a, b);
        let second = broker.resolve(b, false).unwrap();
        assert_eq!(second.request.prompt, "second");
        assert_eq!(second.request.id, b);
        assert!(!second.accepted);
        assert!(broker.resolve(b, true).is_none());

        let first = broker.resolve(a, true).unwrap();
        assert_eq!(first.request.prompt, "first");
        assert!(first.accepted);
        assert!(broker.is_empty());
    }
}
