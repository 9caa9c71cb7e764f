//! Use cases and their prompt configurations

use serde::{Deserialize, Serialize};

/// A named evaluation scenario bound to a dataset and a set of prompts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UseCase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dataset_count: u64,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    /// "mock" or "hf:<dataset>[:<config>]"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_source: Option<String>,
}

/// Chain-of-thought and few-shot text used to instruct a model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub cot_content: String,
    #[serde(default)]
    pub few_shot_content: String,
    #[serde(default)]
    pub user_prompt_template: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Prompt {
    pub const NEW_PROMPT_NAME: &'static str = "New Custom Prompt";

    /// Payload for a freshly created custom prompt
    pub fn new_custom() -> Self {
        Self {
            name: Self::NEW_PROMPT_NAME.to_string(),
            ..Default::default()
        }
    }

    /// Default prompts are read-only: no edit, no delete
    pub fn is_editable(&self) -> bool {
        !self.is_default && self.id.is_some()
    }
}

impl UseCase {
    #[cfg(test)]
    pub fn first_prompt_id(&self) -> Option<String> {
        self.prompts.first().and_then(|p| p.id.clone())
    }

    /// Shown by the use case list when the backend cannot be reached
    pub fn mock_catalog() -> Vec<UseCase> {
        vec![UseCase {
            id: "GKH".to_string(),
            name: "(GKH) General Knowledge Helper".to_string(),
            description:
                "Evaluates ability to answer common sense questions using Chain of Thought."
                    .to_string(),
            dataset_count: 570,
            prompts: vec![Prompt {
                name: "Evaluation Prompt".to_string(),
                ..Default::default()
            }],
            dataset_source: None,
        }]
    }
}
