//! REST client for the evaluation backend
//!
//! Every call is a blocking request on the caller's thread; the fetcher
//! moves them onto worker threads.

use crate::config::Config;
use crate::model::{EvalRequest, EvalResult, EvalStarted, Job, Prompt, Sample, UseCase};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("backend replied {0}: {1}")]
    Status(u16, String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unreadable response body: {0}")]
    Json(String),
    #[error("invalid backend url: {0}")]
    Url(String),
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                ApiError::Status(code, response.into_string().unwrap_or_default())
            }
            ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
        }
    }
}

/// A backend call, independent of how it is transported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    UseCases,
    Samples {
        use_case_id: String,
    },
    Models,
    Jobs,
    Results,
    CreatePrompt {
        use_case_id: String,
        prompt: Prompt,
    },
    UpdatePrompt {
        use_case_id: String,
        prompt_id: String,
        prompt: Prompt,
    },
    DeletePrompt {
        use_case_id: String,
        prompt_id: String,
    },
    Evaluate(EvalRequest),
}

impl Request {
    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Request::UseCases => "GET /use-cases".to_string(),
            Request::Samples { use_case_id } => format!("GET /use-cases/{}/samples", use_case_id),
            Request::Models => "GET /models".to_string(),
            Request::Jobs => "GET /jobs".to_string(),
            Request::Results => "GET /results".to_string(),
            Request::CreatePrompt { use_case_id, .. } => {
                format!("POST /use-cases/{}/prompts", use_case_id)
            }
            Request::UpdatePrompt {
                use_case_id,
                prompt_id,
                ..
            } => format!("PUT /use-cases/{}/prompts/{}", use_case_id, prompt_id),
            Request::DeletePrompt {
                use_case_id,
                prompt_id,
            } => format!("DELETE /use-cases/{}/prompts/{}", use_case_id, prompt_id),
            Request::Evaluate(_) => "POST /evaluate".to_string(),
        }
    }
}

/// Decoded reply of a successful request
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    UseCases(Vec<UseCase>),
    Samples(Vec<Sample>),
    Models(Vec<String>),
    Jobs(Vec<Job>),
    Results(Vec<EvalResult>),
    Prompt(Prompt),
    Deleted,
    EvaluationStarted(EvalStarted),
}

/// Anything that can carry out a [`Request`]
pub trait Api: Send + Sync {
    fn execute(&self, request: &Request) -> Result<Payload, ApiError>;
}

/// Backend client over a shared `ureq` agent
#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base = Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::Url(format!("{}: {}", config.api_base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Url(config.api_base_url.clone()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(config.request_timeout())
            .timeout_write(config.request_timeout())
            .build();

        Ok(Self { agent, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL extended by percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.agent.get(url.as_str()).call()?;
        decode(response)
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.agent.request(method, url.as_str()).send_json(body)?;
        decode(response)
    }

    pub fn use_cases(&self) -> Result<Vec<UseCase>, ApiError> {
        self.get(&["use-cases"])
    }

    pub fn samples(&self, use_case_id: &str) -> Result<Vec<Sample>, ApiError> {
        self.get(&["use-cases", use_case_id, "samples"])
    }

    pub fn models(&self) -> Result<Vec<String>, ApiError> {
        self.get(&["models"])
    }

    pub fn jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get(&["jobs"])
    }

    pub fn results(&self) -> Result<Vec<EvalResult>, ApiError> {
        self.get(&["results"])
    }

    pub fn create_prompt(&self, use_case_id: &str, prompt: &Prompt) -> Result<Prompt, ApiError> {
        self.send("POST", &["use-cases", use_case_id, "prompts"], prompt)
    }

    pub fn update_prompt(
        &self,
        use_case_id: &str,
        prompt_id: &str,
        prompt: &Prompt,
    ) -> Result<Prompt, ApiError> {
        self.send("PUT", &["use-cases", use_case_id, "prompts", prompt_id], prompt)
    }

    /// The reply body is not inspected beyond the status code
    pub fn delete_prompt(&self, use_case_id: &str, prompt_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["use-cases", use_case_id, "prompts", prompt_id])?;
        self.agent.delete(url.as_str()).call()?;
        Ok(())
    }

    pub fn evaluate(&self, request: &EvalRequest) -> Result<EvalStarted, ApiError> {
        self.send("POST", &["evaluate"], request)
    }
}

impl Api for ApiClient {
    fn execute(&self, request: &Request) -> Result<Payload, ApiError> {
        match request {
            Request::UseCases => self.use_cases().map(Payload::UseCases),
            Request::Samples { use_case_id } => self.samples(use_case_id).map(Payload::Samples),
            Request::Models => self.models().map(Payload::Models),
            Request::Jobs => self.jobs().map(Payload::Jobs),
            Request::Results => self.results().map(Payload::Results),
            Request::CreatePrompt {
                use_case_id,
                prompt,
            } => self.create_prompt(use_case_id, prompt).map(Payload::Prompt),
            Request::UpdatePrompt {
                use_case_id,
                prompt_id,
                prompt,
            } => self
                .update_prompt(use_case_id, prompt_id, prompt)
                .map(Payload::Prompt),
            Request::DeletePrompt {
                use_case_id,
                prompt_id,
            } => self
                .delete_prompt(use_case_id, prompt_id)
                .map(|_| Payload::Deleted),
            Request::Evaluate(eval) => self.evaluate(eval).map(Payload::EvaluationStarted),
        }
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
    let body = response
        .into_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| ApiError::Json(e.to_string()))
}
