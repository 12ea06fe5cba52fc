//! Word set and catalog backed by the vocabulary server.

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vocab_core::{
    BatchLimit, Catalog, DrillError, LearnerId, Partition, Transition, Word, WordId, WordSet,
};

use crate::credentials::Credentials;
use crate::error::{ClientError, Result};

// === API Request/Response Types ===

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body of both the register and the login response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    learner_id: LearnerId,
    token: String,
    expires_at: DateTime<Utc>,
}

impl TokenResponse {
    fn into_credentials(self, server_url: String, email: &str) -> Credentials {
        Credentials {
            server_url,
            learner_id: self.learner_id,
            email: email.to_string(),
            token: self.token,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogoutResponse {
    revoked: bool,
}

#[derive(Debug, Serialize)]
struct TransitionRequest {
    word_id: WordId,
}

#[derive(Debug, Deserialize)]
struct PartitionResponse {
    partition: Option<Partition>,
}

#[derive(Debug, Deserialize)]
struct WordsResponse {
    words: Vec<Word>,
}

/// Blocking client bound to one learner's bearer token.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    token: String,
    learner: LearnerId,
}

fn normalize_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Turn a non-success status into `ClientError::Backend`, else decode the body.
fn read<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().unwrap_or_default();
        return Err(ClientError::Backend {
            status: status.as_u16(),
            message,
        });
    }
    resp.json().map_err(|e| ClientError::Parse(e.to_string()))
}

/// Map the server's answer to a transition onto the partition the word now occupies.
///
/// A 404 means the word was not in a partition the transition moves from.
fn transition_outcome(
    learner: LearnerId,
    word: WordId,
    transition: Transition,
    response: Result<PartitionResponse>,
) -> vocab_core::Result<Partition> {
    match response {
        Ok(PartitionResponse {
            partition: Some(partition),
        }) => Ok(partition),
        Ok(PartitionResponse { partition: None }) => Err(DrillError::Unavailable(
            "server returned no partition".to_string(),
        )),
        Err(ClientError::Backend { status: 404, .. }) => {
            Err(DrillError::not_found(learner, word, transition.sources()))
        }
        Err(err) => Err(err.into()),
    }
}

impl RemoteStore {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_url(&credentials.server_url),
            token: credentials.token.clone(),
            learner: credentials.learner_id,
        }
    }

    pub fn learner(&self) -> LearnerId {
        self.learner
    }

    /// Register a new learner and return the issued credentials.
    pub fn register(
        base_url: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Credentials> {
        let base_url = normalize_url(base_url);
        let resp = Client::new()
            .post(format!("{base_url}/api/learners/register"))
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()?;
        let response: TokenResponse = read(resp)?;

        tracing::info!(learner = %response.learner_id, "registered with server");
        Ok(response.into_credentials(base_url, email))
    }

    /// Get a fresh token for an existing learner.
    pub fn login(base_url: &str, email: &str, password: &str) -> Result<Credentials> {
        let base_url = normalize_url(base_url);
        let resp = Client::new()
            .post(format!("{base_url}/api/learners/login"))
            .json(&LoginRequest { email, password })
            .send()?;
        let response: TokenResponse = read(resp)?;

        tracing::info!(learner = %response.learner_id, "logged in to server");
        Ok(response.into_credentials(base_url, email))
    }

    /// Check if the server is reachable.
    pub fn check_connectivity(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send()?;
        Ok(resp.status().is_success())
    }

    /// Revoke this client's token.
    pub fn logout(&self) -> Result<bool> {
        let resp = self
            .client
            .post(self.url("/api/learners/logout"))
            .bearer_auth(&self.token)
            .send()?;
        let response: LogoutResponse = read(resp)?;
        Ok(response.revoked)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The server derives the learner from the token; refuse to act for anyone else.
    fn ensure_learner(&self, learner: LearnerId) -> Result<()> {
        if learner != self.learner {
            return Err(DrillError::InvalidInput(format!(
                "client is signed in as learner {}, not {learner}",
                self.learner
            ))
            .into());
        }
        Ok(())
    }

    fn lookup(&self, side: &str, text: &str) -> Result<Vec<Word>> {
        let resp = self
            .client
            .get(self.url(&format!("/api/catalog/{side}")))
            .query(&[("text", text)])
            .bearer_auth(&self.token)
            .send()?;
        let response: WordsResponse = read(resp)?;
        Ok(response.words)
    }
}

impl WordSet for RemoteStore {
    fn transition(
        &self,
        learner: LearnerId,
        word: WordId,
        transition: Transition,
    ) -> vocab_core::Result<Partition> {
        self.ensure_learner(learner)?;
        let resp = self
            .client
            .post(self.url(&format!("/api/words/{}", transition.as_str())))
            .bearer_auth(&self.token)
            .json(&TransitionRequest { word_id: word })
            .send()
            .map_err(ClientError::from)?;

        transition_outcome(learner, word, transition, read(resp))
    }

    fn fetch_batch(
        &self,
        learner: LearnerId,
        partition: Partition,
        limit: BatchLimit,
    ) -> vocab_core::Result<Vec<Word>> {
        self.ensure_learner(learner)?;
        let resp = self
            .client
            .get(self.url("/api/words/batch"))
            .query(&[
                ("partition", partition.as_str().to_string()),
                ("limit", limit.get().to_string()),
            ])
            .bearer_auth(&self.token)
            .send()
            .map_err(ClientError::from)?;
        let response: WordsResponse = read(resp)?;
        Ok(response.words)
    }

    fn partition_of(
        &self,
        learner: LearnerId,
        word: WordId,
    ) -> vocab_core::Result<Option<Partition>> {
        self.ensure_learner(learner)?;
        let resp = self
            .client
            .get(self.url(&format!("/api/words/{word}/partition")))
            .bearer_auth(&self.token)
            .send()
            .map_err(ClientError::from)?;
        let response: PartitionResponse = read(resp)?;
        Ok(response.partition)
    }
}

impl Catalog for RemoteStore {
    fn find_by_source_text(&self, text: &str) -> vocab_core::Result<Vec<Word>> {
        Ok(self.lookup("source", text)?)
    }

    fn find_by_target_text(&self, text: &str) -> vocab_core::Result<Vec<Word>> {
        Ok(self.lookup("target", text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::net::TcpListener;

    /// Credentials pointing at a local port nothing listens on.
    fn unreachable() -> Credentials {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        Credentials {
            server_url: format!("http://127.0.0.1:{port}/"),
            learner_id: LearnerId::new_v4(),
            email: "anna@example.com".to_string(),
            token: "token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let store = RemoteStore::new(&unreachable());
        assert!(store.url("/health").starts_with("http://127.0.0.1:"));
        assert!(!store.url("/health").contains("//health"));
    }

    #[test]
    fn test_other_learner_rejected_without_request() {
        let store = RemoteStore::new(&unreachable());
        let err = store
            .fetch_batch(LearnerId::new_v4(), Partition::Assigned, BatchLimit::new(1).unwrap())
            .unwrap_err();
        assert!(matches!(err, DrillError::InvalidInput(_)));
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let store = RemoteStore::new(&unreachable());
        let err = store
            .fetch_batch(store.learner(), Partition::Assigned, BatchLimit::new(1).unwrap())
            .unwrap_err();
        assert!(err.is_unavailable());

        let err = store.find_by_source_text("стол").unwrap_err();
        assert!(err.is_unavailable());
    }

    fn backend(status: u16) -> Result<PartitionResponse> {
        Err(ClientError::Backend {
            status,
            message: "{}".to_string(),
        })
    }

    #[test]
    fn test_transition_outcome_returns_new_partition() {
        let outcome = transition_outcome(
            LearnerId::new_v4(),
            WordId::new_v4(),
            Transition::Escalate,
            Ok(PartitionResponse {
                partition: Some(Partition::InReview),
            }),
        );
        assert_eq!(outcome.unwrap(), Partition::InReview);
    }

    #[test]
    fn test_transition_outcome_404_names_source_partitions() {
        let (learner, word) = (LearnerId::new_v4(), WordId::new_v4());
        let err = transition_outcome(learner, word, Transition::Retire, backend(404)).unwrap_err();
        match err {
            DrillError::NotFound {
                learner: l,
                word: w,
                expected,
            } => {
                assert_eq!((l, w), (learner, word));
                assert_eq!(expected, "in_review");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_transition_outcome_missing_partition_is_unavailable() {
        let err = transition_outcome(
            LearnerId::new_v4(),
            WordId::new_v4(),
            Transition::Promote,
            Ok(PartitionResponse { partition: None }),
        )
        .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_transition_outcome_other_statuses() {
        let (learner, word) = (LearnerId::new_v4(), WordId::new_v4());
        let err = transition_outcome(learner, word, Transition::Promote, backend(400)).unwrap_err();
        assert!(matches!(err, DrillError::InvalidInput(_)));

        for status in [401, 500, 503] {
            let err =
                transition_outcome(learner, word, Transition::Promote, backend(status)).unwrap_err();
            assert!(err.is_unavailable(), "status {status}");
        }
    }

    #[test]
    fn test_register_against_unreachable_server() {
        let credentials = unreachable();
        let err = RemoteStore::register(
            &credentials.server_url,
            "Anna",
            "anna@example.com",
            "correct horse",
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));

        let err = RemoteStore::login(&credentials.server_url, "anna@example.com", "correct horse")
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_token_response_keeps_email() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "learner_id": LearnerId::new_v4(),
            "token": "abc",
            "expires_at": Utc::now(),
            "assigned": 12,
        }))
        .unwrap();
        let credentials =
            response.into_credentials("http://localhost:3000".to_string(), "anna@example.com");
        assert_eq!(credentials.email, "anna@example.com");
        assert_eq!(credentials.token, "abc");
    }
}
