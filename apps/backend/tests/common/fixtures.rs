//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

use vocab_backend::models::{NewWord, WordId};

/// A catalog word whose texts carry a unique suffix.
pub fn unique_word(source: &str, target: &str) -> NewWord {
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    NewWord {
        source: format!("{source}_{suffix}"),
        target: format!("{target}_{suffix}"),
        topic: "house".to_string(),
        part_of_speech: "noun".to_string(),
    }
}

/// Password used by every test learner.
pub const TEST_PASSWORD: &str = "correct horse";

/// Create a learner register request body.
pub fn register_request(name: &str, email: &str) -> serde_json::Value {
    json!({ "name": name, "email": email, "password": TEST_PASSWORD })
}

/// Create a login request body.
pub fn login_request(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password })
}

/// Generate a unique email address.
pub fn unique_email() -> String {
    format!("learner_{}@example.com", Uuid::new_v4().simple())
}

/// Create a transition request body.
pub fn transition_request(word_id: WordId) -> serde_json::Value {
    json!({ "word_id": word_id })
}
