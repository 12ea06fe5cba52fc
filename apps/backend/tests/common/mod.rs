//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helpers for seeding catalog words and registering learners
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).
//! Tests share the database, so each one seeds uniquely named words and
//! asserts on those words only.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::Duration;
use uuid::Uuid;

use vocab_backend::config::Config;
use vocab_backend::db::{Database, TextColumn};
use vocab_backend::models::{LearnerId, NewWord, Word};
use vocab_backend::AppState;

/// Lowest cost bcrypt accepts; keeps registration fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let config = Config {
            database_url,
            host: "127.0.0.1".to_string(),
            port: 0,
            token_ttl: Duration::hours(1),
            password_cost: TEST_BCRYPT_COST,
            catalog_seed: None,
        };

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
        };

        let app = vocab_backend::router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Insert words into the catalog and return them with their ids.
    pub async fn seed_words(&self, words: &[NewWord]) -> Vec<Word> {
        self.db
            .insert_words(words)
            .await
            .expect("Failed to insert words");

        let mut seeded = Vec::new();
        for word in words {
            let found = self
                .db
                .find_by_text(TextColumn::Source, &word.source)
                .await
                .expect("Failed to look up seeded word");
            seeded.extend(found.into_iter().filter(|w| w.target == word.target));
        }
        seeded
    }

    /// Register a learner directly and return its id and token.
    ///
    /// The learner's password is `fixtures::TEST_PASSWORD`.
    pub async fn create_test_learner(&self) -> (LearnerId, String) {
        let (learner, token, _) = self.create_test_learner_with_email().await;
        (learner, token)
    }

    /// Like `create_test_learner`, also returning the learner's email.
    pub async fn create_test_learner_with_email(&self) -> (LearnerId, String, String) {
        let email = fixtures::unique_email();
        let password_hash = bcrypt::hash(fixtures::TEST_PASSWORD, TEST_BCRYPT_COST)
            .expect("Failed to hash test password");
        let (learner, credential, _) = self
            .db
            .create_learner("Test Learner", &email, &password_hash, Duration::hours(1))
            .await
            .expect("Failed to create test learner");
        (LearnerId(learner.id), credential.token, email)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Push a token's expiry into the past.
    pub async fn expire_token(&self, token: &str) {
        sqlx::query("UPDATE credentials SET expires_at = NOW() - INTERVAL '1 second' WHERE token = $1")
            .bind(token)
            .execute(self.db.pool())
            .await
            .expect("Failed to expire token");
    }

    /// Clean up test data for a learner.
    pub async fn cleanup_learner(&self, learner: LearnerId) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM learner_words WHERE learner_id = $1")
            .bind(learner.0)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM credentials WHERE learner_id = $1")
            .bind(learner.0)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM learners WHERE id = $1")
            .bind(learner.0)
            .execute(self.db.pool())
            .await;
    }

    /// Remove seeded words and any learner entries pointing at them.
    pub async fn cleanup_words(&self, words: &[Word]) {
        let ids: Vec<Uuid> = words.iter().map(|w| w.id.0).collect();

        let _ = sqlx::query("DELETE FROM learner_words WHERE word_id = ANY($1)")
            .bind(&ids)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM words WHERE id = ANY($1)")
            .bind(&ids)
            .execute(self.db.pool())
            .await;
    }
}
