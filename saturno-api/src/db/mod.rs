//! Data access layer for saturno-api
//!
//! Handlers talk to a [`QuizStore`]; each HTTP request maps to exactly one
//! store call. `MongoQuizStore` is the production backend, `MemoryQuizStore`
//! keeps everything in process.

use async_trait::async_trait;
use bson::oid::ObjectId;
use saturno_common::{NewQuiz, Quiz, QuizUpdate, Result};

mod memory;
mod mongo;

pub use memory::MemoryQuizStore;
pub use mongo::MongoQuizStore;

/// Persistence operations over the quiz collection
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// All quizzes, newest `created_at` first
    async fn list(&self) -> Result<Vec<Quiz>>;

    /// Distinct category values
    async fn categories(&self) -> Result<Vec<String>>;

    async fn get(&self, id: ObjectId) -> Result<Option<Quiz>>;

    /// Insert a quiz; the store assigns the id and both timestamps
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz>;

    /// Apply `update` and refresh `updated_at`. Returns the post-update
    /// record, or `None` when no quiz has this id.
    async fn update(&self, id: ObjectId, update: QuizUpdate) -> Result<Option<Quiz>>;

    /// Remove a quiz, returning the removed record
    async fn delete(&self, id: ObjectId) -> Result<Option<Quiz>>;

    /// Round-trip to the backend to verify connectivity
    async fn ping(&self) -> Result<()>;
}
