//! MongoDB quiz store
//!
//! One `Client` is opened at boot and shared by every request; the driver
//! pools connections internally.

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection,
};
use saturno_common::config::{ServerConfig, DEFAULT_DATABASE};
use saturno_common::{Error, NewQuiz, Quiz, QuizAnswer, QuizUpdate, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::QuizStore;

const APP_NAME: &str = "saturno-api";
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Quiz as persisted in the collection
///
/// Extra fields written by other clients (`__v`, answer `_id`s) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    answers: Vec<QuizAnswer>,
    category: String,
    game_name: String,
    lore: String,
    question: String,
    saga: String,
    source: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl QuizDocument {
    fn new(quiz: NewQuiz, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            answers: quiz.answers,
            category: quiz.category,
            game_name: quiz.game_name,
            lore: quiz.lore,
            question: quiz.question,
            saga: quiz.saga,
            source: quiz.source,
            created_at: now,
            updated_at: now,
        }
    }

    fn into_quiz(self) -> Result<Quiz> {
        let id = self
            .id
            .ok_or_else(|| Error::Internal("quiz document without _id".to_string()))?;

        Ok(Quiz {
            id: id.to_hex(),
            answers: self.answers,
            category: self.category,
            game_name: self.game_name,
            lore: self.lore,
            question: self.question,
            saga: self.saga,
            source: self.source,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Quiz store backed by a MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoQuizStore {
    client: Client,
    collection: Collection<QuizDocument>,
}

impl MongoQuizStore {
    /// Open a client from `config`, select database and collection, and ping
    ///
    /// Database name priority: `config.database`, then the URI's default
    /// database, then `saturno`.
    pub async fn connect(config: &ServerConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(config.mongo_uri()?).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        options.connect_timeout = Some(CONNECT_TIMEOUT);

        let database = config
            .database
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options)?;
        let store = Self::from_client(client, &database, &config.collection);
        store.ping().await?;

        info!(
            "MongoDB store ready (database: {}, collection: {})",
            database, config.collection
        );
        Ok(store)
    }

    /// Wrap an already-configured client
    pub fn from_client(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }
}

#[async_trait]
impl QuizStore for MongoQuizStore {
    async fn list(&self) -> Result<Vec<Quiz>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();

        let documents: Vec<QuizDocument> = self
            .collection
            .find(None, options)
            .await?
            .try_collect()
            .await?;
        debug!("Fetched {} quizzes", documents.len());

        documents.into_iter().map(QuizDocument::into_quiz).collect()
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let values = self.collection.distinct("category", None, None).await?;
        Ok(values
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect())
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Quiz>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .map(QuizDocument::into_quiz)
            .transpose()
    }

    async fn create(&self, quiz: NewQuiz) -> Result<Quiz> {
        // BSON dates hold milliseconds; truncate now so the returned record
        // matches what a later read produces
        let now = bson::DateTime::now().to_chrono();
        let mut document = QuizDocument::new(quiz, now);

        let result = self.collection.insert_one(&document, None).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Internal("insert returned a non-ObjectId _id".to_string()))?;

        document.id = Some(id);
        document.into_quiz()
    }

    async fn update(&self, id: ObjectId, update: QuizUpdate) -> Result<Option<Quiz>> {
        let mut set = bson::to_document(&update)?;
        set.insert("updatedAt", bson::DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?
            .map(QuizDocument::into_quiz)
            .transpose()
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<Quiz>> {
        self.collection
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?
            .map(QuizDocument::into_quiz)
            .transpose()
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}
