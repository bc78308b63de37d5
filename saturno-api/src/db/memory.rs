//! In-process quiz store

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use saturno_common::{NewQuiz, Quiz, QuizUpdate, Result};
use tokio::sync::RwLock;

use super::QuizStore;

/// Quiz store backed by a `HashMap`, nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryQuizStore {
    quizzes: RwLock<HashMap<ObjectId, Quiz>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.quizzes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.quizzes.read().await.is_empty()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn list(&self) -> Result<Vec<Quiz>> {
        let mut quizzes: Vec<Quiz> = self.quizzes.read().await.values().cloned().collect();
        // Object ids grow monotonically, so they break timestamp ties
        quizzes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(quizzes)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let quizzes = self.quizzes.read().await;
        let distinct: BTreeSet<&str> = quizzes.values().map(|q| q.category.as_str()).collect();
        Ok(distinct.into_iter().map(str::to_string).collect())
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(&id).cloned())
    }

    async fn create(&self, quiz: NewQuiz) -> Result<Quiz> {
        let id = ObjectId::new();
        let quiz = quiz.into_quiz(id.to_hex(), Utc::now());
        self.quizzes.write().await.insert(id, quiz.clone());
        Ok(quiz)
    }

    async fn update(&self, id: ObjectId, update: QuizUpdate) -> Result<Option<Quiz>> {
        let mut quizzes = self.quizzes.write().await;
        Ok(quizzes.get_mut(&id).map(|quiz| {
            update.apply_to(quiz, Utc::now());
            quiz.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<Quiz>> {
        Ok(self.quizzes.write().await.remove(&id))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
