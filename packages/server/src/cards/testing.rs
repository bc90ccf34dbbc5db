//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::storage::{ObjectStore, StorageError};
use common::{CardStatus, Vibe};
use sea_orm::DbErr;
use serde_json::json;

use super::{
    CardRepository, CardService, CreateCard, NewCard, PublicCard, Requester,
};
use crate::config::{CardConfig, RateLimitConfig};
use crate::entity::{card, occasion};
use crate::generation::{GenerationError, ImageGenerator, TextGenerator};
use crate::rate_limit::RateLimiter;

pub(crate) fn occasion(id: &str, name: &str, is_active: bool) -> occasion::Model {
    occasion::Model {
        id: id.into(),
        name: name.into(),
        is_active,
        style_guide: json!({ "tone": "festive" }),
        font_set: json!(["Montserrat"]),
        created_at: Utc::now(),
    }
}

pub(crate) fn card_expiring_at(id: &str, expires_at: DateTime<Utc>) -> card::Model {
    card::Model {
        id: id.into(),
        slug: format!("s-{id}"),
        occasion_id: "christmas".into(),
        vibe: Vibe::Warm,
        clean_message: "Warm wishes".into(),
        source_message: "Happy holidays!".into(),
        cover_image_url: format!("https://cdn.test/cards/{id}/cover-1.png"),
        theme_version: "1.0".into(),
        status: CardStatus::Draft,
        created_at: expires_at - chrono::Duration::days(30),
        expires_at,
        creator_hash: "0123456789abcdef".into(),
    }
}

#[derive(Default)]
pub(crate) struct MemoryCardRepository {
    cards: Mutex<HashMap<String, card::Model>>,
    occasions: Mutex<Vec<occasion::Model>>,
    failing_deletes: Mutex<HashSet<String>>,
    vanishing: Mutex<HashSet<String>>,
}

impl MemoryCardRepository {
    pub fn with_occasions(occasions: Vec<occasion::Model>) -> Self {
        Self {
            occasions: Mutex::new(occasions),
            ..Default::default()
        }
    }

    pub fn put(&self, card: card::Model) {
        self.cards.lock().unwrap().insert(card.id.clone(), card);
    }

    pub fn get(&self, id: &str) -> Option<card::Model> {
        self.cards.lock().unwrap().get(id).cloned()
    }

    pub fn card_count(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    pub fn set_expires_at(&self, id: &str, expires_at: DateTime<Utc>) {
        if let Some(card) = self.cards.lock().unwrap().get_mut(id) {
            card.expires_at = expires_at;
        }
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.into());
    }

    /// Another sweeper removes the row between listing and deleting it.
    pub fn remove_before_delete(&self, id: &str) {
        self.vanishing.lock().unwrap().insert(id.into());
    }

    fn update_draft(&self, id: &str, f: impl FnOnce(&mut card::Model)) -> bool {
        match self.cards.lock().unwrap().get_mut(id) {
            Some(card) if card.status == CardStatus::Draft => {
                f(card);
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl CardRepository for MemoryCardRepository {
    async fn find_occasion(&self, id: &str) -> Result<Option<occasion::Model>, DbErr> {
        Ok(self
            .occasions
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list_active_occasions(&self) -> Result<Vec<occasion::Model>, DbErr> {
        let mut active: Vec<_> = self
            .occasions
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        Ok(self.cards.lock().unwrap().values().any(|c| c.slug == slug))
    }

    async fn insert_card(&self, new: NewCard) -> Result<card::Model, DbErr> {
        let model = card::Model {
            id: new.id,
            slug: new.slug,
            occasion_id: new.occasion_id,
            vibe: new.vibe,
            clean_message: new.clean_message,
            source_message: new.source_message,
            cover_image_url: new.cover_image_url,
            theme_version: new.theme_version,
            status: CardStatus::Draft,
            created_at: new.created_at,
            expires_at: new.expires_at,
            creator_hash: new.creator_hash,
        };
        self.put(model.clone());
        Ok(model)
    }

    async fn find_card(&self, id: &str) -> Result<Option<card::Model>, DbErr> {
        Ok(self.get(id))
    }

    async fn find_by_slug(
        &self,
        occasion_id: &str,
        slug: &str,
    ) -> Result<Option<PublicCard>, DbErr> {
        let card = self
            .cards
            .lock()
            .unwrap()
            .values()
            .find(|c| c.occasion_id == occasion_id && c.slug == slug)
            .cloned();
        let Some(card) = card else {
            return Ok(None);
        };
        let occasion_name = self
            .find_occasion(&card.occasion_id)
            .await?
            .map(|o| o.name)
            .unwrap_or_else(|| card.occasion_id.clone());
        Ok(Some(PublicCard {
            card,
            occasion_name,
        }))
    }

    async fn update_cover(&self, id: &str, cover_image_url: &str) -> Result<bool, DbErr> {
        Ok(self.update_draft(id, |c| c.cover_image_url = cover_image_url.into()))
    }

    async fn update_message(
        &self,
        id: &str,
        clean_message: &str,
        source_message: &str,
    ) -> Result<bool, DbErr> {
        Ok(self.update_draft(id, |c| {
            c.clean_message = clean_message.into();
            c.source_message = source_message.into();
        }))
    }

    async fn mark_published(&self, id: &str) -> Result<bool, DbErr> {
        Ok(self.update_draft(id, |c| c.status = CardStatus::Published))
    }

    async fn delete_card(&self, id: &str) -> Result<bool, DbErr> {
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(DbErr::Custom(format!("delete of {id} refused")));
        }
        if self.vanishing.lock().unwrap().contains(id) {
            self.cards.lock().unwrap().remove(id);
            return Ok(false);
        }
        Ok(self.cards.lock().unwrap().remove(id).is_some())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<card::Model>, DbErr> {
        let mut expired: Vec<_> = self
            .cards
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.expires_at < now)
            .cloned()
            .collect();
        expired.sort_by_key(|c| c.expires_at);
        Ok(expired)
    }
}

#[derive(Default)]
pub(crate) struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn insert(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.into(), b"png".to_vec());
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(key.into(), data);
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("bucket unreachable".into()));
        }
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{key}")
    }
}

/// Echoes the message back with a prefix, or fails once when primed.
#[derive(Default)]
pub(crate) struct FakeText {
    calls: AtomicU32,
    last: Mutex<Option<String>>,
    next_error: Mutex<Option<GenerationError>>,
}

impl FakeText {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: GenerationError) {
        *self.next_error.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn rewrite_text(
        &self,
        message: &str,
        _vibe: Vibe,
        _occasion: &str,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(message.to_string());
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(format!("Rewritten: {message}"))
    }
}

#[derive(Default)]
pub(crate) struct FakeImages {
    next_error: Mutex<Option<GenerationError>>,
}

impl FakeImages {
    pub fn fail_next(&self, err: GenerationError) {
        *self.next_error.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, _vibe: Vibe, _occasion: &str) -> Result<Vec<u8>, GenerationError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}

pub(crate) struct Harness {
    pub service: CardService,
    pub repo: Arc<MemoryCardRepository>,
    pub store: Arc<MemoryObjectStore>,
    pub text: Arc<FakeText>,
    pub images: Arc<FakeImages>,
    drafts: AtomicU32,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_card_config(&CardConfig::default())
    }

    pub fn with_card_config(card_config: &CardConfig) -> Self {
        let repo = Arc::new(MemoryCardRepository::with_occasions(vec![
            occasion("hanukkah", "Hanukkah", true),
            occasion("christmas", "Christmas", true),
            occasion("retired", "Retired", false),
        ]));
        let store = Arc::new(MemoryObjectStore::default());
        let text = Arc::new(FakeText::default());
        let images = Arc::new(FakeImages::default());

        let service = CardService::new(
            repo.clone(),
            store.clone(),
            text.clone(),
            images.clone(),
            RateLimiter::from_config(&RateLimitConfig::default()),
            card_config,
        );

        Self {
            service,
            repo,
            store,
            text,
            images,
            drafts: AtomicU32::new(0),
        }
    }

    /// A fresh draft from a client that has not hit any limit yet.
    pub async fn draft(&self) -> card::Model {
        let n = self.drafts.fetch_add(1, Ordering::SeqCst);
        self.service
            .create_card(
                CreateCard {
                    occasion: "christmas".into(),
                    vibe: "warm".into(),
                    message: "Happy holidays!".into(),
                },
                &Requester::new(format!("192.0.2.{n}"), "test-agent"),
            )
            .await
            .unwrap()
            .card
    }
}
