//! Shared fixtures for service-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use notehub_core::traits::clock::Clock;
use notehub_core::traits::store::DocumentStore;
use notehub_core::types::{DirectoryId, DocumentId, RuleId, UserId};
use notehub_entity::directory::Directory;
use notehub_entity::document::{self, Document};
use notehub_entity::rule::{OperationKind, Rule, RuleColor};
use notehub_service::directory::{CreateDirectoryRequest, DirectoryService, TreeService};
use notehub_service::rule::{CreateRuleRequest, PromptFormatter, ResolutionService, RuleService};
use notehub_service::RequestContext;
use notehub_store::{MemoryStore, StoreDocumentCatalog};

/// A clock pinned to a fixed instant for deterministic timestamps.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// All services wired over one in-memory store.
pub struct TestApp {
    pub store: Arc<dyn DocumentStore>,
    pub ctx: RequestContext,
    pub directories: DirectoryService,
    pub tree: TreeService,
    pub rules: RuleService,
    pub resolution: ResolutionService,
    pub prompt: PromptFormatter,
}

impl TestApp {
    pub fn new() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let catalog = Arc::new(StoreDocumentCatalog::new(store.clone()));
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));

        Self {
            ctx: RequestContext::new(UserId::new()),
            directories: DirectoryService::new(store.clone(), catalog.clone(), clock.clone()),
            tree: TreeService::new(store.clone()),
            rules: RuleService::new(store.clone(), clock),
            resolution: ResolutionService::new(store.clone()),
            prompt: PromptFormatter::new(store.clone()),
            store,
        }
    }

    /// A context for a different user, for isolation tests.
    pub fn other_user(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Create a directory through the service.
    pub async fn mkdir(&self, name: &str, parent_id: Option<DirectoryId>) -> Directory {
        self.directories
            .create(
                &self.ctx,
                CreateDirectoryRequest {
                    name: name.to_string(),
                    parent_id,
                    color: None,
                    icon: None,
                },
            )
            .await
            .expect("create directory")
    }

    /// Create a rule through the service.
    pub async fn mkrule(&self, name: &str, applicable_to: Vec<OperationKind>) -> Rule {
        self.mkrule_with(name, applicable_to, false).await
    }

    pub async fn mkrule_with(
        &self,
        name: &str,
        applicable_to: Vec<OperationKind>,
        is_default: bool,
    ) -> Rule {
        self.rules
            .create(
                &self.ctx,
                CreateRuleRequest {
                    name: name.to_string(),
                    description: String::new(),
                    content: format!("Follow the {name} rule."),
                    color: RuleColor::Blue,
                    tags: Vec::new(),
                    applicable_to,
                    is_default,
                },
            )
            .await
            .expect("create rule")
    }

    /// Seed a document record directly into the store, standing in for
    /// the out-of-scope document subsystem.
    pub async fn seed_document(&self, directory_id: Option<DirectoryId>, title: &str) -> Document {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let doc = Document {
            id: DocumentId::new(),
            owner_id: self.ctx.user_id,
            directory_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.store
            .put(
                document::COLLECTION,
                &doc.id.to_string(),
                serde_json::to_value(&doc).expect("encode document"),
            )
            .await
            .expect("seed document");
        doc
    }

    /// Attach a rule to a directory.
    pub async fn attach(&self, rule_id: RuleId, directory_id: DirectoryId) {
        self.rules
            .attach_to_directory(&self.ctx, rule_id, directory_id)
            .await
            .expect("attach rule");
    }
}
