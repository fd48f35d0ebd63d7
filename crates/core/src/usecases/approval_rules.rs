//! Rule configuration: upsert per scope, partial update, soft (de)activation.

use std::sync::Arc;

use serde::Deserialize;

use crate::approval::{
    validate_max_attempts, validate_threshold, ApprovalRule, ApprovalRuleChanges,
    NewApprovalRule, DEFAULT_MAX_ATTEMPTS,
};
use crate::error::CoreError;
use crate::store::ApprovalRuleStore;
use crate::types::DbId;
use crate::validation::validate_chapter_key;

const ENTITY: &str = "ApprovalRule";

fn default_max_attempts() -> i32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_true() -> bool {
    true
}

/// Rule definition for [`ConfigureApprovalRule`].
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRuleInput {
    /// `None` configures the global rule.
    pub chapter_id: Option<String>,
    pub min_score_threshold: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    #[serde(default)]
    pub allow_error_carryover: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Create the rule for a scope, or update the one it already holds.
///
/// Scalar settings are always replaced. An omitted `description` or
/// `metadata` keeps the stored value. A scope never holds two rules.
pub struct ConfigureApprovalRule {
    rules: Arc<dyn ApprovalRuleStore>,
}

impl ConfigureApprovalRule {
    pub fn new(rules: Arc<dyn ApprovalRuleStore>) -> Self {
        Self { rules }
    }

    pub async fn execute(&self, input: ConfigureRuleInput) -> Result<ApprovalRule, CoreError> {
        validate_threshold(input.min_score_threshold)?;
        validate_max_attempts(input.max_attempts)?;
        if let Some(chapter_id) = &input.chapter_id {
            validate_chapter_key(chapter_id)?;
        }

        let existing = self
            .rules
            .find_rule_for_scope(input.chapter_id.as_deref())
            .await?;

        if let Some(existing) = existing {
            let changes = ApprovalRuleChanges {
                min_score_threshold: Some(input.min_score_threshold),
                max_attempts: Some(input.max_attempts),
                allow_error_carryover: Some(input.allow_error_carryover),
                is_active: Some(input.is_active),
                metadata: input.metadata,
                description: input.description,
            };
            let rule = self
                .rules
                .update_rule(existing.id, &changes)
                .await?
                .ok_or_else(|| CoreError::not_found(ENTITY, existing.id))?;
            tracing::info!(rule_id = rule.id, chapter_id = ?rule.chapter_id, "Approval rule updated");
            return Ok(rule);
        }

        let rule = self
            .rules
            .create_rule(&NewApprovalRule {
                chapter_id: input.chapter_id,
                min_score_threshold: input.min_score_threshold,
                max_attempts: input.max_attempts,
                allow_error_carryover: input.allow_error_carryover,
                is_active: input.is_active,
                metadata: input.metadata,
                description: input.description,
            })
            .await?;
        tracing::info!(rule_id = rule.id, chapter_id = ?rule.chapter_id, "Approval rule created");
        Ok(rule)
    }
}

/// Merge a partial change set into an existing rule.
pub struct UpdateApprovalRule {
    rules: Arc<dyn ApprovalRuleStore>,
}

impl UpdateApprovalRule {
    pub fn new(rules: Arc<dyn ApprovalRuleStore>) -> Self {
        Self { rules }
    }

    pub async fn execute(
        &self,
        id: DbId,
        changes: ApprovalRuleChanges,
    ) -> Result<ApprovalRule, CoreError> {
        if let Some(threshold) = changes.min_score_threshold {
            validate_threshold(threshold)?;
        }
        if let Some(max_attempts) = changes.max_attempts {
            validate_max_attempts(max_attempts)?;
        }

        let rule = self
            .rules
            .update_rule(id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        tracing::info!(rule_id = rule.id, "Approval rule modified");
        Ok(rule)
    }
}

/// Soft activation toggle. Rules are never deleted.
pub struct SetApprovalRuleActive {
    rules: Arc<dyn ApprovalRuleStore>,
}

impl SetApprovalRuleActive {
    pub fn new(rules: Arc<dyn ApprovalRuleStore>) -> Self {
        Self { rules }
    }

    pub async fn execute(&self, id: DbId, active: bool) -> Result<ApprovalRule, CoreError> {
        let changes = ApprovalRuleChanges {
            is_active: Some(active),
            ..Default::default()
        };
        let rule = self
            .rules
            .update_rule(id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        tracing::info!(rule_id = rule.id, active, "Approval rule activation changed");
        Ok(rule)
    }
}

/// Fetch one rule by id.
pub struct GetApprovalRule {
    rules: Arc<dyn ApprovalRuleStore>,
}

impl GetApprovalRule {
    pub fn new(rules: Arc<dyn ApprovalRuleStore>) -> Self {
        Self { rules }
    }

    pub async fn execute(&self, id: DbId) -> Result<ApprovalRule, CoreError> {
        self.rules
            .find_rule(id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::usecases::memory::MemoryStore;

    fn input(chapter: Option<&str>, threshold: f64) -> ConfigureRuleInput {
        ConfigureRuleInput {
            chapter_id: chapter.map(str::to_string),
            min_score_threshold: threshold,
            max_attempts: 3,
            allow_error_carryover: false,
            is_active: true,
            description: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn thresholds_within_range_configure() {
        let store = Arc::new(MemoryStore::default());
        let uc = ConfigureApprovalRule::new(store);
        for t in [0.0, 50.0, 80.0, 100.0] {
            let rule = uc.execute(input(Some("1"), t)).await.unwrap();
            assert_eq!(rule.min_score_threshold, t);
        }
    }

    #[tokio::test]
    async fn thresholds_out_of_range_fail() {
        let uc = ConfigureApprovalRule::new(Arc::new(MemoryStore::default()));
        assert_matches!(uc.execute(input(Some("1"), -1.0)).await, Err(CoreError::Validation(_)));
        assert_matches!(uc.execute(input(Some("1"), 101.0)).await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_chapter_and_attempts_fail() {
        let uc = ConfigureApprovalRule::new(Arc::new(MemoryStore::default()));
        assert_matches!(uc.execute(input(Some(""), 80.0)).await, Err(CoreError::Validation(_)));
        assert_matches!(
            uc.execute(input(Some("bad key"), 80.0)).await,
            Err(CoreError::Validation(_))
        );

        let mut too_many = input(Some("1"), 80.0);
        too_many.max_attempts = 11;
        assert_matches!(uc.execute(too_many).await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn same_scope_is_updated_in_place() {
        let store = Arc::new(MemoryStore::default());
        let uc = ConfigureApprovalRule::new(store.clone());

        let first = uc.execute(input(Some("4"), 90.0)).await.unwrap();
        let second = uc.execute(input(Some("4"), 100.0)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.min_score_threshold, 100.0);

        let global = uc.execute(input(None, 70.0)).await.unwrap();
        assert_ne!(global.id, first.id);
        assert!(global.is_global());

        assert_eq!(store.list_active_rules().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reconfigure_keeps_omitted_description() {
        let store = Arc::new(MemoryStore::default());
        let uc = ConfigureApprovalRule::new(store);

        let mut described = input(Some("3"), 80.0);
        described.description = Some("Listening unit".into());
        described.metadata = Some(serde_json::json!({ "level": "b1" }));
        uc.execute(described).await.unwrap();

        let rule = uc.execute(input(Some("3"), 85.0)).await.unwrap();
        assert_eq!(rule.min_score_threshold, 85.0);
        assert_eq!(rule.description.as_deref(), Some("Listening unit"));
        assert_eq!(rule.metadata, Some(serde_json::json!({ "level": "b1" })));
    }

    #[tokio::test]
    async fn update_merges_supplied_fields() {
        let store = Arc::new(MemoryStore::default());
        let rule = ConfigureApprovalRule::new(store.clone())
            .execute(input(Some("2"), 80.0))
            .await
            .unwrap();

        let updated = UpdateApprovalRule::new(store)
            .execute(
                rule.id,
                ApprovalRuleChanges {
                    max_attempts: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.max_attempts, 5);
        assert_eq!(updated.min_score_threshold, 80.0);
        assert_eq!(updated.chapter_id.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn update_unknown_or_invalid() {
        let store = Arc::new(MemoryStore::default());
        let uc = UpdateApprovalRule::new(store.clone());
        assert_matches!(
            uc.execute(999, ApprovalRuleChanges::default()).await,
            Err(CoreError::NotFound { .. })
        );

        let rule = ConfigureApprovalRule::new(store)
            .execute(input(None, 80.0))
            .await
            .unwrap();
        let bad = ApprovalRuleChanges {
            min_score_threshold: Some(120.0),
            ..Default::default()
        };
        assert_matches!(uc.execute(rule.id, bad).await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn deactivate_then_activate() {
        let store = Arc::new(MemoryStore::default());
        let rule = ConfigureApprovalRule::new(store.clone())
            .execute(input(Some("3"), 80.0))
            .await
            .unwrap();
        let toggle = SetApprovalRuleActive::new(store.clone());

        let off = toggle.execute(rule.id, false).await.unwrap();
        assert!(!off.is_active);
        assert!(store.list_active_rules().await.unwrap().is_empty());

        let on = toggle.execute(rule.id, true).await.unwrap();
        assert!(on.is_active);

        assert_matches!(toggle.execute(404, true).await, Err(CoreError::NotFound { .. }));
        assert_matches!(
            GetApprovalRule::new(store).execute(404).await,
            Err(CoreError::NotFound { .. })
        );
    }
}
