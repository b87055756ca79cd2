//! Activation code service.
//!
//! A code grants a tenant its subscription tier. Redemption is blocked by
//! either of two independent conditions: the code has passed `expires_at`
//! (derived from the clock, never stored) or an administrator has revoked
//! it.

use chrono::{DateTime, Utc};
use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::{activation_code, tier};
use crm_db::query::FilterRequest;
use crm_db::repositories::{ActivationCodeRepository, NewActivationCode, TierRepository};
use serde::Deserialize;
use validator::Validate;

/// Input for generating a batch of activation codes.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateCodesInput {
    pub tier_id: String,

    #[validate(range(min = 1, max = 100))]
    pub count: u32,

    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for activation codes.
#[derive(Clone)]
pub struct ActivationCodeService {
    code_repo: ActivationCodeRepository,
    tier_repo: TierRepository,
    id_gen: IdGenerator,
}

impl ActivationCodeService {
    /// Create a new activation code service.
    #[must_use]
    pub fn new(code_repo: ActivationCodeRepository, tier_repo: TierRepository) -> Self {
        Self {
            code_repo,
            tier_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List codes of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<activation_code::Model>, u64)> {
        self.code_repo.list(tenant_id, request, limit, offset).await
    }

    /// Get a code by ID.
    pub async fn get(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> AppResult<Option<activation_code::Model>> {
        self.code_repo.find_by_id(tenant_id, id).await
    }

    /// Generate a batch of codes for a tier.
    pub async fn generate(
        &self,
        tenant_id: &str,
        input: GenerateCodesInput,
    ) -> AppResult<Vec<activation_code::Model>> {
        input.validate()?;

        let tier = self
            .tier_repo
            .find_by_id(&input.tier_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown tier: {}", input.tier_id)))?;
        if !tier.is_active {
            return Err(AppError::BadRequest(format!(
                "Tier '{}' is closed for subscription",
                tier.name
            )));
        }

        let batch: Vec<NewActivationCode> = (0..input.count)
            .map(|_| NewActivationCode {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                code: self.id_gen.generate_token(),
                tier_id: tier.id.clone(),
                expires_at: input.expires_at,
            })
            .collect();

        let codes = self.code_repo.create_many(batch).await?;
        tracing::info!(
            tenant_id = tenant_id,
            tier_id = %tier.id,
            count = codes.len(),
            "Activation codes generated"
        );
        Ok(codes)
    }

    /// Redeem a code for a user, marking it used.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: &str,
    ) -> AppResult<activation_code::Model> {
        let model = self
            .code_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Activation code not found".to_string()))?;

        check_redeemable(&model, Utc::now())?;

        let model = self.code_repo.mark_used(model, user_id).await?;
        tracing::info!(code_id = %model.id, user_id = user_id, "Activation code redeemed");
        Ok(model)
    }

    /// Set or clear the administrative revocation flag.
    pub async fn set_revoked(
        &self,
        tenant_id: &str,
        id: &str,
        is_revoked: bool,
    ) -> AppResult<activation_code::Model> {
        let model = self
            .code_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activation code not found: {id}")))?;

        let model = self.code_repo.set_revoked(model, is_revoked).await?;
        tracing::info!(code_id = %model.id, is_revoked = is_revoked, "Activation code revocation changed");
        Ok(model)
    }

    /// The tenant's current tier, derived from its latest redeemed code.
    pub async fn current_tier(&self, tenant_id: &str) -> AppResult<Option<tier::Model>> {
        let Some(code) = self.code_repo.find_latest_redeemed(tenant_id).await? else {
            return Ok(None);
        };
        self.tier_repo.find_by_id(&code.tier_id).await
    }
}

/// Whether a code can be redeemed at `now`. Expiry is derived from
/// `expires_at`; revocation is the stored administrative flag. Either one
/// blocks redemption on its own.
fn check_redeemable(code: &activation_code::Model, now: DateTime<Utc>) -> AppResult<()> {
    if code.is_revoked {
        return Err(AppError::Forbidden(
            "Activation code has been revoked".to_string(),
        ));
    }
    if code.expires_at.is_some_and(|at| at <= now) {
        return Err(AppError::BadRequest(
            "Activation code has expired".to_string(),
        ));
    }
    if code.used_at.is_some() {
        return Err(AppError::Conflict(
            "Activation code has already been redeemed".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(
        expires_at: Option<DateTime<Utc>>,
        is_revoked: bool,
        used: bool,
    ) -> activation_code::Model {
        let now = Utc::now();
        activation_code::Model {
            id: "ac1".to_string(),
            tenant_id: "t1".to_string(),
            code: "CODE".to_string(),
            tier_id: "basic".to_string(),
            used_at: used.then_some(now),
            used_by: used.then(|| "u1".to_string()),
            is_revoked,
            expires_at,
            created_at: now,
        }
    }

    #[test]
    fn test_fresh_code_is_redeemable() {
        let now = Utc::now();
        assert!(check_redeemable(&code(None, false, false), now).is_ok());
        assert!(check_redeemable(&code(Some(now + Duration::days(1)), false, false), now).is_ok());
    }

    #[test]
    fn test_expiry_is_derived_from_expires_at() {
        // The stored flag plays no part in expiry; a past expires_at alone
        // blocks redemption.
        let now = Utc::now();
        let expired = code(Some(now - Duration::seconds(1)), false, false);
        assert!(matches!(
            check_redeemable(&expired, now),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_revocation_blocks_an_unexpired_code() {
        let now = Utc::now();
        let revoked = code(Some(now + Duration::days(30)), true, false);
        assert!(matches!(
            check_redeemable(&revoked, now),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_used_code_cannot_be_redeemed_twice() {
        let now = Utc::now();
        assert!(matches!(
            check_redeemable(&code(None, false, true), now),
            Err(AppError::Conflict(_))
        ));
    }
}
