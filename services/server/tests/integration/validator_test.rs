use uuid::Uuid;

use lineup_auth_types::principal::Principal;
use lineup_domain::event::SecurityLevel;

use lineup_server::error::ServerError;
use lineup_server::security::log::{
    CROSS_TENANT_ACCESS_ATTEMPT, CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT, LEGACY_MERCHANT_ACCESS,
    MISSING_USER_OR_TENANT_CONTEXT, VALID_MERCHANT_ACCESS, VALID_TENANT_ACCESS,
};
use lineup_server::security::validator::TenantValidator;

use crate::helpers::{MockMembershipRepo, capturing_log, test_membership, test_tenant};

fn merchant(tenant_id: Option<Uuid>) -> Principal {
    Principal::Merchant {
        id: Uuid::new_v4(),
        tenant_id,
        business_name: "Cafe Nord".to_owned(),
    }
}

#[tokio::test]
async fn should_allow_merchant_in_own_tenant() {
    let tenant = test_tenant("acme");
    let (log, sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::empty(),
        log,
    };

    validator
        .validate(Some(&merchant(Some(tenant.id))), Some(&tenant))
        .await
        .unwrap();

    assert_eq!(sink.names(), vec![VALID_MERCHANT_ACCESS]);
}

#[tokio::test]
async fn should_allow_legacy_merchant_with_warning() {
    let tenant = test_tenant("acme");
    let (log, sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::empty(),
        log,
    };

    validator
        .validate(Some(&merchant(None)), Some(&tenant))
        .await
        .unwrap();

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, LEGACY_MERCHANT_ACCESS);
    assert_eq!(events[0].level, SecurityLevel::Warning);
}

#[tokio::test]
async fn should_deny_merchant_from_foreign_tenant() {
    let tenant = test_tenant("acme");
    let (log, sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::empty(),
        log,
    };

    let result = validator
        .validate(Some(&merchant(Some(Uuid::new_v4()))), Some(&tenant))
        .await;

    assert!(matches!(result, Err(ServerError::MerchantAccessDenied)));
    let events = sink.events.lock().unwrap();
    assert_eq!(events[0].name, CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT);
    assert_eq!(events[0].level, SecurityLevel::Critical);
}

#[tokio::test]
async fn should_allow_user_with_active_membership() {
    let tenant = test_tenant("acme");
    let user_id = Uuid::new_v4();
    let (log, sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::new(vec![test_membership(user_id, tenant.id)]),
        log,
    };

    let principal = Principal::TenantUser {
        id: user_id,
        tenant_id: Some(tenant.id),
    };
    validator
        .validate(Some(&principal), Some(&tenant))
        .await
        .unwrap();

    assert_eq!(sink.names(), vec![VALID_TENANT_ACCESS]);
}

#[tokio::test]
async fn should_deny_user_without_membership() {
    let tenant = test_tenant("acme");
    let user_id = Uuid::new_v4();
    let (log, sink) = capturing_log();
    // Membership exists for a different tenant only.
    let validator = TenantValidator {
        memberships: MockMembershipRepo::new(vec![test_membership(user_id, Uuid::new_v4())]),
        log,
    };

    let principal = Principal::TenantUser {
        id: user_id,
        tenant_id: None,
    };
    let result = validator.validate(Some(&principal), Some(&tenant)).await;

    assert!(matches!(result, Err(ServerError::TenantAccessDenied)));
    let events = sink.events.lock().unwrap();
    assert_eq!(events[0].name, CROSS_TENANT_ACCESS_ATTEMPT);
    assert_eq!(events[0].user_id, Some(user_id));
}

#[tokio::test]
async fn should_deny_inactive_membership() {
    let tenant = test_tenant("acme");
    let user_id = Uuid::new_v4();
    let mut membership = test_membership(user_id, tenant.id);
    membership.is_active = false;
    let (log, _sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::new(vec![membership]),
        log,
    };

    let principal = Principal::TenantUser {
        id: user_id,
        tenant_id: Some(tenant.id),
    };
    let result = validator.validate(Some(&principal), Some(&tenant)).await;
    assert!(matches!(result, Err(ServerError::TenantAccessDenied)));
}

#[tokio::test]
async fn should_deny_missing_context() {
    let tenant = test_tenant("acme");
    let (log, sink) = capturing_log();
    let validator = TenantValidator {
        memberships: MockMembershipRepo::empty(),
        log,
    };

    let result = validator.validate(None, Some(&tenant)).await;
    assert!(matches!(result, Err(ServerError::TenantAccessDenied)));

    let result = validator.validate(Some(&merchant(None)), None).await;
    assert!(matches!(result, Err(ServerError::TenantAccessDenied)));

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(
        events
            .iter()
            .all(|e| e.name == MISSING_USER_OR_TENANT_CONTEXT
                && e.level == SecurityLevel::Critical)
    );
}
