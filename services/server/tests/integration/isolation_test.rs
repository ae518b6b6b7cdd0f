use uuid::Uuid;

use lineup_auth_types::principal::Principal;
use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::{Tenant, TenantScope};

use lineup_server::domain::repository::MerchantRepository;
use lineup_server::error::ServerError;
use lineup_server::security::log::{
    CROSS_TENANT_HEADER_ATTEMPT, CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT, SecurityLog,
};
use lineup_server::security::middleware::IsolationService;
use lineup_server::security::resolver::{ResolutionSignals, TenantResolver};
use lineup_server::security::validator::TenantValidator;

use crate::helpers::{
    CapturingSink, MockMembershipRepo, MockMerchantRepo, MockTenantRepo, test_membership,
    test_merchant, test_tenant,
};

fn isolation(
    tenants: Vec<Tenant>,
    memberships: MockMembershipRepo,
) -> (
    IsolationService<MockTenantRepo, MockMembershipRepo, CapturingSink>,
    CapturingSink,
) {
    let sink = CapturingSink::default();
    let service = IsolationService {
        resolver: TenantResolver {
            tenants: MockTenantRepo::new(tenants),
            log: SecurityLog::new(sink.clone()),
        },
        validator: TenantValidator {
            memberships,
            log: SecurityLog::new(sink.clone()),
        },
        log: SecurityLog::new(sink.clone()),
    };
    (service, sink)
}

fn subdomain_signals(slug: &str) -> ResolutionSignals {
    ResolutionSignals {
        tenant_header: None,
        host: Some(format!("{slug}.lineup.app")),
    }
}

// Scenario: a merchant of tenant A sends tenant B's id in the header. The
// header is overridden, the request lands in tenant A, and the attempt is
// recorded.

#[tokio::test]
async fn should_pin_spoofed_header_to_principal_tenant() {
    let tenant_a = test_tenant("alpha");
    let tenant_b = test_tenant("beta");
    let (service, sink) = isolation(
        vec![tenant_a.clone(), tenant_b.clone()],
        MockMembershipRepo::empty(),
    );

    let principal = Principal::Merchant {
        id: Uuid::new_v4(),
        tenant_id: Some(tenant_a.id),
        business_name: "Alpha Shop".to_owned(),
    };
    let signals = ResolutionSignals {
        tenant_header: Some(tenant_b.id.to_string()),
        host: None,
    };

    let resolved = service.run(&signals, Some(&principal)).await.unwrap();
    assert_eq!(resolved.tenant.id, tenant_a.id);
    assert!(sink.names().contains(&CROSS_TENANT_HEADER_ATTEMPT));
}

// Scenario: a merchant of tenant A arrives on tenant B's subdomain. The
// tenant resolves to B, validation then denies the mismatch.

#[tokio::test]
async fn should_deny_merchant_on_foreign_subdomain() {
    let tenant_a = test_tenant("alpha");
    let tenant_b = test_tenant("beta");
    let (service, sink) = isolation(
        vec![tenant_a.clone(), tenant_b.clone()],
        MockMembershipRepo::empty(),
    );

    let principal = Principal::Merchant {
        id: Uuid::new_v4(),
        tenant_id: Some(tenant_a.id),
        business_name: "Alpha Shop".to_owned(),
    };

    let result = service
        .run(&subdomain_signals("beta"), Some(&principal))
        .await;
    assert!(matches!(result, Err(ServerError::MerchantAccessDenied)));
    assert!(sink.names().contains(&CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT));
}

// Scenario: an unauthenticated visitor joins a queue through the tenant's
// subdomain. Resolution succeeds and validation is skipped.

#[tokio::test]
async fn should_pass_unauthenticated_request_after_resolution() {
    let tenant = test_tenant("alpha");
    let (service, sink) = isolation(vec![tenant.clone()], MockMembershipRepo::empty());

    let resolved = service.run(&subdomain_signals("alpha"), None).await.unwrap();
    assert_eq!(resolved.tenant.id, tenant.id);
    // Only the resolution event; no validation outcome.
    assert_eq!(sink.events.lock().unwrap().len(), 1);
}

// Concurrent requests for different tenants must not leak state into each
// other: the service holds nothing mutable between calls.

#[tokio::test]
async fn should_isolate_concurrent_requests_across_tenants() {
    let tenant_a = test_tenant("alpha");
    let tenant_b = test_tenant("beta");
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let (service, _sink) = isolation(
        vec![tenant_a.clone(), tenant_b.clone()],
        MockMembershipRepo::new(vec![
            test_membership(user_a, tenant_a.id),
            test_membership(user_b, tenant_b.id),
        ]),
    );

    let mut tasks = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        let (slug, tenant_id, user_id) = if i % 2 == 0 {
            ("alpha", tenant_a.id, user_a)
        } else {
            ("beta", tenant_b.id, user_b)
        };
        tasks.push(tokio::spawn(async move {
            let principal = Principal::TenantUser {
                id: user_id,
                tenant_id: Some(tenant_id),
            };
            let resolved = service
                .run(&subdomain_signals(slug), Some(&principal))
                .await
                .unwrap();
            assert_eq!(resolved.tenant.id, tenant_id);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}

// ── Scoped data access ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_foreign_rows_from_scoped_reads() {
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let own = test_merchant(Some(tenant_a));
    let foreign = test_merchant(Some(tenant_b));
    let repo = MockMerchantRepo::new(vec![own.clone(), foreign.clone()]);

    let scope = TenantScope::Scoped(tenant_a);
    assert!(repo.find_scoped(scope, own.id).await.unwrap().is_some());
    assert!(repo.find_scoped(scope, foreign.id).await.unwrap().is_none());

    let listed = repo.list_scoped(scope, PageRequest::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, own.id);
}

#[tokio::test]
async fn should_keep_legacy_rows_visible_to_every_tenant() {
    let legacy = test_merchant(None);
    let repo = MockMerchantRepo::new(vec![legacy.clone()]);

    for _ in 0..3 {
        let scope = TenantScope::Scoped(Uuid::new_v4());
        assert!(repo.find_scoped(scope, legacy.id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn should_tag_scoped_writes_with_the_scope_tenant() {
    let tenant = Uuid::new_v4();
    let repo = MockMerchantRepo::default();

    let created = repo
        .create_tagged(
            TenantScope::Scoped(tenant),
            &lineup_server::domain::types::NewMerchant {
                email: "owner@cafe.example".to_owned(),
                business_name: "Cafe Nord".to_owned(),
                password_hash: "x".to_owned(),
                phone: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.tenant_id, Some(tenant));
}
