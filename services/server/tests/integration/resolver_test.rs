use chrono::Utc;
use uuid::Uuid;

use lineup_auth_types::principal::Principal;
use lineup_domain::event::SecurityLevel;

use lineup_server::error::ServerError;
use lineup_server::security::log::{
    CROSS_TENANT_HEADER_ATTEMPT, TENANT_INACTIVE, TENANT_NOT_FOUND, TENANT_RESOLVED,
};
use lineup_server::security::resolver::{ResolutionMethod, ResolutionSignals, TenantResolver};

use crate::helpers::{MockTenantRepo, capturing_log, test_tenant};

fn signals(tenant_header: Option<&str>, host: Option<&str>) -> ResolutionSignals {
    ResolutionSignals {
        tenant_header: tenant_header.map(str::to_owned),
        host: host.map(str::to_owned),
    }
}

#[tokio::test]
async fn should_resolve_from_header_first() {
    let header_tenant = test_tenant("acme");
    let other = test_tenant("other");
    let (log, sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![header_tenant.clone(), other.clone()]),
        log,
    };

    // Both a header and a matching subdomain for another tenant; header wins.
    let resolved = resolver
        .resolve(
            &signals(
                Some(&header_tenant.id.to_string()),
                Some("other.lineup.app"),
            ),
            None,
        )
        .await
        .unwrap();

    assert_eq!(resolved.tenant.id, header_tenant.id);
    assert_eq!(resolved.method, ResolutionMethod::Header);
    assert_eq!(sink.names(), vec![TENANT_RESOLVED]);
}

#[tokio::test]
async fn should_resolve_from_subdomain_when_no_header() {
    let tenant = test_tenant("acme");
    let (log, _sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![tenant.clone()]),
        log,
    };

    let resolved = resolver
        .resolve(&signals(None, Some("acme.lineup.app:443")), None)
        .await
        .unwrap();

    assert_eq!(resolved.tenant.id, tenant.id);
    assert_eq!(resolved.method, ResolutionMethod::Subdomain);
}

#[tokio::test]
async fn should_resolve_from_custom_domain() {
    let mut tenant = test_tenant("acme");
    tenant.domain = Some("queue.acme-corp.com".to_owned());
    let (log, _sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![tenant.clone()]),
        log,
    };

    let resolved = resolver
        .resolve(&signals(None, Some("queue.acme-corp.com")), None)
        .await
        .unwrap();

    assert_eq!(resolved.tenant.id, tenant.id);
    assert_eq!(resolved.method, ResolutionMethod::CustomDomain);
}

#[tokio::test]
async fn should_override_header_with_principal_tenant_and_log_critical() {
    let own_tenant = test_tenant("own");
    let foreign_tenant = test_tenant("foreign");
    let merchant_id = Uuid::new_v4();
    let (log, sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![own_tenant.clone(), foreign_tenant.clone()]),
        log,
    };

    let principal = Principal::Merchant {
        id: merchant_id,
        tenant_id: Some(own_tenant.id),
        business_name: "Cafe Nord".to_owned(),
    };
    let resolved = resolver
        .resolve(
            &signals(Some(&foreign_tenant.id.to_string()), None),
            Some(&principal),
        )
        .await
        .unwrap();

    // The spoofed header is discarded in favor of the principal's tenant.
    assert_eq!(resolved.tenant.id, own_tenant.id);

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, CROSS_TENANT_HEADER_ATTEMPT);
    assert_eq!(events[0].level, SecurityLevel::Critical);
    assert_eq!(events[0].merchant_id, Some(merchant_id));
    assert_eq!(events[1].name, TENANT_RESOLVED);
}

#[tokio::test]
async fn should_ignore_malformed_header_and_continue_chain() {
    let tenant = test_tenant("acme");
    let (log, _sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![tenant.clone()]),
        log,
    };

    let resolved = resolver
        .resolve(
            &signals(Some("not-a-uuid"), Some("acme.lineup.app")),
            None,
        )
        .await
        .unwrap();

    assert_eq!(resolved.method, ResolutionMethod::Subdomain);
}

#[tokio::test]
async fn should_reject_inactive_tenant_without_falling_through() {
    let mut inactive = test_tenant("closed");
    inactive.is_active = false;
    let fallback = test_tenant("fallback");
    let (log, sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![inactive.clone(), fallback]),
        log,
    };

    // An explicit candidate that is inactive fails; weaker signals must not
    // rescue the request.
    let result = resolver
        .resolve(&signals(Some(&inactive.id.to_string()), None), None)
        .await;

    assert!(matches!(result, Err(ServerError::TenantNotFound)));
    assert_eq!(sink.names(), vec![TENANT_INACTIVE]);
}

#[tokio::test]
async fn should_fall_back_to_principal_tenant() {
    let tenant = test_tenant("acme");
    let (log, _sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![tenant.clone()]),
        log,
    };

    let principal = Principal::TenantUser {
        id: Uuid::new_v4(),
        tenant_id: Some(tenant.id),
    };
    let resolved = resolver
        .resolve(&signals(None, Some("lineup.app")), Some(&principal))
        .await
        .unwrap();

    assert_eq!(resolved.tenant.id, tenant.id);
    assert_eq!(resolved.method, ResolutionMethod::Principal);
}

#[tokio::test]
async fn should_fall_back_to_oldest_active_tenant() {
    let mut older = test_tenant("older");
    older.created_at = Utc::now() - chrono::Duration::days(30);
    let newer = test_tenant("newer");
    let (log, _sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::new(vec![newer, older.clone()]),
        log,
    };

    let resolved = resolver.resolve(&signals(None, None), None).await.unwrap();

    assert_eq!(resolved.tenant.id, older.id);
    assert_eq!(resolved.method, ResolutionMethod::Fallback);
}

#[tokio::test]
async fn should_fail_closed_when_nothing_resolves() {
    let (log, sink) = capturing_log();
    let resolver = TenantResolver {
        tenants: MockTenantRepo::empty(),
        log,
    };

    let result = resolver
        .resolve(&signals(None, Some("unknown.lineup.app")), None)
        .await;

    assert!(matches!(result, Err(ServerError::TenantNotFound)));
    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, TENANT_NOT_FOUND);
    assert_eq!(events[0].level, SecurityLevel::Critical);
}
