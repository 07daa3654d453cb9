mod common;

use serde_json::json;

use ceramerp_auth::{Area, Permission, Role};
use ceramerp_backend::Operation;
use ceramerp_backend::schema::{CUSTOMERS, USER_ROLES};
use ceramerp_client::{AuthState, ClientError};
use ceramerp_core::DomainError;
use ceramerp_parties::CustomerInput;

use common::harness;

const EMAIL: &str = "ana@olaria.pt";
const PASSWORD: &str = "barro-vidrado";

#[tokio::test]
async fn sign_in_resolves_the_stored_role() {
    let h = harness();
    let user = h.auth.register(EMAIL, PASSWORD);
    h.data
        .seed(USER_ROLES, json!({ "user_id": user.id, "role": "manager" }))
        .unwrap();

    let principal = h.client.session().sign_in(EMAIL, PASSWORD).await.unwrap();

    assert_eq!(principal.role, Role::Manager);
    assert_eq!(principal.user.id, user.id);
    assert!(h.client.session().access_token().is_some());
    assert!(h.client.session().can(Permission::manage(Area::Customers)));
    assert_eq!(h.notifier.successes().len(), 1);
}

#[tokio::test]
async fn missing_or_failed_role_lookup_falls_back_to_viewer() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);

    let principal = h.client.session().sign_in(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(principal.role, Role::Viewer);
    h.client.session().sign_out().await;

    h.data
        .fail_next(Operation::Select, USER_ROLES, "relation does not exist");
    let principal = h.client.session().sign_in(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(principal.role, Role::Viewer);
    assert!(!h.client.session().can(Permission::manage(Area::Inventory)));
    assert!(h.client.session().can(Permission::view(Area::Dashboard)));
}

#[tokio::test]
async fn require_rejects_roles_without_the_permission() {
    let h = harness();
    let session = h.client.session();
    assert!(session.require(Permission::view(Area::Dashboard)).is_ok());

    let err = session
        .require(Permission::manage(Area::Inventory))
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Domain(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn wrong_password_notifies_and_stays_signed_out() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);

    h.client
        .session()
        .sign_in(EMAIL, "wrong")
        .await
        .unwrap_err();

    assert_eq!(h.client.session().state(), AuthState::SignedOut);
    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message.as_deref(),
        Some("Invalid login credentials")
    );
}

#[tokio::test]
async fn sign_out_clears_cache_and_broadcasts() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);
    let session = h.client.session();
    let mut states = session.subscribe();

    session.sign_in(EMAIL, PASSWORD).await.unwrap();
    assert!(matches!(*states.borrow_and_update(), AuthState::SignedIn(_)));

    h.client
        .customers()
        .create(CustomerInput::new("C-001", "Casa do Barro"))
        .await
        .unwrap();
    h.client.customers().list().await.unwrap();
    assert!(!h.client.cache().is_empty());

    session.sign_out().await;

    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), AuthState::SignedOut);
    assert!(h.client.cache().is_empty());
    assert!(session.access_token().is_none());
    assert_eq!(session.role(), Role::Viewer);
    assert_eq!(h.auth.active_tokens(), 0);

    h.client.customers().list().await.unwrap();
    assert_eq!(h.data.call_count(Operation::Select, CUSTOMERS), 2);
}

#[tokio::test]
async fn signing_in_as_another_user_drops_cached_rows() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);
    h.auth.register("rui@olaria.pt", "forno-quente");
    let session = h.client.session();

    session.sign_in(EMAIL, PASSWORD).await.unwrap();
    h.client.customers().list().await.unwrap();
    assert!(!h.client.cache().is_empty());

    session.sign_in("rui@olaria.pt", "forno-quente").await.unwrap();

    assert!(h.client.cache().is_empty());
    h.client.customers().list().await.unwrap();
    assert_eq!(h.data.call_count(Operation::Select, CUSTOMERS), 2);
}

#[tokio::test]
async fn failed_remote_sign_out_still_tears_down_locally() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);
    h.client.session().sign_in(EMAIL, PASSWORD).await.unwrap();
    h.auth.fail_sign_out(true);

    h.client.session().sign_out().await;

    assert_eq!(h.client.session().state(), AuthState::SignedOut);
    assert!(h.client.session().access_token().is_none());
}

#[tokio::test]
async fn restore_accepts_a_live_token_and_rejects_a_stale_one() {
    let h = harness();
    h.auth.register(EMAIL, PASSWORD);
    h.client.session().sign_in(EMAIL, PASSWORD).await.unwrap();
    let token = h.client.session().access_token().unwrap();

    let restored = harness_sharing_auth(&h);
    let principal = restored.session().restore(&token).await.unwrap();
    assert_eq!(principal.user.email.as_deref(), Some(EMAIL));

    h.client.session().sign_out().await;
    let stale = harness_sharing_auth(&h);
    stale.session().restore(&token).await.unwrap_err();
    assert_eq!(stale.session().state(), AuthState::SignedOut);
}

/// Second client over the same backend, as after an application restart.
fn harness_sharing_auth(h: &common::Harness) -> ceramerp_client::ErpClient {
    ceramerp_client::ErpClient::builder(h.data.clone(), h.auth.clone()).build()
}
