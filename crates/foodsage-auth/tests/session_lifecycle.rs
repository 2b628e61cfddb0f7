//! End-to-end session lifecycle over the in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use foodsage_auth::{
    AccountService, AuthConfig, AuthError, LocalRevocationStore, LoginRequest, RegisterRequest,
    RevocationFailurePolicy, SessionGuard, TokenService, TokenVerdict,
};
use foodsage_storage::MemoryStorage;

struct Harness {
    accounts: AccountService,
    guard: SessionGuard,
    tokens: Arc<TokenService>,
}

fn harness() -> Harness {
    let config = AuthConfig {
        jwt_secret: "integration-test-secret-0123456789".to_string(),
        token_lifetime: Duration::from_secs(300),
        ..AuthConfig::default()
    };
    config.validate().unwrap();

    let tokens = Arc::new(TokenService::from_config(&config));
    let revocations = Arc::new(LocalRevocationStore::new());
    let users = Arc::new(MemoryStorage::new());

    Harness {
        accounts: AccountService::new(users, tokens.clone(), revocations.clone()),
        guard: SessionGuard::new(
            tokens.clone(),
            revocations,
            RevocationFailurePolicy::FailClosed,
        ),
        tokens,
    }
}

async fn register_and_login(h: &Harness, email: &str) -> (String, String) {
    let profile = h
        .accounts
        .register(RegisterRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();

    let issued = h
        .accounts
        .login(LoginRequest {
            email: email.to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();

    (profile.id, issued.token)
}

#[tokio::test]
async fn login_token_verifies_to_new_user() {
    let h = harness();
    let (user_id, token) = register_and_login(&h, "ann@example.com").await;

    assert_eq!(h.tokens.verify(&token).subject(), Some(user_id.as_str()));

    let ctx = h
        .guard
        .authorize(Some(&format!("Bearer {token}")))
        .await
        .unwrap();
    assert_eq!(ctx.user_id(), user_id);
}

#[tokio::test]
async fn logged_out_token_is_rejected_but_still_verifies() {
    let h = harness();
    let (_, token) = register_and_login(&h, "ann@example.com").await;

    let ctx = h.guard.authorize(Some(&token)).await.unwrap();
    h.accounts.logout(&ctx).await.unwrap();

    let err = h.guard.authorize(Some(&token)).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));
    assert!(err.is_unauthenticated());

    assert!(matches!(h.tokens.verify(&token), TokenVerdict::Valid { .. }));
}

#[tokio::test]
async fn logout_does_not_affect_other_sessions() {
    let h = harness();
    let (_, first) = register_and_login(&h, "ann@example.com").await;
    // A second login yields a distinct token (fresh jti).
    let second = h
        .accounts
        .login(LoginRequest {
            email: "ann@example.com".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap()
        .token;
    assert_ne!(first, second);

    let ctx = h.guard.authorize(Some(&first)).await.unwrap();
    h.accounts.logout(&ctx).await.unwrap();

    assert!(h.guard.authorize(Some(&first)).await.is_err());
    assert!(h.guard.authorize(Some(&second)).await.is_ok());
}

#[tokio::test]
async fn profile_omits_password_hash() {
    let h = harness();
    let (user_id, token) = register_and_login(&h, "ann@example.com").await;

    let ctx = h.guard.authorize(Some(&token)).await.unwrap();
    let profile = h.accounts.profile(&ctx).await.unwrap();
    assert_eq!(profile.id, user_id);

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("password_hash").is_none());
}
