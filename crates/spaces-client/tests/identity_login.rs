mod common;

use common::{FakeApi, GUEST_TOKEN, USER_ID};
use spaces_client::{
    Credential, Identity, IdentityKind, OAuthClientCredentials, SpacesError, TokenType,
};
use std::sync::Arc;

#[tokio::test]
async fn test_guest_login_sets_token_and_id() {
    let api = FakeApi::new();
    let mut identity = Identity::guest("Bot");
    assert!(!identity.is_logged_in());

    identity.login(api.as_ref()).await.unwrap();
    assert_eq!(identity.id(), Some(USER_ID));
    assert_eq!(
        identity.credential().authorization_header_value().unwrap(),
        format!("jwt {}", GUEST_TOKEN)
    );
    assert_eq!(
        identity.kind(),
        &IdentityKind::Guest {
            display_name: "Bot".into()
        }
    );
}

#[tokio::test]
async fn test_guest_login_failure_leaves_identity_untouched() {
    let api = Arc::new(FakeApi {
        fail_profile: true,
        ..Default::default()
    });
    let mut identity = Identity::guest("Bot");

    let err = identity.login(api.as_ref()).await.unwrap_err();
    assert!(err.is_access_denied());
    assert!(!identity.credential().has_token());
    assert_eq!(identity.id(), None);
}

#[tokio::test]
async fn test_guest_token_failure() {
    let api = Arc::new(FakeApi {
        fail_guest_token: true,
        ..Default::default()
    });
    let mut identity = Identity::guest("Bot");

    assert!(matches!(
        identity.login(api.as_ref()).await,
        Err(SpacesError::Http { status: 500, .. })
    ));
    assert_eq!(api.calls(), vec!["guest_token:Bot"]);
    assert!(!identity.is_logged_in());
}

#[tokio::test]
async fn test_guest_cannot_log_in_twice() {
    let api = FakeApi::new();
    let mut identity = Identity::guest("Bot");
    identity.login(api.as_ref()).await.unwrap();

    assert!(matches!(
        identity.login(api.as_ref()).await,
        Err(SpacesError::InvalidCredential(_))
    ));
}

#[tokio::test]
async fn test_registered_login_uses_bearer() {
    let api = FakeApi::new();
    let credential = Credential::oauth_bearer("access-1").unwrap();
    let mut identity = Identity::registered(credential);

    identity.login(api.as_ref()).await.unwrap();
    assert_eq!(identity.id(), Some(USER_ID));
    assert_eq!(api.calls(), vec!["me:Bearer access-1"]);
}

#[tokio::test]
async fn test_registered_login_without_token() {
    let api = FakeApi::new();
    let credential = Credential::oauth_refreshable("refresh-1").unwrap();
    let mut identity = Identity::registered(credential);

    assert!(matches!(
        identity.login(api.as_ref()).await,
        Err(SpacesError::NotAuthenticated)
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_then_login() {
    let api = FakeApi::new();
    let client = OAuthClientCredentials::new("client-id", "client-secret");
    let mut identity = Identity::registered(Credential::oauth_refreshable("refresh-1").unwrap());

    identity
        .credential_mut()
        .refresh(api.as_ref(), &client)
        .await
        .unwrap();
    assert_eq!(identity.credential().token_type(), TokenType::OAuthBearer);
    assert_eq!(identity.credential().refresh_token(), Some("fresh-refresh"));
    assert_eq!(
        identity.credential().connection_query_params().unwrap(),
        "token=fresh-access&tokenType=oauth"
    );

    identity.login(api.as_ref()).await.unwrap();
    assert_eq!(
        api.calls(),
        vec!["refresh:client-id:refresh-1", "me:Bearer fresh-access"]
    );
}

#[tokio::test]
async fn test_guest_credential_cannot_refresh() {
    let api = FakeApi::new();
    let client = OAuthClientCredentials::new("id", "secret");
    let mut credential = Credential::guest();

    assert!(matches!(
        credential.refresh(api.as_ref(), &client).await,
        Err(SpacesError::InvalidCredential(_))
    ));
}
