use storefront_api::{
    config::TokenConfig,
    error::AppError,
    models::Role,
    services::token_service::TokenService,
};
use uuid::Uuid;

fn service() -> TokenService {
    TokenService::new(&TokenConfig {
        access_secret: "access-secret-for-tests".into(),
        refresh_secret: "refresh-secret-for-tests".into(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    })
}

#[test]
fn access_token_round_trips_principal_and_role() {
    let tokens = service();
    let id = Uuid::new_v4();
    let token = tokens.issue_access_token(id, Role::Staff).unwrap();

    let claims = tokens.verify_access_token(&token).unwrap();
    assert_eq!(claims.principal_id().unwrap(), id);
    assert_eq!(claims.role, Role::Staff);
    assert!(claims.exp > claims.iat);
}

#[test]
fn access_and_refresh_secrets_are_not_interchangeable() {
    let tokens = service();
    let id = Uuid::new_v4();
    let access = tokens.issue_access_token(id, Role::Customer).unwrap();
    let refresh = tokens.issue_refresh_token(id, Role::Customer).unwrap();

    assert!(matches!(
        tokens.verify_refresh_token(&access),
        Err(AppError::InvalidToken)
    ));
    assert!(matches!(
        tokens.verify_access_token(&refresh),
        Err(AppError::InvalidToken)
    ));
    assert!(tokens.verify_refresh_token(&refresh).is_ok());
}

#[test]
fn tampered_token_is_rejected() {
    let tokens = service();
    let token = tokens.issue_access_token(Uuid::new_v4(), Role::Customer).unwrap();
    let sig_start = token.rfind('.').unwrap() + 1;
    let first = &token[sig_start..sig_start + 1];
    let replacement = if first == "A" { "B" } else { "A" };
    let tampered = format!("{}{}{}", &token[..sig_start], replacement, &token[sig_start + 1..]);

    assert!(matches!(
        tokens.verify_access_token(&tampered),
        Err(AppError::InvalidToken)
    ));
    assert!(matches!(
        tokens.verify_access_token("not-a-jwt"),
        Err(AppError::InvalidToken)
    ));
}

#[test]
fn token_from_another_deployment_is_rejected() {
    let other = TokenService::new(&TokenConfig {
        access_secret: "someone-else".into(),
        refresh_secret: "someone-else-too".into(),
        access_ttl_minutes: 15,
        refresh_ttl_minutes: 60,
    });
    let token = other.issue_access_token(Uuid::new_v4(), Role::Admin).unwrap();
    assert!(service().verify_access_token(&token).is_err());
}

#[test]
fn expired_token_is_rejected() {
    let tokens = TokenService::new(&TokenConfig {
        access_secret: "access-secret-for-tests".into(),
        refresh_secret: "refresh-secret-for-tests".into(),
        access_ttl_minutes: -10,
        refresh_ttl_minutes: -10,
    });
    let token = tokens.issue_access_token(Uuid::new_v4(), Role::Admin).unwrap();
    assert!(matches!(
        tokens.verify_access_token(&token),
        Err(AppError::InvalidToken)
    ));

    // Logout still identifies the principal of an expired refresh token.
    let id = Uuid::new_v4();
    let refresh = tokens.issue_refresh_token(id, Role::Staff).unwrap();
    let claims = tokens.decode_unverified(&refresh).unwrap();
    assert_eq!(claims.principal_id().unwrap(), id);
    assert_eq!(claims.role, Role::Staff);
}

#[test]
fn unverified_decode_still_rejects_garbage() {
    assert!(matches!(
        service().decode_unverified("garbage"),
        Err(AppError::InvalidToken)
    ));
}

#[test]
fn back_to_back_issuance_yields_distinct_tokens() {
    let tokens = service();
    let id = Uuid::new_v4();
    let first = tokens.issue_refresh_token(id, Role::Customer).unwrap();
    let second = tokens.issue_refresh_token(id, Role::Customer).unwrap();
    assert_ne!(first, second);

    let a = tokens.verify_refresh_token(&first).unwrap();
    let b = tokens.verify_refresh_token(&second).unwrap();
    assert_eq!(a.principal_id().unwrap(), b.principal_id().unwrap());
    assert_ne!(a.jti, b.jti);
}
