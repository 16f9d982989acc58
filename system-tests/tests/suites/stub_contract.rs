// system-tests/tests/suites/stub_contract.rs
// ============================================================================
// Module: Stub Contract Checks
// Description: Direct client calls against stub edge cases.
// Purpose: Keep the stub honest where catalog scenarios do not reach.
// Dependencies: auth-e2e-core, helpers
// ============================================================================

use auth_e2e_core::TestUser;
use auth_e2e_core::contract::expect_session_issued;
use auth_e2e_core::contract::expect_two_factor_challenge;
use auth_e2e_core::contract::expect_validation_error;
use auth_e2e_core::fixtures::VALID_PASSWORD;
use helpers::auth_stub::AuthStubOptions;
use helpers::auth_stub::spawn_auth_stub;
use helpers::stub_client;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn session_token_is_single_use() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let user = TestUser::new("single-use@example.com", VALID_PASSWORD);
    assert_eq!(api.signup(&user).await?.status, 201);
    let login = api.login(&user.credentials()).await?;
    let token = expect_session_issued(&login)?.to_string();
    assert!(login.cookie("jwt-refresh").is_some());

    assert_eq!(api.logout(&token).await?.status, 200);
    assert_eq!(api.logout(&token).await?.status, 401);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_session_token_is_a_bad_request() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let reply = api.logout("").await?;
    assert_eq!(reply.status, 400);
    assert!(reply.error().is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn two_factor_attempts_are_distinct() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let user = TestUser::new("two-factor@example.com", VALID_PASSWORD).with_two_factor();
    assert_eq!(api.signup(&user).await?.status, 201);
    let first = api.login(&user.credentials()).await?;
    let second = api.login(&user.credentials()).await?;
    assert_ne!(expect_two_factor_challenge(&first)?, expect_two_factor_challenge(&second)?);
    assert!(first.cookie("jwt").is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_emails_without_a_dotted_domain() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    for email in ["user@localhost", "user@@example.com", "user @example.com", "user@example."] {
        let reply = api.signup(&TestUser::new(email, VALID_PASSWORD)).await?;
        expect_validation_error(&reply)?;
    }
    assert_eq!(stub.user_count(), 0);
    Ok(())
}
