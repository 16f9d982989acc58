// crates/auth-e2e-core/src/suites/session.rs
// ============================================================================
// Module: Session Suite
// Description: Login and logout scenarios.
// Purpose: Verify session issuance, 2FA challenges, and session teardown.
// Dependencies: async-trait
// ============================================================================

use async_trait::async_trait;

use crate::contract::expect_client_error;
use crate::contract::expect_session_issued;
use crate::contract::expect_status;
use crate::contract::expect_successful_signup;
use crate::contract::expect_two_factor_challenge;
use crate::error::ScenarioFailure;
use crate::fixtures::Credentials;
use crate::fixtures::TestUser;
use crate::scenario::Scenario;
use crate::scenario::ScenarioContext;
use crate::scenario::SuiteKind;
use crate::scenario::Verdict;

/// Token no service would have issued.
const FORGED_TOKEN: &str = "not-a-valid-token";
/// Password that never matches a generated user.
const WRONG_PASSWORD: &str = "wrongpassword456";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCase {
    LoginIssuesSession,
    LoginRequiresTwoFactor,
    LogoutEndsSession,
    LogoutRejectsForgedToken,
    LoginRejectsWrongPassword,
}

impl SessionCase {
    const fn name(self) -> &'static str {
        match self {
            Self::LoginIssuesSession => "login issues a session cookie",
            Self::LoginRequiresTwoFactor => "login challenges a 2FA user",
            Self::LogoutEndsSession => "logout accepts an issued session",
            Self::LogoutRejectsForgedToken => "logout rejects a forged token",
            Self::LoginRejectsWrongPassword => "login rejects a wrong password",
        }
    }
}

/// A session suite scenario.
#[derive(Debug, Clone, Copy)]
pub struct SessionScenario {
    case: SessionCase,
}

/// Every session scenario, in catalog order.
pub(crate) fn scenarios() -> Vec<SessionScenario> {
    [
        SessionCase::LoginIssuesSession,
        SessionCase::LoginRequiresTwoFactor,
        SessionCase::LogoutEndsSession,
        SessionCase::LogoutRejectsForgedToken,
        SessionCase::LoginRejectsWrongPassword,
    ]
    .into_iter()
    .map(|case| SessionScenario {
        case,
    })
    .collect()
}

/// Registers `user`, failing the scenario unless signup succeeds.
async fn register(context: &ScenarioContext, user: &TestUser) -> Result<(), ScenarioFailure> {
    expect_successful_signup(&context.api.signup(user).await?)?;
    Ok(())
}

#[async_trait]
impl Scenario for SessionScenario {
    fn name(&self) -> &str {
        self.case.name()
    }

    fn suite(&self) -> SuiteKind {
        SuiteKind::Api
    }

    async fn run(&self, context: &ScenarioContext) -> Result<Verdict, ScenarioFailure> {
        let api = &context.api;
        match self.case {
            SessionCase::LoginIssuesSession => {
                let user = context.users.generate("login");
                register(context, &user).await?;
                expect_session_issued(&api.login(&user.credentials()).await?)?;
                Ok(Verdict::passed())
            }
            SessionCase::LoginRequiresTwoFactor => {
                let user = context.users.generate("login-2fa").with_two_factor();
                register(context, &user).await?;
                let reply = api.login(&user.credentials()).await?;
                let attempt = expect_two_factor_challenge(&reply)?;
                Ok(Verdict::Passed(vec![format!("login attempt {attempt}")]))
            }
            SessionCase::LogoutEndsSession => {
                let user = context.users.generate("logout");
                register(context, &user).await?;
                let reply = api.login(&user.credentials()).await?;
                let token = expect_session_issued(&reply)?;
                expect_status(&api.logout(token).await?, 200)?;
                Ok(Verdict::passed())
            }
            SessionCase::LogoutRejectsForgedToken => {
                let status = expect_client_error(&api.logout(FORGED_TOKEN).await?)?;
                Ok(Verdict::Passed(vec![format!("forged token rejected with {status}")]))
            }
            SessionCase::LoginRejectsWrongPassword => {
                let user = context.users.generate("wrong-password");
                register(context, &user).await?;
                let credentials = Credentials {
                    email: user.email.clone(),
                    password: WRONG_PASSWORD.to_string(),
                };
                let status = expect_client_error(&api.login(&credentials).await?)?;
                Ok(Verdict::Passed(vec![format!("wrong password rejected with {status}")]))
            }
        }
    }
}
