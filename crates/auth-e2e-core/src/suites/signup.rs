// crates/auth-e2e-core/src/suites/signup.rs
// ============================================================================
// Module: Signup Suite
// Description: Registration and input validation scenarios.
// Purpose: Verify POST /signup outcomes for valid and invalid input.
// Dependencies: async-trait
// ============================================================================

use async_trait::async_trait;

use crate::contract::expect_status;
use crate::contract::expect_successful_signup;
use crate::contract::expect_validation_error;
use crate::error::ContractViolation;
use crate::error::ScenarioFailure;
use crate::fixtures::INVALID_EMAILS;
use crate::fixtures::SHORT_PASSWORD;
use crate::fixtures::TestUser;
use crate::fixtures::VALID_PASSWORD;
use crate::scenario::Scenario;
use crate::scenario::ScenarioContext;
use crate::scenario::SuiteKind;
use crate::scenario::Verdict;

/// Times the same invalid signup is repeated.
const IDEMPOTENT_REPEATS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignupCase {
    Create,
    CreateWithTwoFactor,
    RejectEmptyEmail,
    RejectShortPassword,
    RejectInvalidEmail(&'static str),
    IdempotentRejection,
    DuplicateRegistration,
}

/// A signup suite scenario.
#[derive(Debug, Clone)]
pub struct SignupScenario {
    case: SignupCase,
    name: String,
}

impl SignupScenario {
    fn new(case: SignupCase) -> Self {
        let name = match case {
            SignupCase::Create => "signup creates a new user".to_string(),
            SignupCase::CreateWithTwoFactor => "signup creates a user with 2FA".to_string(),
            SignupCase::RejectEmptyEmail => "signup rejects an empty email".to_string(),
            SignupCase::RejectShortPassword => "signup rejects a short password".to_string(),
            SignupCase::RejectInvalidEmail(email) => {
                format!("signup rejects invalid email {email:?}")
            }
            SignupCase::IdempotentRejection => {
                "signup rejects repeated invalid input identically".to_string()
            }
            SignupCase::DuplicateRegistration => {
                "signup rejects a duplicate registration".to_string()
            }
        };
        Self {
            case,
            name,
        }
    }
}

/// Every signup scenario, in catalog order.
pub(crate) fn scenarios() -> Vec<SignupScenario> {
    let mut cases = vec![
        SignupCase::Create,
        SignupCase::CreateWithTwoFactor,
        SignupCase::RejectEmptyEmail,
        SignupCase::RejectShortPassword,
    ];
    cases.extend(INVALID_EMAILS.into_iter().map(SignupCase::RejectInvalidEmail));
    cases.push(SignupCase::IdempotentRejection);
    cases.push(SignupCase::DuplicateRegistration);
    cases.into_iter().map(SignupScenario::new).collect()
}

#[async_trait]
impl Scenario for SignupScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn suite(&self) -> SuiteKind {
        SuiteKind::Api
    }

    async fn run(&self, context: &ScenarioContext) -> Result<Verdict, ScenarioFailure> {
        let api = &context.api;
        match self.case {
            SignupCase::Create => {
                let user = context.users.generate("signup");
                expect_successful_signup(&api.signup(&user).await?)?;
                Ok(Verdict::Passed(vec![format!("created {}", user.email)]))
            }
            SignupCase::CreateWithTwoFactor => {
                let user = context.users.generate("signup-2fa").with_two_factor();
                expect_successful_signup(&api.signup(&user).await?)?;
                Ok(Verdict::Passed(vec![format!("created {} with 2FA", user.email)]))
            }
            SignupCase::RejectEmptyEmail => {
                let user = TestUser::new("", VALID_PASSWORD);
                expect_validation_error(&api.signup(&user).await?)?;
                Ok(Verdict::passed())
            }
            SignupCase::RejectShortPassword => {
                let mut user = context.users.generate("short-password");
                user.password = SHORT_PASSWORD.to_string();
                expect_validation_error(&api.signup(&user).await?)?;
                Ok(Verdict::passed())
            }
            SignupCase::RejectInvalidEmail(email) => {
                let user = TestUser::new(email, VALID_PASSWORD);
                expect_validation_error(&api.signup(&user).await?)?;
                Ok(Verdict::passed())
            }
            SignupCase::IdempotentRejection => {
                let user = TestUser::new(INVALID_EMAILS[0], VALID_PASSWORD);
                let first = api.signup(&user).await?;
                expect_validation_error(&first)?;
                for _ in 1 .. IDEMPOTENT_REPEATS {
                    let again = api.signup(&user).await?;
                    expect_validation_error(&again)?;
                    if again.body != first.body {
                        return Err(ContractViolation {
                            contract: "idempotent_rejection",
                            check: "body",
                            expected: first.raw_body.clone(),
                            actual: again.raw_body,
                        }
                        .into());
                    }
                }
                Ok(Verdict::passed())
            }
            SignupCase::DuplicateRegistration => {
                let user = context.users.generate("duplicate");
                expect_successful_signup(&api.signup(&user).await?)?;
                expect_status(&api.signup(&user).await?, 409)?;
                Ok(Verdict::passed())
            }
        }
    }
}
