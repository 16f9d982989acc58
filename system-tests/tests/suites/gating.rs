// system-tests/tests/suites/gating.rs
// ============================================================================
// Module: Readiness Gating Self-Check
// Description: Warm-up, exhausted budgets, and dead targets.
// Purpose: Ensure no scenario traffic precedes a passed readiness gate.
// Dependencies: auth-e2e-core, helpers
// ============================================================================

//! ## Overview
//! The stub answers `GET /` with 503 for a configurable number of probes.
//! These tests check that the gate waits through warm-up, gives up after its
//! budget, and that a failed gate sends no scenario request at all.

use std::sync::Arc;

use auth_e2e_core::ReadinessGate;
use auth_e2e_core::RunError;
use auth_e2e_core::Runner;
use auth_e2e_core::SuiteFilter;
use auth_e2e_core::suites;
use helpers::auth_stub::AuthStubOptions;
use helpers::auth_stub::StubRequest;
use helpers::auth_stub::spawn_auth_stub;
use helpers::closed_port;
use helpers::fast_readiness;
use helpers::stub_client;
use helpers::stub_context;
use helpers::stub_policy;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn gate_waits_through_warmup() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions {
        warmup_failures: 2,
    })?;
    let context = stub_context(stub_client(stub.base_url())?, stub.base_url());
    let report = Runner::new(stub_policy(2))
        .run(context, suites::select(SuiteFilter::Api, Some("creates a new user")))
        .await?;

    assert!(report.readiness.ready);
    assert_eq!(report.readiness.attempts_made, 3);
    assert_eq!(report.counts.passed, 1);
    let requests = stub.requests();
    assert!(requests[.. 3].iter().all(|request| request.path == "/"));
    assert_eq!(requests[3].path, "/signup");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_budget_sends_no_scenario_traffic() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions {
        warmup_failures: 10,
    })?;
    let context = stub_context(stub_client(stub.base_url())?, stub.base_url());
    let mut policy = stub_policy(2);
    policy.readiness = fast_readiness(3);
    let err = Runner::new(policy).run(context, suites::catalog()).await.err();

    let Some(RunError::ServiceUnavailable(unavailable)) = err else {
        return Err(format!("expected ServiceUnavailable, got {err:?}").into());
    };
    assert_eq!(unavailable.attempts, 3);
    assert!(unavailable.last_observation.contains("503"));
    let expected = vec![
        StubRequest {
            method: "GET",
            path: "/",
        };
        3
    ];
    assert_eq!(stub.requests(), expected);
    assert_eq!(stub.user_count(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dead_target_aborts_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let base = closed_port()?;
    let context = stub_context(stub_client(base.clone())?, base);
    let err = Runner::new(stub_policy(2)).run(context, suites::catalog()).await.err();
    let Some(RunError::ServiceUnavailable(unavailable)) = err else {
        return Err(format!("expected ServiceUnavailable, got {err:?}").into());
    };
    assert_eq!(unavailable.attempts, 5);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn gate_is_evaluated_once_per_runner() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let runner = Runner::new(stub_policy(2));
    for _ in 0 .. 2 {
        let context = stub_context(stub_client(stub.base_url())?, stub.base_url());
        let report =
            runner.run(context, suites::select(SuiteFilter::Api, Some("forged"))).await?;
        assert!(report.is_success());
    }
    let probes = stub.requests().iter().filter(|request| request.path == "/").count();
    assert_eq!(probes, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_gate_spans_runners() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions {
        warmup_failures: 1,
    })?;
    let gate = Arc::new(ReadinessGate::new(fast_readiness(5)));
    for _ in 0 .. 3 {
        let context = stub_context(stub_client(stub.base_url())?, stub.base_url());
        let report = Runner::with_gate(stub_policy(2), Arc::clone(&gate))
            .run(context, suites::select(SuiteFilter::Api, Some("forged")))
            .await?;
        assert_eq!(report.readiness.attempts_made, 2);
    }
    let readiness_hits = stub.requests().iter().filter(|request| request.path == "/").count();
    assert_eq!(readiness_hits, 2);
    Ok(())
}
