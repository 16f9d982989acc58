// system-tests/tests/suites/catalog.rs
// ============================================================================
// Module: Catalog Self-Check
// Description: Full scenario catalog against the in-process stub.
// Purpose: Validate scenarios, runner, and reports against a contract-true target.
// Dependencies: auth-e2e-core, tempfile, helpers
// ============================================================================

//! ## Overview
//! Runs the real catalog against the stub from `helpers::auth_stub`. API
//! scenarios must all pass; UI scenarios must skip because no browser is
//! attached.

use std::fs;

use auth_e2e_core::RunArtifacts;
use auth_e2e_core::Runner;
use auth_e2e_core::SuiteFilter;
use auth_e2e_core::SuiteKind;
use auth_e2e_core::report::ScenarioStatus;
use auth_e2e_core::suites;
use auth_e2e_core::suites::NO_BROWSER_REASON;
use helpers::auth_stub::AuthStubOptions;
use helpers::auth_stub::spawn_auth_stub;
use helpers::stub_client;
use helpers::stub_context;
use helpers::stub_policy;
use serde_json::Value;

use crate::helpers;

/// Users a full catalog pass registers successfully.
const REGISTERED_USERS: usize = 7;

#[tokio::test(flavor = "multi_thread")]
async fn full_catalog_passes_against_stub() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let context = stub_context(api, stub.base_url());
    let report = Runner::new(stub_policy(4)).run(context, suites::catalog()).await?;

    let failures: Vec<String> = report
        .failures()
        .map(|record| format!("{}: {}", record.name, record.failure.clone().unwrap_or_default()))
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:#?}");
    assert!(report.is_success());
    assert_eq!(report.counts.total, suites::catalog().len());

    for record in &report.scenarios {
        match record.suite {
            SuiteKind::Api => assert_eq!(record.status, ScenarioStatus::Passed, "{}", record.name),
            SuiteKind::Ui => {
                assert_eq!(record.status, ScenarioStatus::Skipped, "{}", record.name);
                assert_eq!(record.notes, vec![NO_BROWSER_REASON.to_string()]);
            }
        }
        assert_eq!(record.attempts, 1);
    }
    assert_eq!(stub.user_count(), REGISTERED_USERS);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn name_filter_runs_only_matching_scenarios() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let context = stub_context(api, stub.base_url());
    let selected = suites::select(SuiteFilter::Api, Some("LOGOUT"));
    let report = Runner::new(stub_policy(2)).run(context, selected).await?;

    assert_eq!(report.counts.total, 2);
    assert_eq!(report.counts.passed, 2);
    assert!(report.scenarios.iter().all(|record| record.name.contains("logout")));
    let signups = stub.requests().iter().filter(|request| request.path == "/signup").count();
    assert_eq!(signups, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn serial_and_parallel_runs_agree() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let serial = Runner::new(stub_policy(1))
        .run(stub_context(stub_client(stub.base_url())?, stub.base_url()), suites::catalog())
        .await?;
    let parallel = Runner::new(stub_policy(8))
        .run(stub_context(stub_client(stub.base_url())?, stub.base_url()), suites::catalog())
        .await?;

    let outcome = |report: &auth_e2e_core::RunReport| {
        report
            .scenarios
            .iter()
            .map(|record| (record.name.clone(), record.status))
            .collect::<Vec<_>>()
    };
    assert_eq!(outcome(&serial), outcome(&parallel));
    assert!(serial.is_success());
    assert_eq!(stub.user_count(), REGISTERED_USERS * 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn selfcheck_run_writes_redacted_artifacts() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_auth_stub(AuthStubOptions::default())?;
    let api = stub_client(stub.base_url())?;
    let context = stub_context(api.clone(), stub.base_url());
    let report = Runner::new(stub_policy(4))
        .run(context, suites::select(SuiteFilter::Api, Some("login")))
        .await?;

    let temp = tempfile::tempdir()?;
    let artifacts = RunArtifacts::create(temp.path().join("run"))?;
    let written = artifacts.write_run(&report, &api.transcript())?;

    let summary: Value = serde_json::from_slice(&fs::read(&written.summary_json)?)?;
    assert_eq!(summary["counts"]["failed"], Value::from(0));
    assert_eq!(summary["counts"]["total"], Value::from(report.counts.total));

    let markdown = fs::read_to_string(&written.summary_markdown)?;
    assert!(markdown.contains("- Status: passed"));
    assert!(markdown.contains("login issues a session cookie"));

    let transcript = fs::read_to_string(&written.transcript)?;
    assert!(transcript.contains("/login"));
    assert!(!transcript.contains(auth_e2e_core::fixtures::VALID_PASSWORD));
    Ok(())
}
