//! End-to-end tests driving the `helpix` binary against a temp home.

use std::process::{Command, Output};

use anyhow::{Context, Result};
use helpix_state::StoreData;
use helpix_test_utils::{helper, owned_task, TestFixture, LYON, PARIS, PARIS_NEARBY};
use serde_json::Value;

fn seed(fixture: &TestFixture) -> Result<()> {
    let mut data = StoreData::default();
    for user in [
        helper("ana", Some(PARIS), &["Jardinage"]),
        helper("bob", Some(PARIS), &[]),
    ] {
        data.users.insert(user.id.clone(), user);
    }
    for task in [
        owned_task("hedge", "bob", Some(PARIS_NEARBY), &["Jardinage"]),
        owned_task("lyon-move", "bob", Some(LYON), &["Demenagement"]),
    ] {
        data.tasks.insert(task.id.clone(), task);
    }
    std::fs::write(&fixture.store_path, serde_json::to_string_pretty(&data)?)?;
    Ok(())
}

/// Run the binary with HOME pointed at the fixture and no ambient overrides.
fn helpix(fixture: &TestFixture, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_helpix"))
        .env("HELPIX_HOME", fixture.home_path())
        .env_remove("HELPIX_STORE")
        .env_remove("HELPIX_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .with_context(|| format!("failed to run helpix {args:?}"))?;
    if cfg!(debug_assertions) {
        eprintln!("helpix {args:?} stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(output)
}

fn helpix_json(fixture: &TestFixture, args: &[&str]) -> Result<Value> {
    let mut args = args.to_vec();
    args.extend(["--format", "json"]);
    let output = helpix(fixture, &args)?;
    assert!(output.status.success(), "helpix {args:?} failed: {output:?}");
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn given_seeded_home_when_recommending_then_accepting_then_inbox_reflects_it() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;

    let recs = helpix_json(&fixture, &["recommend", "--user", "ana", "--persist"])?;
    let hedge = recs
        .as_array()
        .and_then(|recs| recs.iter().find(|r| r["task_id"] == "hedge"))
        .context("hedge was not recommended")?;
    let id = hedge["id"].as_str().context("recommendation id")?.to_string();
    assert!(hedge["explanation"]
        .as_str()
        .unwrap_or_default()
        .contains("Jardinage"));

    let accepted = helpix_json(
        &fixture,
        &["act", "--recommendation", id.as_str(), "--action", "accept"],
    )?;
    assert_eq!(accepted["accepted"], true);

    let inbox = helpix_json(&fixture, &["inbox", "--user", "ana"])?;
    let stored = inbox["recommendations"]
        .as_array()
        .and_then(|recs| recs.iter().find(|r| r["id"] == id.as_str()))
        .context("accepted recommendation missing from inbox")?;
    assert_eq!(stored["accepted"], true);
    Ok(())
}

#[test]
fn given_store_flag_when_listing_alerts_then_only_nearby_tasks_are_shown() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;
    let elsewhere = fixture.tempdir.path().join("elsewhere.json");
    std::fs::copy(&fixture.store_path, &elsewhere)?;
    let elsewhere = elsewhere.to_string_lossy().into_owned();

    let output = helpix(
        &fixture,
        &["alerts", "--user", "ana", "--store", elsewhere.as_str()],
    )?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task hedge"));
    assert_eq!(stdout.lines().count(), 1, "unexpected alerts:\n{stdout}");
    Ok(())
}

#[test]
fn given_config_defaults_when_showing_settings_then_site_defaults_apply() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;
    fixture.write_config("[matching]\nmax_distance_km = 3.0\n")?;

    let settings = helpix_json(&fixture, &["settings", "--user", "ana"])?;
    assert_eq!(settings["max_distance_km"], 3.0);
    assert_eq!(settings["min_compatibility_score"], 0.4);
    Ok(())
}

#[test]
fn given_invalid_config_when_running_then_exit_is_nonzero() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;
    fixture.write_config("[scheduler]\nrecommendation_interval_secs = 0\n")?;

    let output = helpix(&fixture, &["inbox", "--user", "ana"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("recommendation_interval_secs"), "{stderr}");
    Ok(())
}

#[test]
fn given_unknown_user_when_scoring_then_exit_is_nonzero() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;
    let output = helpix(&fixture, &["score", "--user", "ghost", "--task", "hedge"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ghost"));
    Ok(())
}

#[test]
fn given_persisted_alerts_when_inbox_is_shown_then_alerts_become_viewed() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;

    let alerts = helpix_json(&fixture, &["alerts", "--user", "ana", "--persist"])?;
    assert_eq!(alerts[0]["task_id"], "hedge");
    assert_eq!(alerts[0]["viewed"], false);

    let first = helpix_json(&fixture, &["inbox", "--user", "ana"])?;
    assert_eq!(first["alerts"][0]["viewed"], false);

    let output = helpix(&fixture, &["inbox", "--user", "ana"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[viewed]"), "alert not marked viewed:\n{stdout}");
    Ok(())
}

#[test]
fn given_match_runs_when_listing_history_then_runs_are_shown() -> Result<()> {
    let fixture = TestFixture::new()?;
    seed(&fixture)?;

    helpix_json(&fixture, &["match", "--user", "ana"])?;
    let runs = helpix_json(&fixture, &["history", "--user", "ana"])?;
    let runs = runs.as_array().context("history is a list")?;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["results"][0]["task_id"], "hedge");
    Ok(())
}
