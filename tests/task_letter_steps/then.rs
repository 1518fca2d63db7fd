//! Then steps for task-letter BDD scenarios.

use super::world::{TaskLetterWorld, parse_date, run_async};
use errand::task_letter::services::ErrorKind;
use rstest_bdd_macros::then;

fn expect_create_failure(world: &TaskLetterWorld, expected: ErrorKind) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result in scenario world"))?;
    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?} failure, got {other:?}")),
    }
}

#[then("the task letter can be read back by its identifier")]
fn read_back(world: &TaskLetterWorld) -> Result<(), eyre::Report> {
    let created = world.created()?;
    let found = run_async(world.service.find_by_id(created.id()))
        .map_err(|err| eyre::eyre!("lookup failed: {err}"))?;

    eyre::ensure!(
        found.as_ref() == Some(created),
        "lookup does not match the issued letter"
    );
    eyre::ensure!(
        created.official().is_empty(),
        "new letters must not carry official details"
    );
    Ok(())
}

#[then("issuing fails because the register number is taken")]
fn duplicate_register_number(world: &TaskLetterWorld) -> Result<(), eyre::Report> {
    expect_create_failure(world, ErrorKind::DuplicateRegisterNumber)
}

#[then("issuing fails because the date range is invalid")]
fn invalid_date_range(world: &TaskLetterWorld) -> Result<(), eyre::Report> {
    expect_create_failure(world, ErrorKind::InvalidDateRange)?;
    let listed = run_async(world.service.list_all())
        .map_err(|err| eyre::eyre!("listing failed: {err}"))?;
    eyre::ensure!(listed.is_empty(), "rejected letter must not be stored");
    Ok(())
}

#[then(r#"the stored letter shows arrival on "{arrival}" and unchanged details"#)]
fn arrival_recorded(world: &TaskLetterWorld, arrival: String) -> Result<(), eyre::Report> {
    let created = world.created()?;
    let stored = run_async(world.service.find_by_id(created.id()))
        .map_err(|err| eyre::eyre!("lookup failed: {err}"))?
        .ok_or_else(|| eyre::eyre!("task letter disappeared"))?;

    eyre::ensure!(
        stored.official().arrival_date == Some(parse_date(&arrival)?),
        "arrival date was not recorded"
    );
    eyre::ensure!(
        stored.official().ticket_taken == Some(true),
        "ticket flag was not recorded"
    );
    eyre::ensure!(
        stored.details() == created.details(),
        "authoring fields must stay unchanged"
    );
    Ok(())
}

#[then(r#"the export address is "{url}""#)]
fn export_address(world: &TaskLetterWorld, url: String) -> Result<(), eyre::Report> {
    let document = world
        .last_export
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing export result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected export failure: {err}"))?;

    eyre::ensure!(
        document.file_url == url,
        "expected {url}, got {}",
        document.file_url
    );
    eyre::ensure!(
        url.ends_with(&document.filename),
        "file name {} is not the last URL segment",
        document.filename
    );
    Ok(())
}

#[then("no task letter is returned for its identifier")]
fn letter_is_gone(world: &TaskLetterWorld) -> Result<(), eyre::Report> {
    let created = world.created()?;
    let found = run_async(world.service.find_by_id(created.id()))
        .map_err(|err| eyre::eyre!("lookup failed: {err}"))?;
    eyre::ensure!(found.is_none(), "deleted letter is still returned");
    Ok(())
}
