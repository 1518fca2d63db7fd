//! Given steps for task-letter BDD scenarios.

use super::world::{TaskLetterWorld, parse_date, request, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a task letter request numbered "{register_number}""#)]
fn task_letter_request(world: &mut TaskLetterWorld, register_number: String) {
    world.pending_request = Some(request(register_number));
}

#[given(r#"the trip runs from "{start}" to "{end}""#)]
fn trip_dates(world: &mut TaskLetterWorld, start: String, end: String) -> Result<(), eyre::Report> {
    let pending = world
        .pending_request
        .as_mut()
        .ok_or_else(|| eyre::eyre!("missing pending request in scenario world"))?;
    pending.start_date = parse_date(&start)?;
    pending.end_date = parse_date(&end)?;
    Ok(())
}

#[given(r#"a task letter numbered "{register_number}" has been issued"#)]
fn task_letter_issued(world: &mut TaskLetterWorld, register_number: String) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create(request(register_number)))
        .wrap_err("issue task letter for scenario setup")?;
    world.last_created = Some(created);
    Ok(())
}
