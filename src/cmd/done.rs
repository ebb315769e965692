use crate::data::{persistence::get_data_dir, CardConfig, HostState, Persistable, TrackedEntity};
use crate::service::{
    reset_date, CommandSink, FileSink, PendingConfirmation, ResetOutcome, ResetTrigger,
};
use anyhow::{bail, Result};
use chrono::Local;
use std::io::{BufRead, Write};

/// Marks `entity_id` as done today, or on `date` (`YYYY-MM-DD`).
pub fn run(entity_id: &str, date: Option<&str>, yes: bool) -> Result<()> {
    let config = CardConfig::load()?;
    let host = HostState::load_or_default();
    let entity = match config.find_entity(entity_id) {
        Some(e) => e.clone(),
        None if host.get(entity_id).is_some() => TrackedEntity::new(entity_id),
        None => bail!("Entity '{}' is not configured and not in the host state.", entity_id),
    };

    let trigger = match date {
        Some(d) => ResetTrigger::from_picker(d)?,
        None => ResetTrigger::Hold,
    };

    let mut sink = FileSink::new(get_data_dir()?);
    let now = Local::now().naive_local();
    let mut out = std::io::stdout();
    match reset_date(&entity, trigger, &host, &mut sink, yes, now) {
        ResetOutcome::Dispatched(call) => {
            writeln!(out, "{} set to {}", call.data.entity_id, call.data.date)?;
        }
        ResetOutcome::AwaitingConfirmation(pending) => {
            let stdin = std::io::stdin();
            resolve_confirmation(pending, &mut stdin.lock(), &mut out, &mut sink)?;
        }
    }
    Ok(())
}

/// Asks on `out`, reads one answer line from `input`. Only `y`/`yes` accepts.
pub(crate) fn resolve_confirmation<R: BufRead, W: Write>(
    pending: PendingConfirmation,
    input: &mut R,
    out: &mut W,
    sink: &mut dyn CommandSink,
) -> Result<bool> {
    write!(out, "{} [y/N] ", pending.message())?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => {
            let call = pending.accept(sink);
            writeln!(out, "{} set to {}", call.data.entity_id, call.data.date)?;
            Ok(true)
        }
        _ => {
            pending.decline();
            writeln!(out, "Cancelled.")?;
            Ok(false)
        }
    }
}
