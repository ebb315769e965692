//! Turns a "mark as done" intent into a `set_datetime` command, either
//! directly or behind a confirmation step.

use crate::calc::{format_iso_date, parse_local_date};
use crate::data::{HostState, TrackedEntity};
use crate::error::InputError;
use crate::service::{CommandSink, ServiceCall};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// How the reset was requested; decides the target date and the prompt verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTrigger {
    /// Hold-to-reset or its keyboard equivalent: the target is "now".
    Hold,
    /// An explicit date from the picker, already in local calendar fields.
    Picked(NaiveDate),
}

impl ResetTrigger {
    /// Parses a picker value (`YYYY-MM-DD`) without applying any offset.
    pub fn from_picker(value: &str) -> Result<Self, InputError> {
        parse_local_date(value).map(ResetTrigger::Picked)
    }

    pub fn target_date(&self, now: NaiveDateTime) -> NaiveDate {
        match self {
            ResetTrigger::Hold => now.date(),
            ResetTrigger::Picked(date) => *date,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            ResetTrigger::Hold => "reset",
            ResetTrigger::Picked(_) => "set",
        }
    }
}

/// A built but not yet issued command. Consuming it either way guarantees
/// at most one dispatch per confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    message: String,
    call: ServiceCall,
}

impl PendingConfirmation {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn call(&self) -> &ServiceCall {
        &self.call
    }

    pub fn accept<S: CommandSink + ?Sized>(self, sink: &mut S) -> ServiceCall {
        debug!(entity_id = %self.call.data.entity_id, "confirmation accepted");
        sink.call_service(&self.call);
        self.call
    }

    pub fn decline(self) {
        debug!(entity_id = %self.call.data.entity_id, "confirmation declined");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Issued immediately (direct mode).
    Dispatched(ServiceCall),
    /// Waiting for the user; nothing has been issued yet.
    AwaitingConfirmation(PendingConfirmation),
}

/// Resets `entity` to the trigger's target date.
///
/// With `skip_confirmation` the command goes to `sink` before this returns;
/// otherwise a `PendingConfirmation` carrying the prompt is handed back.
pub fn reset_date<S: CommandSink + ?Sized>(
    entity: &TrackedEntity,
    trigger: ResetTrigger,
    host: &HostState,
    sink: &mut S,
    skip_confirmation: bool,
    now: NaiveDateTime,
) -> ResetOutcome {
    let date = format_iso_date(trigger.target_date(now));
    let call = ServiceCall::set_datetime(&entity.id, &date);

    if skip_confirmation {
        debug!(entity_id = %entity.id, %date, "reset dispatched without confirmation");
        sink.call_service(&call);
        return ResetOutcome::Dispatched(call);
    }

    let message = format!(
        "Do you want to {} {} to {}?",
        trigger.verb(),
        entity.confirmation_name(host),
        date
    );
    ResetOutcome::AwaitingConfirmation(PendingConfirmation { message, call })
}
