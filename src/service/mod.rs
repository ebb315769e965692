pub mod reset;

use crate::data::{HostState, Persistable};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub use reset::{reset_date, PendingConfirmation, ResetOutcome, ResetTrigger};

pub const DATETIME_DOMAIN: &str = "input_datetime";
pub const SET_DATETIME_SERVICE: &str = "set_datetime";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SetDatetimeData {
    pub entity_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// The one command shape issued to the host.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: SetDatetimeData,
}

impl ServiceCall {
    pub fn set_datetime(entity_id: &str, date: &str) -> Self {
        ServiceCall {
            domain: DATETIME_DOMAIN.to_string(),
            service: SET_DATETIME_SERVICE.to_string(),
            data: SetDatetimeData {
                entity_id: entity_id.to_string(),
                date: date.to_string(),
            },
        }
    }
}

/// Fire-and-forget command boundary. Implementations never report failure
/// back; the next read of the state store shows what actually happened.
pub trait CommandSink {
    fn call_service(&mut self, call: &ServiceCall);
}

/// Sink that applies commands to `states.json` in a directory with a
/// read-modify-write per call. Readers pick the change up on their next load.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        FileSink { dir }
    }

    fn apply(&self, call: &ServiceCall) -> Result<()> {
        let mut state = HostState::load_from(&self.dir)?;
        state.set_state(&call.data.entity_id, &call.data.date);
        state.save_to(&self.dir)
    }
}

impl CommandSink for FileSink {
    fn call_service(&mut self, call: &ServiceCall) {
        if call.domain != DATETIME_DOMAIN || call.service != SET_DATETIME_SERVICE {
            warn!(domain = %call.domain, service = %call.service, "unsupported service ignored");
            return;
        }
        match self.apply(call) {
            Ok(()) => info!(
                entity_id = %call.data.entity_id,
                date = %call.data.date,
                "set_datetime applied"
            ),
            Err(e) => warn!(
                entity_id = %call.data.entity_id,
                error = %format!("{e:#}"),
                "set_datetime not applied"
            ),
        }
    }
}

/// Sink that records calls; used by tests across the crate.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub calls: Vec<ServiceCall>,
}

#[cfg(test)]
impl CommandSink for RecordingSink {
    fn call_service(&mut self, call: &ServiceCall) {
        self.calls.push(call.clone());
    }
}
