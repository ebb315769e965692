use crate::calc::format_iso_date;
use crate::data::{CardConfig, EntityState, HostState, Persistable, TrackedEntity};
use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir, Local::now().date_naive())?;
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes a sample `config.yaml` and `states.json` into `dir`, with event
/// dates relative to `today` so the card has something on track and
/// something overdue.
pub(crate) fn run_in_dir(dir: &Path, today: NaiveDate) -> Result<()> {
    default_config().save_to(dir)?;
    sample_states(today).save_to(dir)?;
    info!(dir = %dir.display(), "sample data written");
    Ok(())
}

fn default_config() -> CardConfig {
    CardConfig {
        entities: vec![
            TrackedEntity {
                frequency_days: Some(7),
                ..TrackedEntity::new("input_datetime.water_plants")
            },
            TrackedEntity {
                frequency_days: Some(14),
                ..TrackedEntity::new("input_datetime.change_bedsheets")
            },
            TrackedEntity {
                friendly_name: Some("Replace HVAC filter".to_string()),
                frequency_days: Some(30),
                icon: Some("mdi:air-filter".to_string()),
                ..TrackedEntity::new("input_datetime.hvac_filter")
            },
        ],
        ..Default::default()
    }
}

fn sample_states(today: NaiveDate) -> HostState {
    let mut host = HostState::default();
    for (id, name, icon, days_ago) in [
        ("input_datetime.water_plants", "Water plants", "mdi:watering-can", 3),
        ("input_datetime.change_bedsheets", "Change bedsheets", "mdi:bed", 10),
        ("input_datetime.hvac_filter", "HVAC filter", "mdi:fan", 40),
    ] {
        let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
        host.insert(
            id,
            EntityState::new(&format_iso_date(date))
                .with_attribute("friendly_name", name)
                .with_attribute("icon", icon),
        );
    }
    host
}
