use crate::calc::{compute_state, format_duration, progress_percent, status_text};
use crate::data::{CardConfig, HostState, Persistable};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};

pub fn run() -> Result<()> {
    let config = CardConfig::load()?;
    let host = HostState::load_or_default();
    write_status(&config, &host, Local::now().naive_local(), &mut std::io::stdout())
}

/// Prints one block per visible entity, the same rows the card shows.
pub(crate) fn write_status<W: std::io::Write>(
    config: &CardConfig,
    host: &HostState,
    now: NaiveDateTime,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", config.title)?;
    writeln!(out, "---")?;

    let mut shown = 0;
    for entity in config.resolved_entities(host) {
        let state = compute_state(now, host.last_event(&entity.id), entity.frequency_days);
        if config.filter_overdue && !state.is_overdue {
            continue;
        }
        shown += 1;
        let percent = progress_percent(state.days_since_last_event, entity.frequency_days);
        writeln!(
            out,
            "{:<26} {}",
            entity.display_name(host),
            format_duration(state.days_since_last_event, config.show_months)
        )?;
        writeln!(
            out,
            "  {}",
            status_text(&state, now.date(), config.show_next_date)
        )?;
        writeln!(out, "  {:<24} {:.0}%", "Progress:", percent.max(0.0))?;
        if config.debug {
            writeln!(
                out,
                "  Last: {} | Next: {} | Icon: {}",
                state.last_event_date.format("%Y-%m-%d"),
                state.next_event_date.format("%Y-%m-%d"),
                entity.icon(host)
            )?;
        }
    }

    if shown == 0 {
        if config.filter_overdue {
            writeln!(out, "Nothing is overdue.")?;
        } else {
            writeln!(out, "No input_datetime entities to show.")?;
        }
    }
    Ok(())
}
