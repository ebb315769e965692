pub mod datetime_state;
pub mod format;

pub use datetime_state::{
    bar_color, compute_state, effective_frequency, progress_percent, status_text, DatetimeState,
};
pub use format::{
    format_date_short, format_duration, format_iso_date, parse_local_date, parse_timestamp,
};
