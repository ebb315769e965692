use crate::data::{persistence::get_data_dir, CardConfig, HostState, Persistable};
use crate::service::FileSink;
use crate::ui::card_view::{run_app, App};
use crate::ui::{restore_terminal, setup_terminal};
use anyhow::Result;
use chrono::Local;
use tracing::info;

pub fn run() -> Result<()> {
    let mut config = CardConfig::load()?;
    let host = HostState::load_or_default();
    let data_dir = get_data_dir().unwrap_or_else(|_| std::path::PathBuf::from("./config"));

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    let mut sink = FileSink::new(data_dir.clone());
    let now = Local::now().naive_local();
    let mut app = App::new(&mut config, host, &mut sink, data_dir, now);
    info!("card opened");

    let result = run_app(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;
    drop(app);

    // Editor changes live only in memory until here.
    config.save()?;

    result
}
