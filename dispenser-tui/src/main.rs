//! Paper dispenser TUI entry point.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dispenser_core::SystemClock;
use dispenser_ledger::{DispenserService, UsageLedger};
use dispenser_storage::LmdbStore;
use dispenser_tui::config::TuiConfig;
use dispenser_tui::error::TuiError;
use dispenser_tui::keys::map_key;
use dispenser_tui::logging;
use dispenser_tui::state::App;
use dispenser_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};

fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    logging::init(&config.log_path, config.log_filter.as_deref())?;

    let store = LmdbStore::open(&config.store_path, config.map_size_mb)?;
    tracing::info!(path = %config.store_path.display(), "Store ready");
    let ledger = UsageLedger::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.ledger.clone(),
    )?;
    let service = DispenserService::new(Arc::new(config.credentials()), Arc::new(ledger));
    let mut app = App::new(service, config.theme());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let tick_rate = Duration::from_millis(config.refresh_interval_ms);

    while !app.should_quit {
        terminal.draw(|f| render_view(f, &app))?;

        if event::poll(tick_rate)? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if let Some(action) = map_key(key, app.screen()) {
                    app.handle_action(action);
                }
            }
        } else {
            app.tick();
        }
    }

    tracing::info!("Exiting");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}
