use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use loopstation::audio;
use loopstation::clock::MonotonicClock;
use loopstation::loader::sample_loader;
use loopstation::middle::Middle;
use loopstation::pipeline::{PadGrid, persistence};
use loopstation::scheduler::LoopScheduler;
use loopstation::shared::InputEvent;
use loopstation::tui;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    init_logging(&project_dir)?;
    let mut config = persistence::load_config(&project_dir)?;
    let transport = config.transport().context("bad tempo or signature in settings")?;
    let scheduler_config = config.scheduler().context("bad timer settings")?;

    // scheduler and audio callback must agree on what "now" is
    let clock = MonotonicClock::new();
    let audio = audio::start_audio(clock)?;
    let port = Arc::new(audio.port());

    let grid = Arc::new(PadGrid::new());
    let wav_paths = sample_loader::index_wav_in_dir(&project_dir).unwrap_or_default();
    let summary = sample_loader::load_into_grid(&wav_paths, &grid, port.as_ref());
    log::info!("{} samples loaded, {} failed", summary.loaded, summary.failed.len());

    let scheduler =
        LoopScheduler::new(scheduler_config, transport, grid.clone(), port, Arc::new(clock));
    let mut middle = Middle::new(grid, scheduler);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_time = std::time::Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        middle.tick();
        let ds = middle.display_state();
        tui_state.dialog = ds.dialog.as_ref().map(|d| d.kind());

        term.draw(|frame| {
            let area = frame.area();
            tui::view::render(frame, area, &ds);
        })?;

        for event in tui::input::poll_input(frame_time, &tui_state)? {
            if event == InputEvent::Quit {
                middle.shutdown();
                audio.stop_all();
                config.remember_transport(middle.transport());
                if let Err(err) = persistence::save_config(&project_dir, &config) {
                    log::warn!("could not save settings: {err:#}");
                }
                return Ok(());
            }
            middle.handle_input(event);
        }
    }
}

// the terminal belongs to the UI, so log lines go to a file next to the settings
fn init_logging(project_dir: &Path) -> anyhow::Result<()> {
    let dir = persistence::state_dir(project_dir);
    std::fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;
    let file = File::create(dir.join(persistence::LOG_FILE)).context("cannot open log file")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
