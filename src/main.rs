//! Incident Lab
//!
//! Terminal console for the forensic training engine: pick a scenario,
//! explore the seized machine in a simulated shell and work through the
//! investigation tasks.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use incident_lab::tui::App;
use incident_lab::{Engine, EngineConfig, ScenarioCatalog};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::stdout;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "incident-lab", version, about = "Hands-on forensic exercises in a simulated shell")]
struct Args {
    /// Engine config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of scenario JSON files; the bundled scenario is used otherwise
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Scenario to play
    #[arg(long, default_value = "usb_exfil")]
    scenario: String,

    /// Learner name; defaults to the config's default user
    #[arg(long, env = "INCIDENT_LAB_USER")]
    user: Option<String>,

    /// Keep progress in this directory instead of in memory
    #[arg(long, env = "INCIDENT_LAB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print the scenario list and exit
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir.clone();
    }

    let catalog = match &args.scenarios {
        Some(dir) => ScenarioCatalog::load_dir(dir)?,
        None => ScenarioCatalog::bundled()?,
    };
    if args.list {
        for scenario in catalog.iter() {
            println!("{:<20} {} ({} tasks)", scenario.id, scenario.title, scenario.tasks.len());
        }
        return Ok(());
    }
    catalog.require(&args.scenario)?;

    let user = args.user.clone().unwrap_or_else(|| config.default_user.clone());
    log::info!("starting {} for {} (v{})", args.scenario, user, incident_lab::VERSION);
    let engine = Engine::open(config, catalog).context("opening progress store")?;
    let mut app = App::new(engine, &user, &args.scenario)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result?;

    println!("\n  {} finished with {} pts\n", app.user, app.total_score);
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> std::io::Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        if !app.handle_input()? {
            break;
        }
    }
    Ok(())
}
