use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tallyplot::{App, AppConfig, AppEvent, Args, ConfigManager, InputKind};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new(tx.clone(), config);
    render(&mut terminal, &mut app)?;

    if let Some(path) = &args.path {
        match InputKind::from_path(path) {
            InputKind::Csv => tx.send(AppEvent::LoadCsv(path.clone()))?,
            InputKind::Project => tx.send(AppEvent::LoadProject(path.clone()))?,
        }
        if let Some(column) = &args.column {
            tx.send(AppEvent::SelectColumn(Some(column.clone())))?;
        }
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key)
                    if key.kind == crossterm::event::KeyEventKind::Press =>
                {
                    tx.send(AppEvent::Key(key))?
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(tallyplot::APP_NAME)
            .and_then(|manager| manager.write_default_config(args.force))
        {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn run_headless(args: &Args, config: &AppConfig) -> Result<()> {
    let outcome = tallyplot::run_headless(args, config)?;
    if !outcome.view.is_empty() {
        println!("{}", outcome.view.summary.status_text());
    }
    if let Some(path) = &outcome.exported {
        println!("Export complete: {}", path.display());
    }
    if let Some(path) = &outcome.saved {
        println!("Project saved: {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = match AppConfig::load(tallyplot::APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}. Using default configuration.", e);
            AppConfig::default()
        }
    };
    config.chart.apply_args(&args);

    if let Err(e) = tallyplot::logging::init(&config.debug, args.log_file.as_deref()) {
        eprintln!("Warning: {}", e);
    }

    if args.is_headless() {
        if let Err(e) = run_headless(&args, &config) {
            tracing::error!(error = ?e, "headless run failed");
            eprintln!("Error: {}", tallyplot::error_display::user_message(&e));
            std::process::exit(1);
        }
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
