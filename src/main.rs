use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use env_logger::{Env, Target};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

mod app;
mod comparison;
mod controller;
mod dates;
mod error;
mod orders;
mod query;
mod series;
mod storage;
mod ui;

use app::App;
use comparison::ComparisonMode;
use controller::Controller;
use dates::parse_date;
use orders::OrderBook;
use query::QueryState;

#[derive(Parser, Debug)]
#[command(name = "ordercmp", version, about = "Compare daily order trends with the prior period")]
struct Cli {
    /// First day of the range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date, requires = "end_date")]
    start_date: Option<chrono::NaiveDate>,

    /// Last day of the range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date, requires = "start_date")]
    end_date: Option<chrono::NaiveDate>,

    /// Shared query string, e.g. "startDate=2024-03-05&endDate=2024-03-20"
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    query: Option<String>,

    /// Prior period to compare against
    #[arg(long, value_enum, default_value_t = ComparisonMode::PreviousMonth)]
    mode: ComparisonMode,

    /// JSON file mapping YYYY-MM-DD to order counts; demo data when omitted
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Print the computed state as JSON instead of starting the dashboard
    #[arg(long)]
    json: bool,

    /// Log file (defaults to ~/.ordercmp.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_cli_date(value: &str) -> Result<chrono::NaiveDate, String> {
    parse_date(value).map_err(|err| err.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone(), cli.json);

    let orders = match cli.orders.clone().or_else(storage::read_orders_path) {
        Some(path) => OrderBook::load(&path)?,
        None => {
            info!("no orders file configured, using demo data");
            OrderBook::demo()
        }
    };

    if orders.is_empty() {
        warn!("orders data has no valid days; every count will be zero");
    }

    let mut controller = Controller::new(orders, cli.mode);
    let query = initial_query(&cli);
    controller.restore(query);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(controller.state())?);
        return Ok(());
    }

    run_dashboard(controller)
}

fn initial_query(cli: &Cli) -> QueryState {
    if let Some(query) = &cli.query {
        return QueryState::parse(query);
    }

    let mut query = storage::read_last_query()
        .map(|value| QueryState::parse(&value))
        .unwrap_or_default();

    if let (Some(start), Some(end)) = (cli.start_date, cli.end_date) {
        query.set(query::START_DATE_PARAM, dates::iso_date(start));
        query.set(query::END_DATE_PARAM, dates::iso_date(end));
    }
    query
}

fn init_logging(path: Option<PathBuf>, to_stderr: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if !to_stderr {
        let file = path
            .or_else(storage::log_path)
            .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok());
        match file {
            Some(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn run_dashboard(controller: Controller) -> Result<(), Box<dyn Error>> {
    let mut stdout = std::io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(controller, true);

    let result = loop {
        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(err);
        }

        if app.should_quit {
            break Ok(());
        }

        match event::poll(Duration::from_millis(120)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    app.handle_key_event(key);
                }
                Ok(_) => {}
                Err(err) => break Err(err),
            },
            Ok(false) => {}
            Err(err) => break Err(err),
        }
    };

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        warn!("dashboard stopped: {err}");
    }
    Ok(result?)
}
