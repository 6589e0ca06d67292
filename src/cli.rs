//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_fundamentals_adapter::CsvFundamentalsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_ledger_adapter::JsonLedgerAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::config_validation::{
    date_range_from_config, grid_axes_from_config, strategy_from_config, symbols_from_config,
    validate_backtest_config, validate_optimize_config, validate_strategy_config,
};
use crate::domain::error::StratsimError;
use crate::domain::ledger::TradeSide;
use crate::domain::optimizer::optimize_ma_cross;
use crate::domain::patterns::detect_patterns;
use crate::domain::portfolio::run_portfolio;
use crate::domain::scanner::scan_market;
use crate::domain::simulation::run_simulation;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratsim", about = "Rule-based trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single-symbol backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured symbol
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Grid-search moving average windows
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Backtest an equal-weight portfolio
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Scan the configured symbols for fresh signals
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV file with company fundamentals
        #[arg(long)]
        fundamentals: Option<PathBuf>,
    },
    /// Detect candlestick patterns for a symbol
    Patterns {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Manage the paper trading ledger
    Paper {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: PaperAction,
    },
    /// List symbols available from the data source
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum PaperAction {
    /// Buy at the given price
    Buy {
        symbol: String,
        quantity: f64,
        price: f64,
    },
    /// Sell at the given price
    Sell {
        symbol: String,
        quantity: f64,
        price: f64,
    },
    /// Show cash, positions and trade history
    Status,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, symbol.as_deref(), output.as_ref())
            }
        }
        Command::Optimize { config, symbol } => run_optimize(&config, symbol.as_deref()),
        Command::Portfolio { config } => run_portfolio_cmd(&config),
        Command::Scan {
            config,
            fundamentals,
        } => run_scan(&config, fundamentals.as_ref()),
        Command::Patterns { config, symbol } => run_patterns(&config, symbol.as_deref()),
        Command::Paper { config, action } => run_paper(&config, &action),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &StratsimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StratsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

/// Builds the data port named by `[data] source`. CSV is the default;
/// sqlite needs the feature of the same name.
pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, StratsimError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| StratsimError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        other => Err(StratsimError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source '{}'", other),
        }),
    }
}

/// Shared preamble: config load and validation, strategy, dates, symbols.
struct RunSetup {
    config: FileConfigAdapter,
    strategy: crate::domain::strategy::StrategySpec,
    start_date: NaiveDate,
    end_date: NaiveDate,
    symbols: Vec<String>,
    initial_capital: f64,
}

fn load_setup(config_path: &PathBuf) -> Result<RunSetup, ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;

    validate_backtest_config(&config).map_err(|e| fail(&e))?;
    let strategy = strategy_from_config(&config).map_err(|e| fail(&e))?;
    let (start_date, end_date) = date_range_from_config(&config).map_err(|e| fail(&e))?;
    let symbols = symbols_from_config(&config).map_err(|e| fail(&e))?;
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);

    Ok(RunSetup {
        config,
        strategy,
        start_date,
        end_date,
        symbols,
        initial_capital,
    })
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let setup = match load_setup(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let symbol = symbol_override
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| setup.symbols[0].clone());

    let data_port = match build_data_port(&setup.config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running backtest: {} with {} from {} to {}",
        symbol, setup.strategy, setup.start_date, setup.end_date
    );

    let result = data_port
        .fetch_history(&symbol, setup.start_date, setup.end_date)
        .and_then(|series| setup.strategy.generate_signal(&series))
        .and_then(|signals| run_simulation(&signals, setup.initial_capital));

    let result = match result {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!("\n=== Results ===");
    eprintln!(
        "Total Return:     {:.2}%",
        result.metrics.total_return * 100.0
    );
    eprintln!(
        "Max Drawdown:     {:.2}%",
        result.metrics.max_drawdown * 100.0
    );
    eprintln!("Win Rate:         {:.1}%", result.metrics.win_rate * 100.0);
    eprintln!("Final Value:      ${:.2}", result.metrics.final_value);

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("report.typ"));
    let template_path = setup
        .config
        .get_string("report", "template_path")
        .map(PathBuf::from);
    let reporter = TypstReportAdapter::new(template_path, setup.start_date, setup.end_date);

    match reporter.write(
        &result,
        &setup.strategy,
        &symbol,
        &output.display().to_string(),
    ) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&config) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&config) {
        return fail(&e);
    }
    eprintln!("Config validated successfully");

    let strategy = match strategy_from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let symbols = match symbols_from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("\nStrategy: {}", strategy);
    eprintln!("Symbols:  {}", symbols.join(", "));
    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_optimize(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&config) {
        return fail(&e);
    }
    if let Err(e) = validate_optimize_config(&config) {
        return fail(&e);
    }

    let (shorts, longs) = match grid_axes_from_config(&config) {
        Ok(axes) => axes,
        Err(e) => return fail(&e),
    };
    let (start_date, end_date) = match date_range_from_config(&config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let symbols = match symbols_from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let symbol = symbol_override
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| symbols[0].clone());
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);

    let data_port = match build_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Optimizing {}: {} short x {} long windows, {} to {}",
        symbol,
        shorts.len(),
        longs.len(),
        start_date,
        end_date
    );

    let series = match data_port.fetch_history(&symbol, start_date, end_date) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let report = match optimize_ma_cross(&series, &shorts, &longs, initial_capital, None) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "\nEvaluated {} combinations ({} pruned by short < long, {} failed)",
        report.evaluated, report.skipped_constraint, report.skipped_error
    );

    if report.rows.is_empty() {
        eprintln!("No valid combination produced a result");
        return ExitCode::from(5);
    }

    eprintln!("\n=== Top Results ===");
    eprintln!(
        "{:>6} {:>6} {:>12} {:>12} {:>9}",
        "short", "long", "return", "drawdown", "win rate"
    );
    for row in report.rows.iter().take(10) {
        eprintln!(
            "{:>6} {:>6} {:>11.2}% {:>11.2}% {:>8.1}%",
            row.short,
            row.long,
            row.total_return * 100.0,
            row.max_drawdown * 100.0,
            row.win_rate * 100.0
        );
    }

    if let Some(best) = report.best() {
        eprintln!(
            "\nBest: ma_cross({},{}) with {:.2}% return",
            best.short,
            best.long,
            best.total_return * 100.0
        );
    }
    ExitCode::SUCCESS
}

fn run_portfolio_cmd(config_path: &PathBuf) -> ExitCode {
    let setup = match load_setup(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&setup.config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running portfolio: {} symbols, {} each, {} to {}",
        setup.symbols.len(),
        setup.strategy,
        setup.start_date,
        setup.end_date
    );

    let report = match run_portfolio(
        data_port.as_ref(),
        &setup.symbols,
        &setup.strategy,
        setup.initial_capital,
        setup.start_date,
        setup.end_date,
    ) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "\n{} succeeded / {} failed",
        report.outcomes.len(),
        report.failures.len()
    );

    if !report.outcomes.is_empty() {
        eprintln!("\n=== Per-Symbol Results ===");
        for outcome in &report.outcomes {
            eprintln!(
                "  {}: {:+.2}% (allocated ${:.2})",
                outcome.symbol,
                outcome.result.metrics.total_return * 100.0,
                outcome.allocation
            );
        }
    }

    for failure in &report.failures {
        eprintln!("warning: skipping {} ({})", failure.symbol, failure.reason);
    }

    match report.total_return {
        Some(total_return) => {
            eprintln!(
                "\nPortfolio return: {:+.2}% on ${:.2} allocated",
                total_return * 100.0,
                report.allocated_capital
            );
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("\nerror: no symbols succeeded, portfolio result is undefined");
            ExitCode::from(5)
        }
    }
}

fn run_scan(config_path: &PathBuf, fundamentals_path: Option<&PathBuf>) -> ExitCode {
    let setup = match load_setup(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&setup.config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let fundamentals = match fundamentals_path {
        Some(path) => match CsvFundamentalsAdapter::from_file(path) {
            Ok(a) => Some(a),
            Err(e) => return fail(&e),
        },
        None => None,
    };

    eprintln!(
        "Scanning {} symbols with {}",
        setup.symbols.len(),
        setup.strategy
    );

    let report = match scan_market(
        data_port.as_ref(),
        fundamentals
            .as_ref()
            .map(|f| f as &dyn crate::ports::fundamentals_port::FundamentalsPort),
        &setup.symbols,
        &setup.strategy,
        setup.start_date,
        setup.end_date,
    ) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "\n{} scanned / {} skipped",
        report.rows.len(),
        report.failures.len()
    );

    for row in &report.rows {
        let sector = row
            .fundamentals
            .as_ref()
            .filter(|f| !f.sector.is_empty())
            .map(|f| format!("  [{}]", f.sector))
            .unwrap_or_default();
        println!(
            "{:<8} {:>10.2} {:<8} {}{}",
            row.symbol, row.close, row.status, row.date, sector
        );
    }

    for failure in &report.failures {
        eprintln!("warning: skipping {} ({})", failure.symbol, failure.reason);
    }

    ExitCode::SUCCESS
}

fn run_patterns(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let setup = match load_setup(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let symbol = symbol_override
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| setup.symbols[0].clone());

    let data_port = match build_data_port(&setup.config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let series = match data_port.fetch_history(&symbol, setup.start_date, setup.end_date) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let points = detect_patterns(&series);
    let mut found = 0;
    for point in &points {
        if !point.any() {
            continue;
        }
        found += 1;
        let mut names = Vec::new();
        if point.doji {
            names.push("doji");
        }
        if point.hammer {
            names.push("hammer");
        }
        if point.bullish_engulfing {
            names.push("bullish engulfing");
        }
        println!("{}  {}", point.date, names.join(", "));
    }

    eprintln!(
        "\n{}: {} patterns across {} bars",
        symbol,
        found,
        points.len()
    );
    ExitCode::SUCCESS
}

fn run_paper(config_path: &PathBuf, action: &PaperAction) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let ledger_path = config
        .get_string("paper", "ledger_path")
        .unwrap_or_else(|| "ledger.json".to_string());
    let starting_cash = config.get_double("paper", "starting_cash", 100_000.0);
    let ledger_port = JsonLedgerAdapter::new(PathBuf::from(ledger_path));

    let mut state = match ledger_port.load(starting_cash) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let today = chrono::Local::now().date_naive();

    match action {
        PaperAction::Buy {
            symbol,
            quantity,
            price,
        } => {
            let symbol = symbol.to_uppercase();
            if let Err(e) = state.buy(today, &symbol, *quantity, *price) {
                return fail(&e);
            }
            if let Err(e) = ledger_port.save(&state) {
                return fail(&e);
            }
            eprintln!(
                "Bought {} {} @ {:.2}, cash now ${:.2}",
                quantity, symbol, price, state.cash
            );
        }
        PaperAction::Sell {
            symbol,
            quantity,
            price,
        } => {
            let symbol = symbol.to_uppercase();
            if let Err(e) = state.sell(today, &symbol, *quantity, *price) {
                return fail(&e);
            }
            if let Err(e) = ledger_port.save(&state) {
                return fail(&e);
            }
            eprintln!(
                "Sold {} {} @ {:.2}, cash now ${:.2}",
                quantity, symbol, price, state.cash
            );
        }
        PaperAction::Status => {
            println!("Cash: ${:.2}", state.cash);
            if state.positions.is_empty() {
                println!("No open positions");
            } else {
                println!("Positions:");
                for (symbol, position) in &state.positions {
                    println!(
                        "  {:<8} {:>10.2} @ {:.2}",
                        symbol, position.quantity, position.avg_price
                    );
                }
            }
            println!("Trades recorded: {}", state.history.len());
            for trade in state.history.iter().rev().take(10) {
                let side = match trade.side {
                    TradeSide::Buy => "BUY ",
                    TradeSide::Sell => "SELL",
                };
                println!(
                    "  {}  {} {:<8} {:>10.2} @ {:.2}",
                    trade.date, side, trade.symbol, trade.quantity, trade.price
                );
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match data_port.list_symbols() {
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&config) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&config) {
        return fail(&e);
    }
    eprintln!("Config validated successfully");
    ExitCode::SUCCESS
}
