use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use courtevo_boardroom::config::BoardroomConfig;
use courtevo_boardroom::export::{DirectorySink, Exportable};
use courtevo_boardroom::filter::{Criteria, Filterable};
use courtevo_boardroom::metrics::{dominance_index, gini_index, mean};
use courtevo_boardroom::models::{seeded_screen, Athlete, Coach, Innovation, Stakeholder, Subject};
use courtevo_boardroom::narrative::{narrative_rng, BOARD_TIPS};
use courtevo_boardroom::report::Reportable;
use courtevo_boardroom::screen::Screen;
use courtevo_boardroom::store::Record;
use courtevo_boardroom::widgets::{progress_bar, sparkline, ChartData};

#[derive(Parser)]
#[command(name = "courtevo-boardroom")]
#[command(about = "Boardroom dashboards for CourtEvo Vero", long_about = None)]
struct Cli {
    /// JSON config file; COURTEVO_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SubjectArg {
    Athletes,
    Coaches,
    Innovations,
    Stakeholders,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Pdf,
    Report,
    All,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Case-insensitive name search
    #[arg(long)]
    search: Option<String>,
    /// Exact status (stage or sentiment on those screens)
    #[arg(long)]
    status: Option<String>,
    /// Lower bound, as field=value (repeatable)
    #[arg(long = "min", value_name = "FIELD=VALUE")]
    min: Vec<String>,
    /// Upper bound, as field=value (repeatable)
    #[arg(long = "max", value_name = "FIELD=VALUE")]
    max: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the visible records of a screen
    List {
        #[arg(value_enum)]
        subject: SubjectArg,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one record with its insight and log
    Show {
        #[arg(value_enum)]
        subject: SubjectArg,
        name: String,
    },
    /// Screen-level metrics and canned insights
    Insights {
        #[arg(value_enum)]
        subject: SubjectArg,
        /// Also print the trend series as chart JSON
        #[arg(long)]
        chart: bool,
    },
    /// Apply a canned scenario to one record
    Simulate {
        #[arg(value_enum)]
        subject: SubjectArg,
        name: String,
        /// Scenario key; omit to list the available ones
        scenario: Option<String>,
        /// Roll the scenario back afterwards to show the undo path
        #[arg(long)]
        undo: bool,
    },
    /// Export the visible records
    Export {
        #[arg(value_enum)]
        subject: SubjectArg,
        #[arg(long, value_enum, default_value = "all")]
        format: Format,
        #[command(flatten)]
        filters: FilterArgs,
        /// Output directory (defaults to the configured export_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtevo_boardroom=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BoardroomConfig::load(cli.config.as_deref())?;
    info!(history_cap = config.history_cap, "configuration loaded");

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        command => match command_subject(&command) {
            SubjectArg::Athletes => run::<Athlete>(command, &config),
            SubjectArg::Coaches => run::<Coach>(command, &config),
            SubjectArg::Innovations => run::<Innovation>(command, &config),
            SubjectArg::Stakeholders => run::<Stakeholder>(command, &config),
        },
    }
}

fn command_subject(command: &Commands) -> SubjectArg {
    match command {
        Commands::List { subject, .. }
        | Commands::Show { subject, .. }
        | Commands::Insights { subject, .. }
        | Commands::Simulate { subject, .. }
        | Commands::Export { subject, .. } => *subject,
        Commands::Config => SubjectArg::Athletes,
    }
}

fn run<T: Subject>(command: Commands, config: &BoardroomConfig) -> anyhow::Result<()> {
    let mut screen = seeded_screen::<T>(config.history_cap);
    let today = Utc::now().date_naive();

    match command {
        Commands::List {
            filters, limit, ..
        } => {
            screen.set_criteria(filters.criteria()?);
            let visible = screen.visible();

            if visible.is_empty() {
                println!("No records match these filters.");
                return Ok(());
            }

            println!("{} ({} of {}):", screen.title(), visible.len(), screen.store().len());
            for record in visible.iter().take(limit) {
                print_row(*record);
            }
        }
        Commands::Show { name, .. } => {
            let id = find_by_name(&screen, &name)?;
            screen.open_view(id)?;
            if let Some(record) = screen.selected() {
                print_detail(record);
            }
            screen.cancel();
        }
        Commands::Insights { chart, .. } => {
            let items = screen.store().items();
            let headlines: Vec<f64> = items.iter().map(Reportable::headline).collect();
            let label = T::headline_label();

            println!("{}", screen.title());
            println!("- Average {}: {:.1}", label, mean(&headlines));
            println!("- Inequality (Gini): {:.2}", gini_index(&headlines));
            println!("- Dominance (top share): {:.0}%", dominance_index(&headlines) * 100.0);
            println!();
            for record in items {
                println!("- {}", record.insight());
            }

            if chart {
                let mut data = ChartData::new("week");
                for record in items.iter().filter(|r| !r.trend().is_empty()) {
                    data.push(record.display_name(), record.trend().to_vec());
                }
                println!();
                println!("{}", serde_json::to_string_pretty(&data)?);
            }

            let mut rng = narrative_rng(config.narrative_seed);
            if let Some(tip) = BOARD_TIPS.pick(&mut rng) {
                println!();
                println!("Board tip: {tip}");
            }
        }
        Commands::Simulate {
            name,
            scenario,
            undo,
            ..
        } => {
            let Some(key) = scenario else {
                println!("Scenarios for {}:", screen.title());
                for scenario in screen.scenarios() {
                    println!("- {} ({})", scenario.key, scenario.label);
                }
                return Ok(());
            };

            let id = find_by_name(&screen, &name)?;
            let before = screen
                .store()
                .get(id)
                .map(Reportable::headline)
                .unwrap_or_default();
            let after = screen.simulate(id, &key, today)?;
            println!(
                "{} {}: {:.1} -> {:.1}",
                after.display_name(),
                T::headline_label(),
                before,
                after.headline()
            );
            if let Some(entry) = after.log().last() {
                println!("  logged {} on {}: {}", entry.kind, entry.date, entry.note);
            }
            println!("  {}", after.insight());

            if undo && screen.undo() {
                let restored = screen
                    .store()
                    .get(id)
                    .map(Reportable::headline)
                    .unwrap_or_default();
                println!("Undone; {} back to {:.1}.", T::headline_label(), restored);
            }
        }
        Commands::Export {
            format,
            filters,
            out,
            ..
        } => {
            screen.set_criteria(filters.criteria()?);
            let dir = out.unwrap_or_else(|| config.export_dir.clone());
            let mut sink = DirectorySink::new(&dir, config.delimiter_byte());

            if matches!(format, Format::Csv | Format::All) {
                screen.export_csv(&mut sink, today)?;
            }
            if matches!(format, Format::Pdf | Format::All) {
                screen.export_pdf(&mut sink, &config.pdf, today)?;
            }
            if matches!(format, Format::Report | Format::All) {
                screen.export_report(&mut sink, today)?;
            }

            for path in sink.written() {
                println!("Written {}.", path.display());
            }
        }
        Commands::Config => {}
    }

    Ok(())
}

impl FilterArgs {
    fn criteria(&self) -> anyhow::Result<Criteria> {
        let mut criteria = Criteria::new();
        if let Some(search) = &self.search {
            criteria = criteria.search(search.clone());
        }
        if let Some(status) = &self.status {
            criteria = criteria.equals("status", status.clone());
        }
        for raw in &self.min {
            let (field, value) = parse_bound(raw)?;
            criteria = criteria.min(field, value);
        }
        for raw in &self.max {
            let (field, value) = parse_bound(raw)?;
            criteria = criteria.max(field, value);
        }
        Ok(criteria)
    }
}

fn parse_bound(raw: &str) -> anyhow::Result<(&str, f64)> {
    let Some((field, value)) = raw.split_once('=') else {
        bail!("expected FIELD=VALUE, got {raw:?}");
    };
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("{field} bound must be a number (got {value:?})"))?;
    if !value.is_finite() {
        bail!("{field} bound must be finite");
    }
    Ok((field.trim(), value))
}

fn find_by_name<T: Subject>(screen: &Screen<T>, name: &str) -> anyhow::Result<uuid::Uuid> {
    screen
        .store()
        .items()
        .iter()
        .find(|record| record.label().eq_ignore_ascii_case(name.trim()))
        .map(Record::id)
        .with_context(|| format!("no record named {name:?} on {}", screen.title()))
}

fn print_row<T: Subject>(record: &T) {
    println!(
        "- {} ({}, {}) {} {:.1} {} {}",
        record.display_name(),
        record.status_label(),
        record.color(),
        T::headline_label(),
        record.headline(),
        progress_bar(record.headline(), 100.0, 10),
        sparkline(record.trend()),
    );
}

fn print_detail<T: Subject>(record: &T) {
    println!("{}", record.block_title());
    for (label, value) in record.pdf_block() {
        println!("  {label}: {value}");
    }
    let log = record.log();
    if log.is_empty() {
        println!("  No log entries recorded.");
    } else {
        println!("  Log:");
        for entry in log {
            println!("  - {} ({}): {}", entry.date, entry.kind, entry.note);
        }
    }
}
