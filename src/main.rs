use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use cyboair_footprint::{
    DelayConfig, DerivationInput, EvidenceFile, FootprintConfig, NumericPolicy, Session, View,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Small-business carbon footprint calculator", long_about = None)]
struct Cli {
    /// JSON config file; falls back to $CYBOAIR_FOOTPRINT_CONFIG, then the builtin.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    /// Skip the simulated processing and export delays.
    #[arg(long, global = true)]
    no_delay: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current footprint and category breakdown.
    Dashboard,
    /// Submit operational evidence and show the updated dashboard.
    Submit {
        /// Energy bill (PDF, JPG or PNG). Only its name is used.
        #[arg(long)]
        energy_bill: Option<PathBuf>,
        /// Supplier invoice (PDF, JPG or PNG). Only its name is used.
        #[arg(long)]
        invoice: Option<PathBuf>,
        /// Waste weight in kilograms.
        #[arg(long, default_value = "")]
        waste_kg: String,
        /// Delivery mileage in miles.
        #[arg(long, default_value = "")]
        mileage: String,
        /// Override the configured handling of non-numeric input.
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Also show the quarterly report for the submitted data.
        #[arg(long)]
        report: bool,
        /// Export the quarterly report for the submitted data to this path.
        #[arg(long)]
        export: Option<PathBuf>,
        /// Any date inside the reported quarter (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the quarterly report, optionally exporting it.
    Report {
        /// Any date inside the reported quarter (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Write the exported document to this path.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List the addressable views.
    Views,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    Propagate,
    Reject,
    Clamp,
}

impl From<PolicyArg> for NumericPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Propagate => NumericPolicy::Propagate,
            PolicyArg::Reject => NumericPolicy::Reject,
            PolicyArg::Clamp => NumericPolicy::Clamp,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = FootprintConfig::load(cli.config.as_deref())?;
    if cli.no_delay {
        config.delays = DelayConfig::immediate();
    }

    match cli.command {
        Command::Dashboard => {
            let session = Session::new(config);
            print_dashboard(&session, cli.json)?;
        }
        Command::Submit {
            energy_bill,
            invoice,
            waste_kg,
            mileage,
            policy,
            report,
            export,
            date,
        } => {
            if let Some(policy) = policy {
                config.numeric_policy = policy.into();
            }
            let input = DerivationInput {
                energy_bill: energy_bill
                    .as_deref()
                    .map(EvidenceFile::from_path)
                    .transpose()?,
                invoice: invoice.as_deref().map(EvidenceFile::from_path).transpose()?,
                waste_kg,
                mileage,
            };
            let mut session = Session::new(config);
            session.navigate(View::AddData);
            info!("processing submission");
            let outcome = session.submit(&input).await?;
            if !outcome.record.is_finite() {
                warn!("submitted evidence produced a non-finite footprint");
            }
            if !cli.json {
                println!("Data uploaded successfully. Redirecting to dashboard...");
            }
            session.follow(&outcome).await;
            print_dashboard(&session, cli.json)?;
            if report || export.is_some() {
                let today = date.unwrap_or_else(|| Local::now().date_naive());
                run_report(&mut session, today, export, cli.json).await?;
            }
        }
        Command::Report { date, export } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let mut session = Session::new(config);
            run_report(&mut session, today, export, cli.json).await?;
        }
        Command::Views => {
            for view in View::ALL {
                println!("{},{},{}", view.name(), view.path(), view.needs_record());
            }
        }
    }

    Ok(())
}

/// Show the quarterly report for the session's current record, exporting it when asked.
async fn run_report(
    session: &mut Session,
    today: NaiveDate,
    export: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    session.navigate(View::Report);
    let report = session.report(today);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    if let Some(path) = export {
        let doc = session.export(today).await?;
        fs::write(&path, &doc.bytes)?;
        info!(id = %doc.id, path = %path.display(), "report written");
        if !json {
            println!("\nDownloaded {} -> {}", doc.file_name, path.display());
        }
    }
    Ok(())
}

fn print_dashboard(session: &Session, json: bool) -> Result<(), Box<dyn Error>> {
    let dashboard = session.dashboard();
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print!("{}", dashboard.render_text());
    }
    Ok(())
}
