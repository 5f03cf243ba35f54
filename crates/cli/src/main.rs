use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use drugcheck_core::{
    format_profile, CoreConfig, EnvValues, LabelSource, OpenFdaClient, PatientProfile,
};

#[derive(Parser)]
#[command(name = "drugcheck")]
#[command(about = "Cross-reference a patient profile against drug label text")]
struct Cli {
    /// YAML catalog replacing the built-in drug list (overrides DRUGCHECK_CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the drugs analysed by `report`
    Catalog,
    /// Print the profile block exactly as it is sent to the model
    Profile {
        /// Patient profile JSON file
        profile: PathBuf,
    },
    /// Fetch and print the label sections for a drug (no model call)
    Lookup {
        /// Brand or generic drug name
        drug_name: String,
    },
    /// Report on every catalog drug
    Report {
        /// Patient profile JSON file
        profile: PathBuf,
    },
    /// Report on a single drug
    Check {
        /// Patient profile JSON file
        profile: PathBuf,
        /// Brand or generic drug name
        drug_name: String,
    },
}

fn read_profile(path: &Path) -> Result<PatientProfile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Process environment, with `--catalog` taking precedence over `DRUGCHECK_CATALOG_PATH`.
fn env_values(catalog: Option<PathBuf>) -> EnvValues {
    let mut values = EnvValues::from_process_env();
    if let Some(path) = catalog {
        values.catalog_path = Some(path.display().to_string());
    }
    values
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drugcheck_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env = env_values(cli.catalog);

    match cli.command {
        Commands::Catalog => {
            for entry in env.catalog()?.entries() {
                println!("{}: {}", entry.drug_class, entry.name);
            }
        }
        Commands::Profile { profile } => {
            let profile = read_profile(&profile)?;
            println!("{}", format_profile(&profile));
        }
        Commands::Lookup { drug_name } => {
            let settings = env.openfda()?;
            let client =
                OpenFdaClient::new(&settings.base_url, settings.timeout_secs, settings.api_key)?;
            match client.fetch(&drug_name).await {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => eprintln!("Could not fetch drug data for '{}'.", drug_name),
            }
        }
        Commands::Report { profile } => {
            let profile = read_profile(&profile)?;
            let service = CoreConfig::from_env_values(&env)?.build_report_service()?;
            let reports = service.batch_report(&profile).await;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Check { profile, drug_name } => {
            let profile = read_profile(&profile)?;
            let service = CoreConfig::from_env_values(&env)?.build_report_service()?;
            let report = service.single_report(&profile, &drug_name).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
