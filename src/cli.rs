//! Command line surface: one subcommand per pipeline.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::{
    ColumnNames, EnrichSettings, MapSettings, DEFAULT_GEOCODE_URL, DEFAULT_SEARCH_URL,
};
use crate::error::{AppError, Result};
use crate::service::{enricher, mapper, Geocoder};

#[derive(Debug, Parser)]
#[command(name = "member-atlas", version, about = "Enrich a member list and map it")]
pub struct Cli {
    /// Debug-level logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up addresses and homepages for every company in the sheet
    Enrich(EnrichArgs),
    /// Geocode addresses and write a static Google Maps page
    Map(MapArgs),
    /// Check that the Google Maps API key works
    CheckApi(ApiArgs),
}

#[derive(Debug, Args)]
pub struct ColumnArgs {
    #[arg(long, default_value = "회원사명")]
    pub name_column: String,
    #[arg(long, default_value = "주소")]
    pub address_column: String,
    #[arg(long, default_value = "홈페이지")]
    pub homepage_column: String,
}

impl From<&ColumnArgs> for ColumnNames {
    fn from(args: &ColumnArgs) -> Self {
        Self {
            company: args.name_column.clone(),
            address: args.address_column.clone(),
            homepage: args.homepage_column.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// Member list (.xlsx, .xls, .ods or .csv)
    pub input: PathBuf,
    /// Defaults to `<input>_업데이트.xlsx`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Pause between search requests
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,
    #[command(flatten)]
    pub columns: ColumnArgs,
}

impl From<&EnrichArgs> for EnrichSettings {
    fn from(args: &EnrichArgs) -> Self {
        Self {
            search_url: args.search_url.clone(),
            delay_between_requests: args.delay_ms,
            timeout_secs: args.timeout_secs,
            columns: (&args.columns).into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, default_value = DEFAULT_GEOCODE_URL, hide = true)]
    pub geocode_url: String,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    /// Member list with company name and address columns
    pub input: PathBuf,
    /// Defaults to `member_map.html`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub api: ApiArgs,
    #[arg(long, default_value = "회원사 위치 지도")]
    pub title: String,
    /// Retries after OVER_QUERY_LIMIT before giving up on an address
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    #[command(flatten)]
    pub columns: ColumnArgs,
}

impl From<&ApiArgs> for MapSettings {
    fn from(args: &ApiArgs) -> Self {
        Self {
            geocode_url: args.geocode_url.clone(),
            api_key: args.api_key.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

impl From<&MapArgs> for MapSettings {
    fn from(args: &MapArgs) -> Self {
        Self {
            title: args.title.clone(),
            max_retries: args.max_retries,
            columns: (&args.columns).into(),
            ..MapSettings::from(&args.api)
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich(args) => {
            enricher::run(&args.input, args.output.as_deref(), (&args).into()).await?;
        }
        Command::Map(args) => {
            mapper::run(&args.input, args.output.as_deref(), (&args).into()).await?;
        }
        Command::CheckApi(args) => {
            let settings: MapSettings = (&args).into();
            if !settings.has_usable_key() {
                mapper::log_setup_checklist();
                return Err(AppError::MissingApiKey);
            }
            Geocoder::new(&settings)?.test_connection().await?;
        }
    }
    Ok(())
}
