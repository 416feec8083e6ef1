use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Parser)]
#[command(name = "travel-tools")]
#[command(about = "Travel search tools: web, flights and hotels")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults + environment variables when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Single-token web search
    Web { query: String },

    /// Flight search
    Flights {
        #[command(flatten)]
        flight: FlightArgs,
    },

    /// Hotel search for one or more locations
    Hotels {
        #[arg(required = true)]
        location: Vec<String>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Flights plus hotels at the destination, fetched concurrently
    Trip {
        #[command(flatten)]
        flight: FlightArgs,

        #[arg(long)]
        hotel_limit: Option<u32>,
    },

    /// List available tools
    Tools,

    /// Call a tool by id with raw JSON arguments
    Call { tool: String, args: String },
}

#[derive(Debug, Clone, clap::Args)]
pub struct FlightArgs {
    #[arg(long)]
    pub origin: String,

    #[arg(long)]
    pub destination: String,

    /// YYYY-MM-DD
    #[arg(long)]
    pub departure_date: String,

    #[arg(long)]
    pub return_date: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long)]
    pub currency: Option<String>,

    #[arg(long)]
    pub sort: Option<String>,

    #[arg(long)]
    pub non_stop: bool,

    #[arg(long)]
    pub one_stop: bool,

    #[arg(long)]
    pub two_plus_stops: bool,

    #[arg(long)]
    pub adults: Option<u32>,
}

impl FlightArgs {
    /// 轉成工具的 JSON 參數；驗證交給工具本身
    pub fn to_args(&self) -> Value {
        let mut args = Map::new();
        args.insert("origin".into(), self.origin.clone().into());
        args.insert("destination".into(), self.destination.clone().into());
        args.insert("departureDate".into(), self.departure_date.clone().into());
        if let Some(return_date) = &self.return_date {
            args.insert("returnDate".into(), return_date.clone().into());
        }
        if let Some(limit) = self.limit {
            args.insert("limit".into(), limit.into());
        }
        if let Some(currency) = &self.currency {
            args.insert("currency".into(), currency.clone().into());
        }
        if let Some(sort) = &self.sort {
            args.insert("sort".into(), sort.clone().into());
        }
        // 旗標只在有指定時送出
        if self.non_stop {
            args.insert("nonStop".into(), true.into());
        }
        if self.one_stop {
            args.insert("oneStop".into(), true.into());
        }
        if self.two_plus_stops {
            args.insert("twoPlusStops".into(), true.into());
        }
        if let Some(adults) = self.adults {
            args.insert("adults".into(), adults.into());
        }
        Value::Object(args)
    }
}

pub fn hotel_args(location: &[String], limit: Option<u32>) -> Value {
    match limit {
        Some(limit) => json!({"location": location, "limit": limit}),
        None => json!({"location": location}),
    }
}

impl CliConfig {
    pub fn load_toml(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None => Ok(TomlConfig::from_env()),
        }
    }
}
