use clap::Parser;
use serde_json::{json, Value};
use travel_search_tools::adapters::{flight_search, hotel_search, web_search};
use travel_search_tools::config::cli::hotel_args;
use travel_search_tools::config::Command;
use travel_search_tools::utils::{logger, validation::Validate};
use travel_search_tools::{require_credentials_for, CliConfig, TomlConfig, ToolError, TravelTools};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    let config = cli.load_toml();

    // 初始化日誌（設定檔讀不到時用預設值，錯誤稍後回報）
    match &config {
        Ok(config) => logger::init_cli_logger(cli.verbose, config.log_level(), config.json_logs()),
        Err(_) => logger::init_cli_logger(cli.verbose, None, false),
    }

    tracing::info!("🚀 Starting travel-tools");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli, config).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => exit_with(&ToolError::from(e)),
        },
        Err(e) => exit_with(&e),
    }
}

async fn run(cli: &CliConfig, config: Result<TomlConfig, ToolError>) -> Result<Value, ToolError> {
    let config = config?;
    config.validate()?;

    let tools = TravelTools::from_config(&config);

    match &cli.command {
        Command::Tools => Ok(serde_json::to_value(tools.descriptors())?),
        command => {
            // 只檢查這個指令會用到的供應商金鑰
            for id in tool_ids(command) {
                require_credentials_for(&config, id)?;
            }
            dispatch(&tools, command).await
        }
    }
}

fn tool_ids(command: &Command) -> Vec<&str> {
    match command {
        Command::Web { .. } => vec![web_search::TOOL_ID],
        Command::Flights { .. } => vec![flight_search::TOOL_ID],
        Command::Hotels { .. } => vec![hotel_search::TOOL_ID],
        Command::Trip { .. } => vec![flight_search::TOOL_ID, hotel_search::TOOL_ID],
        Command::Call { tool, .. } => vec![tool.as_str()],
        Command::Tools => Vec::new(),
    }
}

async fn dispatch(tools: &TravelTools, command: &Command) -> Result<Value, ToolError> {
    match command {
        Command::Web { query } => tools.call(web_search::TOOL_ID, json!({ "query": query })).await,
        Command::Flights { flight } => tools.call(flight_search::TOOL_ID, flight.to_args()).await,
        Command::Hotels { location, limit } => {
            tools
                .call(hotel_search::TOOL_ID, hotel_args(location, *limit))
                .await
        }
        Command::Trip { flight, hotel_limit } => {
            let destination = vec![flight.destination.clone()];
            // 兩個工具互不相干，同時發出
            let (flights, hotels) = tokio::join!(
                tools.call(flight_search::TOOL_ID, flight.to_args()),
                tools.call(hotel_search::TOOL_ID, hotel_args(&destination, *hotel_limit)),
            );
            let mut flights = flights?;
            let mut hotels = hotels?;
            Ok(json!({
                "flights": flights.get_mut("flights").map(Value::take).unwrap_or_default(),
                "hotels": hotels.get_mut("hotels").map(Value::take).unwrap_or_default(),
            }))
        }
        Command::Call { tool, args } => {
            let args: Value = serde_json::from_str(args)?;
            tools.call(tool, args).await
        }
        Command::Tools => Ok(serde_json::to_value(tools.descriptors())?),
    }
}

fn exit_with(e: &ToolError) -> ! {
    tracing::error!("❌ travel-tools failed: {}", e);
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 呼叫端錯誤與設定錯誤分開
    let exit_code = match e {
        ToolError::InvalidInput { .. } | ToolError::UnknownTool { .. } | ToolError::SerializationError(_) => 2,
        _ => 1,
    };
    std::process::exit(exit_code);
}
