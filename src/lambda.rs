#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Deserialize;
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use travel_search_tools::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use travel_search_tools::{require_credentials_for, TomlConfig, TravelTools};

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[cfg(feature = "lambda")]
async fn function_handler(
    config: &TomlConfig,
    tools: &TravelTools,
    event: LambdaEvent<Request>,
) -> Result<Value, Error> {
    let Request { tool, args } = event.payload;
    tracing::info!("Invoking tool {} from Lambda", tool);

    // 金鑰缺少或輸入錯誤會走到 Err；供應商失敗會回傳空結果
    require_credentials_for(config, &tool)?;
    let output = tools
        .call(&tool, args)
        .await
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    Ok(output)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = match std::env::var("TRAVEL_TOOLS_CONFIG") {
        Ok(path) => TomlConfig::from_file(path)?,
        Err(_) => TomlConfig::from_env(),
    };
    logger::init_lambda_logger(config.log_level());
    config.validate()?;

    let tools = TravelTools::from_config(&config);
    let (config, tools) = (&config, &tools);

    run(service_fn(move |event: LambdaEvent<Request>| async move {
        function_handler(config, tools, event).await
    }))
    .await
}
