use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 優先；其次 `--verbose`；再來是設定檔 `[logging] level`
pub fn cli_filter_directive(verbose: bool, level: Option<&str>) -> String {
    match (verbose, level) {
        (true, _) => "travel_search_tools=debug,info".to_string(),
        (false, Some(level)) => format!("travel_search_tools={},warn", level),
        (false, None) => "travel_search_tools=info,warn".to_string(),
    }
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli_filter_directive(verbose, level)));

    // stdout 保留給工具輸出的 JSON，日誌一律寫到 stderr
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
    });
    let compact_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
}

pub fn init_lambda_logger(level: Option<&str>) {
    let directive = format!("travel_search_tools={}", level.unwrap_or("info"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // Lambda uses JSON format for better CloudWatch integration
        )
        .init();
}
