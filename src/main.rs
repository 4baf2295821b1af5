//! Sheetflow CLI (for testing purposes only)
//! The main interface is through WASM bindings.

use std::process::ExitCode;

use sheetflow::{ContentNode, FlowSurface, Paginator, ReflowConfig, Result};

fn usage() {
    println!("Sheetflow Pagination Core");
    println!("=========================");
    println!();
    println!("This is a library crate. To use it:");
    println!();
    println!("  1. Build WASM: wasm-pack build --target web");
    println!("  2. Drive WasmPaginator from the host page");
    println!();
    println!("To reflow a content tree from the command line:");
    println!("  sheetflow <content.json> [config.json]");
}

fn reflow(content_path: &str, config_path: Option<&str>) -> Result<String> {
    let content = ContentNode::from_json(&std::fs::read_to_string(content_path)?)?;
    let config = match config_path {
        Some(path) => ReflowConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ReflowConfig::default(),
    };

    let mut paginator = Paginator::new(&content, FlowSurface::default(), config)?;
    let result = paginator.reflow_now()?;
    Ok(serde_json::to_string_pretty(result)?)
}

fn init_logging() {
    // RUST_LOG overrides; `log` records reach the subscriber through tracing-log
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(content_path) = args.first() else {
        usage();
        return ExitCode::SUCCESS;
    };

    match reflow(content_path, args.get(1).map(String::as_str)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
