use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tipclock::channel::Endpoint;
use tipclock::control::{Command, CommandDispatcher, Dispatch, Verb};
use tipclock::render::views::{ColorView, ControlView, TimerView};
use tipclock::service::PanelService;

type SharedLines = Arc<Mutex<tokio::io::Lines<BufReader<tokio::io::Stdin>>>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(_) => None,
    };

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level if RUST_LOG is not set
            if cfg!(debug_assertions) {
                "tipclock=debug,warn".into()
            } else {
                "tipclock=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!("tipclock starting");

    // Log environment loading after logger is initialized
    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    // Load configuration
    let config = tipclock::config::load_config();

    // Wire up the panel: views first, then the routing loop, then the channels
    let service = Arc::new(PanelService::new(config.clone()));
    service.register_handler("timer", Box::new(TimerView::new())).await;
    service
        .register_handler("timer_cfg", Box::new(ColorView::new()))
        .await;
    service
        .register_handler("control", Box::new(ControlView::new()))
        .await;
    service.start().await;

    service
        .attach_channel(
            "timer",
            Endpoint::from_server(&config.server, &config.endpoints.timer),
        )
        .await;
    service
        .attach_channel(
            "timer_cfg",
            Endpoint::from_server(&config.server, &config.endpoints.timer_cfg),
        )
        .await;
    let control = service
        .attach_channel(
            "control",
            Endpoint::from_server(&config.server, &config.endpoints.control),
        )
        .await;

    // One shared stdin reader: the command loop and the confirmation prompt
    // take turns on it
    let lines: SharedLines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));

    let confirm_lines = Arc::clone(&lines);
    let dispatcher = CommandDispatcher::with_confirmation(
        Arc::clone(&control),
        Arc::new(move |command: &Command| {
            let lines = Arc::clone(&confirm_lines);
            let wire = command.wire();
            Box::pin(async move { confirm_on_stdin(lines, &wire).await })
        }),
    );

    println!(
        "tipclock {} — commands: set HH:MM:SS | start | stop | reset | coef <number> | color black|white | token <string> | quit",
        tipclock::VERSION
    );

    loop {
        let line = {
            let mut guard = lines.lock().await;
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
                line = guard.next_line() => line?,
            }
        };

        match line {
            Some(line) => {
                if !handle_line(&dispatcher, line.trim()).await {
                    break;
                }
            }
            None => break,
        }
    }

    service.shutdown().await;
    info!("tipclock stopped");
    Ok(())
}

/// Handle one console line; returns false when the user asked to quit
async fn handle_line(dispatcher: &CommandDispatcher, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    if line == "quit" || line == "exit" {
        return false;
    }

    let (keyword, raw) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest),
        None => (line, ""),
    };

    let Some(verb) = Verb::from_keyword(keyword) else {
        println!("Unknown command: {}", keyword);
        return true;
    };

    match dispatcher.submit(verb, raw).await {
        Ok(Dispatch::Sent(_)) => {}
        Ok(Dispatch::Discarded) => println!("Cancelled."),
        Ok(Dispatch::Offline(_)) => {
            println!("Control endpoint is not connected; command not sent.")
        }
        Err(e) => println!("Rejected: {}", e),
    }

    true
}

/// Ask for a yes/no answer on the shared stdin reader
async fn confirm_on_stdin(lines: SharedLines, wire: &str) -> bool {
    println!("Send '{}'? [y/N]", wire);
    let mut guard = lines.lock().await;
    match guard.next_line().await {
        Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        _ => false,
    }
}
