//! MoMo Shield - Demo Daemon
//!
//! Reads SMS batches from stdin, streams them as JSON lines and logs fraud
//! alerts. One batch per line, messages separated by `;;`, each message
//! written as `address|body`.
//!
//! ```text
//! +233201111111|Hello;;+233202222222|Your MoMo has been blocked, call now
//! ```

use std::io::BufRead;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::oneshot;

use momo_shield_core::constants::{self, METHOD_GET_RECENT_MESSAGES, SMS_CHANNEL};
use momo_shield_core::logic::alert::{LogPresenter, LogWaker};
use momo_shield_core::logic::error::PduError;
use momo_shield_core::logic::permission::StaticPermissions;
use momo_shield_core::logic::query::{MemoryMessageStore, MessageStore, SqliteMessageStore};
use momo_shield_core::logic::subscription::{ChannelSink, LocalMessageSource, SmsBatch, SmsPdu, StreamEvent};
use momo_shield_core::{ShieldConfig, ShieldService};

const BATCH_SEPARATOR: &str = ";;";

#[tokio::main]
async fn main() {
    let (config, config_problem) = ShieldConfig::load_checked(ShieldConfig::path_from_env().as_deref());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);
    if let Some(e) = config_problem {
        log::warn!("{}, using defaults", e);
    }

    let store: Arc<dyn MessageStore> = match SqliteMessageStore::open(&config.inbox_path()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::warn!("SMS inbox unavailable ({}), using empty in-memory store", e);
            Arc::new(MemoryMessageStore::new())
        }
    };

    let source = Arc::new(LocalMessageSource::new());
    let permissions = Arc::new(StaticPermissions::new(config.permissions_granted, config.permissions_granted));

    let service = ShieldService::new(
        &config,
        store,
        source.clone(),
        permissions,
        Arc::new(LogPresenter),
        Arc::new(LogWaker),
    );

    // Inbox snapshot
    let recent = service.handle_call(SMS_CHANNEL, METHOD_GET_RECENT_MESSAGES, &json!({}));
    match serde_json::to_string_pretty(&recent) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("Failed to serialize recent messages: {}", e),
    }

    let (sink, mut stream) = ChannelSink::new();
    if let Err(e) = service.on_listen(Arc::new(sink)) {
        log::error!("Cannot listen for SMS: {}", e);
        return;
    }

    let (eof_tx, mut eof_rx) = oneshot::channel::<()>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    let batch = parse_batch_line(&line);
                    if !batch.is_empty() {
                        source.deliver(batch);
                    }
                }
                Err(e) => {
                    log::warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
        let _ = eof_tx.send(());
    });

    loop {
        tokio::select! {
            event = stream.next() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            _ = &mut eof_rx => {
                log::info!("Input closed");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                break;
            }
        }
    }

    service.on_cancel();
    for event in stream.drain() {
        print_event(&event);
    }

    match serde_json::to_string(&service.stats()) {
        Ok(stats) => log::info!("Pipeline stats: {}", stats),
        Err(e) => log::debug!("Stats unavailable: {}", e),
    }
    log::info!("{} stopped", constants::APP_NAME);
}

fn print_event(event: &StreamEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => log::error!("Failed to serialize stream event: {}", e),
    }
}

/// `a|b;;c|d` -> two messages; a segment without `|` is a parse failure
fn parse_batch_line(line: &str) -> SmsBatch {
    let now = chrono::Utc::now().timestamp_millis();

    line.split(BATCH_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('|') {
            Some((address, body)) => Ok(SmsPdu::new(address.trim(), body.trim(), now)),
            None => Err(PduError(format!("expected address|body, got '{}'", segment))),
        })
        .collect()
}
