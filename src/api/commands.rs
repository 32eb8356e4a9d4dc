//! Shield Commands - Request/Response Surface
//!
//! Two method channels (`momoshield/sms`, `momoshield/notifications`) and
//! one event channel (`momoshield/sms_stream`, via `on_listen`/`on_cancel`).
//! Arguments arrive as loose JSON; missing ones fall back to defaults.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::constants::{
    METHOD_GET_RECENT_MESSAGES, METHOD_SHOW_FRAUD_ALERT, METHOD_WAKE_UP_APP, NOTIFICATION_CHANNEL,
    SMS_CHANNEL, SMS_STREAM_CHANNEL, UNKNOWN_SENDER,
};
use crate::logic::alert::{AlertDispatcher, AlertPresenter, ForegroundWaker};
use crate::logic::classifier::FraudClassifier;
use crate::logic::config::ShieldConfig;
use crate::logic::error::ShieldError;
use crate::logic::permission::PermissionGate;
use crate::logic::query::{MessageStore, QueryService};
use crate::logic::subscription::{MessageSink, MessageSource, StatsSnapshot, SubscriptionManager};

const DEFAULT_ALERT_MESSAGE: &str = "Suspicious message detected";
const DEFAULT_THREAT_TYPE: &str = "Fraud";

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success { result: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    fn ack() -> Self {
        MethodResponse::Success { result: Value::Bool(true) }
    }

    fn from_error(err: &ShieldError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// The pieces a host needs: queries, alerts and the live stream
pub struct ShieldService {
    queries: QueryService,
    dispatcher: Arc<AlertDispatcher>,
    subscriptions: SubscriptionManager,
}

impl ShieldService {
    pub fn new(
        config: &ShieldConfig,
        store: Arc<dyn MessageStore>,
        source: Arc<dyn MessageSource>,
        permissions: Arc<dyn PermissionGate>,
        presenter: Arc<dyn AlertPresenter>,
        waker: Arc<dyn ForegroundWaker>,
    ) -> Self {
        let dispatcher = Arc::new(AlertDispatcher::new(presenter, waker).with_config(config));
        let classifier = FraudClassifier::new().with_threat_label(&config.stream_threat_label);

        Self {
            queries: QueryService::new(store, permissions.clone()).with_default_limit(config.default_query_limit),
            subscriptions: SubscriptionManager::new(source, permissions, dispatcher.clone(), classifier),
            dispatcher,
        }
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
        &self.dispatcher
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.subscriptions.stats()
    }

    /// Route by channel name
    pub fn handle_call(&self, channel: &str, method: &str, args: &Value) -> MethodResponse {
        match channel {
            SMS_CHANNEL => self.handle_sms_call(method, args),
            NOTIFICATION_CHANNEL => self.handle_notification_call(method, args),
            _ => {
                log::debug!("Call on unknown channel {}", channel);
                MethodResponse::NotImplemented
            }
        }
    }

    pub fn handle_sms_call(&self, method: &str, args: &Value) -> MethodResponse {
        match method {
            METHOD_GET_RECENT_MESSAGES => {
                let limit = args.get("limit").and_then(Value::as_i64);
                match self.queries.get_recent_messages(limit) {
                    Ok(messages) => MethodResponse::Success { result: json!(messages) },
                    Err(e) => MethodResponse::from_error(&e),
                }
            }
            _ => MethodResponse::NotImplemented,
        }
    }

    pub fn handle_notification_call(&self, method: &str, args: &Value) -> MethodResponse {
        match method {
            METHOD_SHOW_FRAUD_ALERT => {
                let phone_number = str_arg(args, "phoneNumber", UNKNOWN_SENDER);
                let message = str_arg(args, "message", DEFAULT_ALERT_MESSAGE);
                let threat_type = str_arg(args, "threatType", DEFAULT_THREAT_TYPE);

                if let Err(e) = self.dispatcher.present_alert(phone_number, message, threat_type) {
                    log::error!("showFraudAlert: {}", e);
                }
                MethodResponse::ack()
            }
            METHOD_WAKE_UP_APP => {
                if let Err(e) = self.dispatcher.request_foreground_wake() {
                    log::error!("wakeUpApp: {}", e);
                }
                MethodResponse::ack()
            }
            _ => MethodResponse::NotImplemented,
        }
    }

    // ========================================================================
    // STREAM
    // ========================================================================

    /// Subscribe `sink` to the live stream. Start failures are also reported
    /// on the sink's error channel.
    pub fn on_listen(&self, sink: Arc<dyn MessageSink>) -> Result<(), ShieldError> {
        self.subscriptions.start(sink.clone()).map_err(|e| {
            log::warn!("Subscribe on {} failed: {}", SMS_STREAM_CHANNEL, e);
            sink.on_error(e.code(), &e.to_string());
            e
        })
    }

    pub fn on_cancel(&self) {
        self.subscriptions.stop();
    }
}

fn str_arg<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

// ============================================================================
// TESTS
// ============================================================================
