//! Subscription pipeline tests: start/stop lifecycle, batch delivery,
//! alerting, and stop racing delivery.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Weak};
use std::thread;

use parking_lot::Mutex;

use super::*;
use crate::logic::alert::{
    AlertChannel, AlertDispatcher, AlertPresenter, AlertRecord, ForegroundWaker, LogWaker, SlotId,
    WakeRequest,
};
use crate::logic::classifier::FraudClassifier;
use crate::logic::error::{DispatchError, PduError, ShieldError, SourceError};
use crate::logic::permission::{Permission, StaticPermissions};

// ============================================================================
// TEST DOUBLES
// ============================================================================

#[derive(Default)]
struct RecordingPresenter {
    shown: Mutex<Vec<AlertRecord>>,
    stop_on_present: Mutex<Option<Weak<SubscriptionManager>>>,
}

impl AlertPresenter for RecordingPresenter {
    fn present(&self, _channel: &AlertChannel, _slot: SlotId, alert: &AlertRecord) -> Result<(), DispatchError> {
        self.shown.lock().push(alert.clone());
        let target = self.stop_on_present.lock().clone();
        if let Some(manager) = target.and_then(|w| w.upgrade()) {
            manager.stop();
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountingWaker {
    wakes: AtomicUsize,
}

impl ForegroundWaker for CountingWaker {
    fn wake(&self, _request: &WakeRequest) -> Result<(), DispatchError> {
        self.wakes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingPresenter;

impl AlertPresenter for FailingPresenter {
    fn present(&self, _channel: &AlertChannel, _slot: SlotId, _alert: &AlertRecord) -> Result<(), DispatchError> {
        Err(DispatchError::Presentation("no notification manager".into()))
    }
}

/// Source whose unregister "fails" and keeps the old callback around,
/// like a platform that still has a delivery queued.
#[derive(Default)]
struct LeakySource {
    inner: LocalMessageSource,
    kept: Mutex<Option<BatchCallback>>,
}

impl LeakySource {
    fn replay(&self, batch: SmsBatch) {
        let callback = self.kept.lock().clone();
        if let Some(callback) = callback {
            callback(batch);
        }
    }
}

impl MessageSource for LeakySource {
    fn register(&self, on_batch: BatchCallback) -> Result<SourceHandle, SourceError> {
        *self.kept.lock() = Some(on_batch.clone());
        self.inner.register(on_batch)
    }

    fn unregister(&self, handle: SourceHandle) -> Result<(), SourceError> {
        Err(SourceError::NotRegistered(handle.0))
    }
}

struct Harness {
    source: Arc<LocalMessageSource>,
    permissions: Arc<StaticPermissions>,
    presenter: Arc<RecordingPresenter>,
    waker: Arc<CountingWaker>,
    manager: Arc<SubscriptionManager>,
}

fn harness() -> Harness {
    let source = Arc::new(LocalMessageSource::new());
    let permissions = Arc::new(StaticPermissions::granted());
    let presenter = Arc::new(RecordingPresenter::default());
    let waker = Arc::new(CountingWaker::default());
    let dispatcher = Arc::new(AlertDispatcher::new(presenter.clone(), waker.clone()));
    let manager = Arc::new(SubscriptionManager::new(
        source.clone(),
        permissions.clone(),
        dispatcher,
        FraudClassifier::new(),
    ));

    Harness {
        source,
        permissions,
        presenter,
        waker,
        manager,
    }
}

fn sms(address: &str, body: &str, ts: i64) -> Result<SmsPdu, PduError> {
    Ok(SmsPdu::new(address, body, ts))
}

fn bodies(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Message(m) => Some(m.body.clone()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_start_then_stop() {
    let h = harness();
    let (sink, _stream) = ChannelSink::new();

    assert_eq!(h.manager.state(), SubscriptionState::Idle);
    h.manager.start(Arc::new(sink)).unwrap();
    assert_eq!(h.manager.state(), SubscriptionState::Listening);
    assert_eq!(h.source.registered_count(), 1);

    h.manager.stop();
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
    assert_eq!(h.source.registered_count(), 0);
}

#[test]
fn test_permission_denied_does_not_register() {
    let h = harness();
    h.permissions.set(Permission::ReadSms, false);
    let (sink, _stream) = ChannelSink::new();

    let err = h.manager.start(Arc::new(sink)).unwrap_err();

    assert_eq!(err, ShieldError::PermissionDenied);
    assert_eq!(err.code(), "PERMISSION_DENIED");
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
    assert_eq!(h.source.registered_count(), 0);
}

#[test]
fn test_listener_start_error_stays_idle_and_can_retry() {
    let h = harness();
    h.source.reject_registrations(Some("receiver quota exceeded"));

    let (sink, _stream) = ChannelSink::new();
    let err = h.manager.start(Arc::new(sink)).unwrap_err();
    assert!(matches!(err, ShieldError::ListenerStart(_)));
    assert_eq!(h.manager.state(), SubscriptionState::Idle);

    h.source.reject_registrations(None);
    let (sink, _stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();
    assert!(h.manager.is_listening());
}

#[test]
fn test_stop_while_idle_is_noop() {
    let h = harness();
    h.manager.stop();
    h.manager.stop();
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
}

#[test]
fn test_double_stop_after_listening() {
    let h = harness();
    let (sink, _stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.manager.stop();
    h.manager.stop();
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
}

#[test]
fn test_second_start_supersedes_sink() {
    let h = harness();
    let (first, mut first_stream) = ChannelSink::new();
    let (second, mut second_stream) = ChannelSink::new();

    h.manager.start(Arc::new(first)).unwrap();
    h.manager.start(Arc::new(second)).unwrap();
    assert_eq!(h.source.registered_count(), 1);

    h.source.deliver(vec![sms("+1", "hi", 1)]);

    assert_eq!(bodies(&second_stream.drain()), vec!["hi"]);
    // old sink was dropped when replaced: its stream is closed and empty
    assert!(first_stream.drain().is_empty());
}

#[test]
fn test_drop_unregisters() {
    let h = harness();
    let (sink, _stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    let source = h.source.clone();
    drop(h);
    assert_eq!(source.registered_count(), 0);
}

// ============================================================================
// DELIVERY
// ============================================================================

#[test]
fn test_batch_in_order_with_single_alert() {
    let h = harness();
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![
        sms("+233200000001", "Hello mum, call me later", 10),
        sms("+233200000002", "Your MoMo has been blocked. Call now", 20),
    ]);

    let events = stream.drain();
    assert_eq!(
        bodies(&events),
        vec!["Hello mum, call me later", "Your MoMo has been blocked. Call now"]
    );

    let shown = h.presenter.shown.lock();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].phone_number, "+233200000002");
    assert_eq!(shown[0].threat_type, "SCAM");
    assert_eq!(h.waker.wakes.load(Ordering::SeqCst), 1);

    let stats = h.manager.stats();
    assert_eq!(stats.messages_delivered, 2);
    assert_eq!(stats.frauds_detected, 1);
    assert_eq!(stats.alerts_presented, 1);
}

#[test]
fn test_stream_ids_are_distinct_within_batch() {
    let h = harness();
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![sms("a", "one", 1), sms("a", "two", 1), sms("a", "three", 1)]);

    let ids: Vec<String> = stream
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            StreamEvent::Message(m) => Some(m.id),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);
}

#[test]
fn test_parse_error_does_not_stop_batch() {
    let h = harness();
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![
        sms("+1", "first", 1),
        Err(PduError("truncated PDU".into())),
        sms("+2", "third", 3),
    ]);
    h.source.deliver(vec![sms("+3", "next batch", 4)]);

    let events = stream.drain();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[1],
        StreamEvent::Error {
            code: "SMS_PARSE_ERROR".into(),
            message: "failed to parse SMS: truncated PDU".into()
        }
    );
    assert_eq!(bodies(&events), vec!["first", "third", "next batch"]);
    assert_eq!(h.manager.stats().parse_errors, 1);
}

#[test]
fn test_missing_fields_default_and_alert_unknown_sender() {
    let h = harness();
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![Ok(SmsPdu {
        originating_address: None,
        message_body: Some("URGENT MONEY NEEDED".into()),
        timestamp_millis: 5,
    })]);

    match stream.try_next() {
        Some(StreamEvent::Message(m)) => assert_eq!(m.address, ""),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(h.presenter.shown.lock()[0].phone_number, "Unknown");
}

#[test]
fn test_dispatch_failure_does_not_halt_ingestion() {
    let source = Arc::new(LocalMessageSource::new());
    let dispatcher = Arc::new(AlertDispatcher::new(Arc::new(FailingPresenter), Arc::new(LogWaker)));
    let manager = SubscriptionManager::new(
        source.clone(),
        Arc::new(StaticPermissions::granted()),
        dispatcher,
        FraudClassifier::new(),
    );
    let (sink, mut stream) = ChannelSink::new();
    manager.start(Arc::new(sink)).unwrap();

    source.deliver(vec![sms("+1", "you won!", 1), sms("+2", "unlock bonus", 2), sms("+3", "ok", 3)]);

    assert_eq!(bodies(&stream.drain()).len(), 3);
    let stats = manager.stats();
    assert_eq!(stats.frauds_detected, 2);
    assert_eq!(stats.alerts_presented, 0);
    assert_eq!(stats.dispatch_failures, 2);
}

#[test]
fn test_burst_of_frauds_leaves_last_alert_visible() {
    let h = harness();
    let (sink, _stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![
        sms("+1", "you won", 1),
        sms("+2", "cash-out now", 2),
        sms("+3", "account suspended", 3),
    ]);

    let visible = h.manager.dispatcher().current_alert().unwrap();
    assert_eq!(visible.phone_number, "+3");
    assert_eq!(h.presenter.shown.lock().len(), 3);
    // burst of wake requests collapses into one
    assert_eq!(h.waker.wakes.load(Ordering::SeqCst), 1);
}

// ============================================================================
// STOP VS DELIVERY
// ============================================================================

#[test]
fn test_nothing_delivered_after_stop() {
    let h = harness();
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = counter.clone();
    let sink = FnSink::new(
        move |_m| {
            seen.fetch_add(1, Ordering::SeqCst);
        },
        |_code, _detail| {},
    );
    h.manager.start(Arc::new(sink)).unwrap();
    h.manager.stop();

    assert_eq!(h.source.deliver(vec![sms("+1", "you won", 1)]), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(h.presenter.shown.lock().is_empty());
}

#[test]
fn test_stale_callback_after_stop_is_ignored() {
    let source = Arc::new(LeakySource::default());
    let presenter = Arc::new(RecordingPresenter::default());
    let dispatcher = Arc::new(AlertDispatcher::new(presenter.clone(), Arc::new(LogWaker)));
    let manager = SubscriptionManager::new(
        source.clone(),
        Arc::new(StaticPermissions::granted()),
        dispatcher,
        FraudClassifier::new(),
    );
    let (sink, mut stream) = ChannelSink::new();
    manager.start(Arc::new(sink)).unwrap();

    // unregister reports NotRegistered; stop must swallow it
    manager.stop();
    assert_eq!(manager.state(), SubscriptionState::Idle);

    source.replay(vec![sms("+1", "you won", 1), sms("+2", "hello", 2)]);

    assert!(stream.drain().is_empty());
    assert!(presenter.shown.lock().is_empty());
    assert_eq!(manager.stats().messages_dropped, 2);
}

#[test]
fn test_stale_callback_ignored_after_restart() {
    let source = Arc::new(LeakySource::default());
    let manager = SubscriptionManager::new(
        source.clone(),
        Arc::new(StaticPermissions::granted()),
        Arc::new(AlertDispatcher::new(Arc::new(RecordingPresenter::default()), Arc::new(LogWaker))),
        FraudClassifier::new(),
    );

    let (old_sink, _old_stream) = ChannelSink::new();
    manager.start(Arc::new(old_sink)).unwrap();
    let stale = source.kept.lock().clone().unwrap();
    manager.stop();

    let (sink, mut stream) = ChannelSink::new();
    manager.start(Arc::new(sink)).unwrap();

    stale(vec![sms("+1", "from old registration", 1)]);
    source.inner.deliver(vec![sms("+2", "from new registration", 2)]);

    assert_eq!(bodies(&stream.drain()), vec!["from new registration"]);
}

#[test]
fn test_stop_mid_batch_drops_remaining_messages() {
    let h = harness();
    *h.presenter.stop_on_present.lock() = Some(Arc::downgrade(&h.manager));
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![
        sms("+1", "send your momo pin", 1),
        sms("+2", "you won", 2),
        sms("+3", "hello", 3),
    ]);

    assert_eq!(bodies(&stream.drain()), vec!["send your momo pin"]);
    assert_eq!(h.presenter.shown.lock().len(), 1);
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
    assert_eq!(h.manager.stats().messages_dropped, 2);
}

/// Presenter that parks inside `present` until released
struct GatedPresenter {
    shown: AtomicUsize,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl AlertPresenter for GatedPresenter {
    fn present(&self, _channel: &AlertChannel, _slot: SlotId, _alert: &AlertRecord) -> Result<(), DispatchError> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        let _ = self.entered.lock().send(());
        let _ = self.release.lock().recv();
        Ok(())
    }
}

#[test]
fn test_stop_during_dispatch_lets_only_inflight_alert_finish() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let presenter = Arc::new(GatedPresenter {
        shown: AtomicUsize::new(0),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let waker = Arc::new(CountingWaker::default());
    let source = Arc::new(LocalMessageSource::new());
    let manager = SubscriptionManager::new(
        source.clone(),
        Arc::new(StaticPermissions::granted()),
        Arc::new(AlertDispatcher::new(presenter.clone(), waker.clone())),
        FraudClassifier::new(),
    );
    let (sink, mut stream) = ChannelSink::new();
    manager.start(Arc::new(sink)).unwrap();

    let producer = {
        let source = source.clone();
        thread::spawn(move || {
            source.deliver(vec![sms("+1", "you won", 1), sms("+2", "cash-out now", 2)]);
        })
    };

    entered_rx.recv().unwrap();
    manager.stop();
    release_tx.send(()).unwrap();
    producer.join().unwrap();

    // the alert already being presented completes, the next message never starts
    assert_eq!(presenter.shown.load(Ordering::SeqCst), 1);
    assert_eq!(waker.wakes.load(Ordering::SeqCst), 1);
    assert_eq!(bodies(&stream.drain()), vec!["you won"]);
    assert_eq!(manager.stats().messages_dropped, 1);

    source.deliver(vec![sms("+3", "you won", 3)]);
    assert_eq!(presenter.shown.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_delivery_and_restart() {
    let h = harness();
    let emitted = Arc::new(AtomicUsize::new(0));

    let mut producers = Vec::new();
    for t in 0..4 {
        let source = h.source.clone();
        producers.push(thread::spawn(move || {
            for i in 0..200 {
                source.deliver(vec![sms("+1", "hello", i), sms("+2", &format!("msg {} {}", t, i), i)]);
            }
        }));
    }

    for _ in 0..50 {
        let seen = emitted.clone();
        let sink = FnSink::new(
            move |_m| {
                seen.fetch_add(1, Ordering::SeqCst);
            },
            |_code, _detail| {},
        );
        h.manager.start(Arc::new(sink)).unwrap();
        thread::yield_now();
        h.manager.stop();
    }

    for p in producers {
        p.join().unwrap();
    }

    let after_stop = emitted.load(Ordering::SeqCst);
    h.source.deliver(vec![sms("+9", "late", 0)]);

    assert_eq!(emitted.load(Ordering::SeqCst), after_stop);
    assert_eq!(h.manager.stats().messages_delivered as usize, after_stop);
    assert_eq!(h.manager.state(), SubscriptionState::Idle);
}

#[tokio::test]
async fn test_event_stream_ends_after_stop() {
    let h = harness();
    let (sink, mut stream) = ChannelSink::new();
    h.manager.start(Arc::new(sink)).unwrap();

    h.source.deliver(vec![sms("+1", "hello", 1)]);
    h.manager.stop();

    assert!(matches!(stream.next().await, Some(StreamEvent::Message(_))));
    assert_eq!(stream.next().await, None);
}
