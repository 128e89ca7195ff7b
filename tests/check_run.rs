//! End-to-end check passes against local backends.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use uptime_monitor::alerting::{AlertState, AlertStateMap, NotificationRequest};
use uptime_monitor::check::{CheckError, NetworkErrorKind, Probe, Target};
use uptime_monitor::config::ProbeMethod;
use uptime_monitor::notify::{AdapterError, Dispatcher, IssueRef, IssueTracker, MessageId, SmsSender};
use uptime_monitor::resilience::retries::RetryPolicy;
use uptime_monitor::store::{JsonFileStore, MemoryStore, StateStore};
use uptime_monitor::{run_once, MonitorConfig, UptimeCheckRunner};

mod common;

const RECIPIENT: &str = "+15551111";

fn config(threshold: u32, repeat_every: u32, cooldown_secs: u64) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.http.timeout_secs = 2;
    config.alerting.failure_threshold = threshold;
    config.alerting.repeat_every = repeat_every;
    config.alerting.cooldown_secs = cooldown_secs;
    config.messaging.from = "+15550000".into();
    config.messaging.to = vec![RECIPIENT.into()];
    config
}

fn target(addr: std::net::SocketAddr) -> Target {
    Target::new(format!("http://{}/", addr), Duration::from_secs(2))
}

fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + chrono::Duration::minutes(minute)
}

#[derive(Default)]
struct Recorder {
    sms: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    resolved: Mutex<Vec<String>>,
}

#[async_trait]
impl SmsSender for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn send(&self, to: &str, _body: &str) -> Result<MessageId, AdapterError> {
        self.sms.lock().unwrap().push(to.to_string());
        Ok(MessageId(format!("SM{}", self.sms.lock().unwrap().len())))
    }
}

#[async_trait]
impl IssueTracker for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn open(&self, title: &str, _body: &str, _labels: &[String]) -> Result<IssueRef, AdapterError> {
        self.opened.lock().unwrap().push(title.to_string());
        Ok(IssueRef { number: 1, url: "https://example.invalid/1".into(), created: true })
    }

    async fn resolve(&self, title: &str, _comment: &str) -> Result<Option<IssueRef>, AdapterError> {
        self.resolved.lock().unwrap().push(title.to_string());
        Ok(None)
    }
}

fn dispatcher(recorder: &Arc<Recorder>) -> Dispatcher {
    Dispatcher::new(
        Some(recorder.clone() as Arc<dyn SmsSender>),
        Some(recorder.clone() as Arc<dyn IssueTracker>),
        RetryPolicy::none(),
    )
}

#[tokio::test]
async fn test_one_result_per_target_in_order() {
    let up = common::start_mock_backend(200).await;
    let no_content = common::start_mock_backend(204).await;
    let down = common::start_mock_backend(503).await;

    let targets = vec![
        target(up),
        target(down),
        Target::new("not a url", Duration::from_secs(2)),
        target(no_content),
    ];
    let runner = UptimeCheckRunner::from_config(&config(1, 0, 3600)).unwrap();
    let report = runner.run(&targets, &AlertStateMap::new(), at(0)).await;

    assert_eq!(report.results.len(), 4);
    for (result, target) in report.results.iter().zip(&targets) {
        assert_eq!(result.target.url, target.url);
    }

    assert!(report.results[0].success);
    assert_eq!(report.results[0].status_code, Some(200));
    assert!(matches!(
        report.results[1].error,
        Some(CheckError::StatusMismatch { actual: 503, .. })
    ));
    assert!(report.results[2].is_config_error());
    assert_eq!(report.results[2].attempts, 0);
    assert!(report.results[3].success);

    // Misconfigured targets leave no state behind.
    assert_eq!(report.new_state.len(), 3);
    assert!(!report.new_state.contains_key("not a url"));
    assert_eq!(report.new_state[&targets[1].url].consecutive_failures, 1);
    assert_eq!(report.new_state[&targets[0].url].consecutive_failures, 0);

    let kinds: Vec<_> = report.notifications.iter().map(NotificationRequest::kind).collect();
    assert_eq!(kinds, vec!["sms_alert", "issue_report"]);

    let summary = report.summary();
    assert_eq!((summary.up, summary.down, summary.misconfigured), (2, 1, 1));
}

#[tokio::test]
async fn test_empty_target_list_changes_nothing() {
    let mut prior = AlertStateMap::new();
    let mut state = AlertState::new("https://example.com/");
    state.consecutive_failures = 4;
    state.down_since = Some(at(-60));
    state.last_notified_at = Some(at(-60));
    prior.insert(state.target_url.clone(), state);

    let runner = UptimeCheckRunner::from_config(&config(1, 0, 3600)).unwrap();
    let report = runner.run(&[], &prior, at(0)).await;

    assert!(report.results.is_empty());
    assert!(report.notifications.is_empty());
    assert_eq!(report.new_state, prior);
}

#[tokio::test]
async fn test_same_inputs_produce_same_outputs() {
    let down = common::start_mock_backend(500).await;
    let targets = vec![target(down)];
    let runner = UptimeCheckRunner::from_config(&config(1, 0, 3600)).unwrap();

    let first = runner.run(&targets, &AlertStateMap::new(), at(0)).await;
    let second = runner.run(&targets, &AlertStateMap::new(), at(0)).await;

    assert_eq!(first.new_state, second.new_state);
    assert_eq!(first.notifications, second.notifications);
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_threshold_cooldown_and_recovery_across_runs() {
    let status = Arc::new(AtomicU16::new(503));
    let s = status.clone();
    let addr = common::start_programmable_backend(move || {
        let s = s.clone();
        async move { s.load(Ordering::SeqCst) }
    })
    .await;

    let targets = vec![target(addr)];
    let runner = UptimeCheckRunner::from_config(&config(2, 1, 3600)).unwrap();

    // Below threshold: counted, not announced.
    let run1 = runner.run(&targets, &AlertStateMap::new(), at(0)).await;
    assert!(run1.notifications.is_empty());

    // Threshold reached.
    let run2 = runner.run(&targets, &run1.new_state, at(15)).await;
    assert_eq!(run2.notifications.len(), 2);
    assert_eq!(run2.new_state[&targets[0].url].last_notified_at, Some(at(15)));

    // Repeat tick inside the cooldown is held back.
    let run3 = runner.run(&targets, &run2.new_state, at(30)).await;
    assert!(run3.notifications.is_empty());
    assert_eq!(run3.suppressed, 1);
    assert_eq!(run3.new_state[&targets[0].url].consecutive_failures, 3);

    // Recovery closes out the incident.
    status.store(200, Ordering::SeqCst);
    let run4 = runner.run(&targets, &run3.new_state, at(45)).await;
    let kinds: Vec<_> = run4.notifications.iter().map(NotificationRequest::kind).collect();
    assert_eq!(kinds, vec!["sms_alert", "issue_resolve"]);

    let state = &run4.new_state[&targets[0].url];
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(state.down_since, None);
    assert_eq!(state.last_notified_at, None);

    // A fresh outage inside the old cooldown window is a new incident.
    status.store(503, Ordering::SeqCst);
    let run5 = runner.run(&targets, &run4.new_state, at(60)).await;
    assert!(run5.notifications.is_empty(), "below threshold again");
    let run6 = runner.run(&targets, &run5.new_state, at(75)).await;
    let kinds: Vec<_> = run6.notifications.iter().map(NotificationRequest::kind).collect();
    assert_eq!(kinds, vec!["sms_alert", "issue_report"]);
}

#[tokio::test]
async fn test_run_once_delivers_and_persists() {
    let down = common::start_mock_backend(503).await;
    let targets = vec![target(down).with_name("Shop")];
    let runner = UptimeCheckRunner::from_config(&config(1, 0, 3600)).unwrap();
    let recorder = Arc::new(Recorder::default());
    let store = MemoryStore::new();

    let outcome = run_once(&runner, &targets, &store, &dispatcher(&recorder)).await.unwrap();

    assert_eq!(outcome.dispatch.delivered, 2);
    assert!(outcome.dispatch.all_delivered());
    assert_eq!(*recorder.sms.lock().unwrap(), vec![RECIPIENT.to_string()]);
    assert_eq!(
        *recorder.opened.lock().unwrap(),
        vec!["Automated Alert: Shop is DOWN".to_string()]
    );
    assert_eq!(store.get(&targets[0].url).unwrap().consecutive_failures, 1);

    // Second pass: still down, already announced.
    let outcome = run_once(&runner, &targets, &store, &dispatcher(&recorder)).await.unwrap();
    assert!(outcome.report.notifications.is_empty());
    assert_eq!(store.get(&targets[0].url).unwrap().consecutive_failures, 2);
    assert_eq!(recorder.sms.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_state_file_carries_streak_between_processes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("uptime.json");
    let down = common::start_mock_backend(503).await;
    let targets = vec![target(down)];
    let runner = UptimeCheckRunner::from_config(&config(3, 0, 3600)).unwrap();
    let recorder = Arc::new(Recorder::default());

    for _ in 0..3 {
        // A fresh store per pass, as with separate scheduled invocations.
        let store = JsonFileStore::new(&path);
        run_once(&runner, &targets, &store, &dispatcher(&recorder)).await.unwrap();
    }

    let state = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(state[&targets[0].url].consecutive_failures, 3);
    assert_eq!(recorder.sms.lock().unwrap().len(), 1, "alerted once, at the threshold");
}

#[tokio::test]
async fn test_hung_target_does_not_hold_up_others() {
    let silent = common::start_silent_backend().await;
    let up = common::start_mock_backend(200).await;

    let targets = vec![
        Target::new(format!("http://{}/", silent), Duration::from_secs(1)),
        target(up),
        Target::new("not a url", Duration::from_secs(1)),
    ];
    let runner = UptimeCheckRunner::from_config(&config(1, 0, 3600)).unwrap();

    let started = std::time::Instant::now();
    let report = runner.run(&targets, &AlertStateMap::new(), at(0)).await;
    assert!(started.elapsed() < Duration::from_secs(10));

    assert_eq!(report.results.len(), 3);
    assert!(
        matches!(
            report.results[0].error,
            Some(CheckError::Network { kind: NetworkErrorKind::Timeout, .. })
        ),
        "got {:?}",
        report.results[0].error
    );
    assert!(report.results[1].success);
    assert!(report.results[2].is_config_error());

    assert_eq!(report.new_state[&targets[0].url].consecutive_failures, 1);
    assert_eq!(report.new_state[&targets[1].url].consecutive_failures, 0);
}

/// Answers 200 after a short pause, tracking how many calls overlap.
#[derive(Default)]
struct CountingProbe {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Probe for CountingProbe {
    async fn probe(&self, _method: ProbeMethod, _url: &url::Url, _timeout: Duration) -> Result<u16, CheckError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(200)
    }
}

#[tokio::test]
async fn test_probes_in_flight_never_exceed_concurrency() {
    let mut config = config(1, 0, 3600);
    config.http.concurrency = 2;
    let probe = Arc::new(CountingProbe::default());
    let runner = UptimeCheckRunner::new(probe.clone(), &config);

    let targets: Vec<Target> = (0..7)
        .map(|i| Target::new(format!("https://site{}.example/", i), Duration::from_secs(1)))
        .collect();
    let report = runner.run(&targets, &AlertStateMap::new(), at(0)).await;

    assert_eq!(report.results.len(), 7);
    assert!(report.results.iter().all(|r| r.success));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 7);
    assert_eq!(probe.peak.load(Ordering::SeqCst), 2);
}
