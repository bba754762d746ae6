//! Overlapping activations and the failure diagnostic.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use lookup_core::{
    FetchedResponse, LookupError, LookupHandles, LookupOptions, LookupOutcome, MemoryRegion,
    Sequencing, TextField, WeatherLookupHandler, WeatherTransport,
    handler::LOOKUP_FAILED_MESSAGE,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Transport whose responses are released by the test, one path at a time.
#[derive(Debug)]
struct GatedTransport {
    gates: Mutex<HashMap<String, oneshot::Receiver<FetchedResponse>>>,
    seen: mpsc::UnboundedSender<String>,
}

impl GatedTransport {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (seen, seen_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { gates: Mutex::default(), seen }), seen_rx)
    }

    fn gate(&self, path: &str) -> oneshot::Sender<FetchedResponse> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }
}

#[async_trait]
impl WeatherTransport for GatedTransport {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse, LookupError> {
        let gate = self.gates.lock().unwrap().remove(path);
        let _ = self.seen.send(path.to_string());

        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| LookupError::fetch(path, std::io::Error::other("gate closed"))),
            None => Err(LookupError::fetch(path, std::io::Error::other("no gate"))),
        }
    }
}

#[derive(Debug)]
struct RejectingTransport;

#[async_trait]
impl WeatherTransport for RejectingTransport {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse, LookupError> {
        Err(LookupError::fetch(
            path,
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        ))
    }
}

/// Counts ERROR-level events.
#[derive(Debug, Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn weather_body(temperature: &str) -> FetchedResponse {
    let body = serde_json::json!({"temperature": temperature, "windspeed": 1});
    FetchedResponse::new(200, body.to_string())
}

struct Race {
    handler: Arc<WeatherLookupHandler>,
    field: Arc<TextField>,
    region: Arc<MemoryRegion>,
    handles: LookupHandles,
}

impl Race {
    fn new(transport: Arc<GatedTransport>, sequencing: Sequencing) -> Self {
        let options = LookupOptions { sequencing, ..Default::default() };
        let handler = Arc::new(WeatherLookupHandler::new(transport, options));
        let field = Arc::new(TextField::default());
        let region = Arc::new(MemoryRegion::new());
        let handles = LookupHandles::new(field.clone(), region.clone());
        Self { handler, field, region, handles }
    }

    fn activate(&self) -> tokio::task::JoinHandle<LookupOutcome> {
        let handler = self.handler.clone();
        let handles = self.handles.clone();
        tokio::spawn(async move { handler.activate(&handles).await })
    }
}

#[tokio::test]
async fn late_response_overwrites_newer_one_in_completion_order() {
    let (transport, mut seen) = GatedTransport::new();
    let release_a = transport.gate("/api/weather/A");
    let release_b = transport.gate("/api/weather/B");
    let race = Race::new(transport, Sequencing::CompletionOrder);

    race.field.set("A");
    let first = race.activate();
    assert_eq!(seen.recv().await.as_deref(), Some("/api/weather/A"));

    race.field.set("B");
    let second = race.activate();
    assert_eq!(seen.recv().await.as_deref(), Some("/api/weather/B"));

    release_b.send(weather_body("B")).unwrap();
    assert!(matches!(second.await.unwrap(), LookupOutcome::Found(_)));
    assert!(race.region.text().contains("Temperature: B"));

    release_a.send(weather_body("A")).unwrap();
    assert!(matches!(first.await.unwrap(), LookupOutcome::Found(_)));
    assert!(race.region.text().contains("Temperature: A"));
    assert_eq!(race.region.writes(), 2);
}

#[tokio::test]
async fn late_response_is_discarded_when_latest_wins() {
    let (transport, mut seen) = GatedTransport::new();
    let release_a = transport.gate("/api/weather/A");
    let release_b = transport.gate("/api/weather/B");
    let race = Race::new(transport, Sequencing::LatestWins);

    race.field.set("A");
    let first = race.activate();
    assert_eq!(seen.recv().await.as_deref(), Some("/api/weather/A"));

    race.field.set("B");
    let second = race.activate();
    assert_eq!(seen.recv().await.as_deref(), Some("/api/weather/B"));

    release_b.send(weather_body("B")).unwrap();
    second.await.unwrap();

    release_a.send(weather_body("A")).unwrap();
    let outcome = first.await.unwrap();

    assert!(matches!(outcome, LookupOutcome::Stale(_)), "got {outcome:?}");
    assert!(race.region.text().contains("Temperature: B"));
    assert_eq!(race.region.writes(), 1);
}

#[tokio::test]
async fn empty_activation_supersedes_pending_lookup_when_latest_wins() {
    let (transport, mut seen) = GatedTransport::new();
    let release_a = transport.gate("/api/weather/A");
    let race = Race::new(transport, Sequencing::LatestWins);

    race.field.set("A");
    let first = race.activate();
    assert_eq!(seen.recv().await.as_deref(), Some("/api/weather/A"));

    race.field.set("");
    assert!(matches!(race.activate().await.unwrap(), LookupOutcome::EmptyInput));

    release_a.send(weather_body("A")).unwrap();
    assert!(matches!(first.await.unwrap(), LookupOutcome::Stale(_)));
    assert_eq!(race.region.text(), "Please enter a city.");
}

#[tokio::test]
async fn rejection_logs_one_diagnostic() {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let region = Arc::new(MemoryRegion::new());
    let handles = LookupHandles::new(Arc::new(TextField::new("Paris")), region.clone());
    let handler = WeatherLookupHandler::new(Arc::new(RejectingTransport), LookupOptions::default());

    let outcome = handler.activate(&handles).await;

    assert!(matches!(outcome, LookupOutcome::Failed(LookupError::Fetch { .. })));
    assert_eq!(region.text(), LOOKUP_FAILED_MESSAGE);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn handled_outcomes_log_no_diagnostic() {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let (transport, _seen) = GatedTransport::new();
    let release = transport.gate("/api/weather/Paris");
    release.send(FetchedResponse::new(200, "null")).unwrap();

    let region = Arc::new(MemoryRegion::new());
    let field = Arc::new(TextField::new(""));
    let handles = LookupHandles::new(field.clone(), region.clone());
    let handler = WeatherLookupHandler::new(transport, LookupOptions::default());

    handler.activate(&handles).await;
    field.set("Paris");
    handler.activate(&handles).await;

    assert_eq!(region.text(), "Could not find weather for that city.");
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn spawned_activations_read_the_field_when_pressed() {
    let (transport, mut seen) = GatedTransport::new();
    let release_a = transport.gate("/api/weather/A");
    let release_b = transport.gate("/api/weather/B");
    let race = Race::new(transport, Sequencing::LatestWins);

    race.field.set("A");
    let first = race.handler.spawn_activation(&race.handles);
    race.field.set("B");
    let second = race.handler.spawn_activation(&race.handles);

    let mut paths = vec![seen.recv().await.unwrap(), seen.recv().await.unwrap()];
    paths.sort();
    assert_eq!(paths, ["/api/weather/A", "/api/weather/B"]);

    release_b.send(weather_body("B")).unwrap();
    assert!(matches!(second.await.unwrap(), LookupOutcome::Found(_)));

    release_a.send(weather_body("A")).unwrap();
    assert!(matches!(first.await.unwrap(), LookupOutcome::Stale(_)));
    assert!(race.region.text().contains("Temperature: B"));
}
