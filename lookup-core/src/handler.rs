use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::{
    config::Config,
    error::LookupError,
    model::{CityQuery, WeatherPayload, WeatherReport},
    path::{PathEncoding, request_path},
    sequence::{RequestSequencer, RequestToken, Sequencing},
    transport::{FetchedResponse, WeatherTransport},
    ui::{LookupHandles, RegionContent},
};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a city.";
pub const NOT_FOUND_MESSAGE: &str = "Could not find weather for that city.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Error fetching weather data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupOptions {
    pub encoding: PathEncoding,
    pub sequencing: Sequencing,
}

impl From<&Config> for LookupOptions {
    fn from(config: &Config) -> Self {
        Self { encoding: config.path_encoding, sequencing: config.sequencing }
    }
}

/// How one activation ended.
#[derive(Debug)]
pub enum LookupOutcome {
    /// Nothing was typed; no request was made.
    EmptyInput,
    Found(WeatherReport),
    /// The endpoint answered with a falsy JSON value.
    NotFound,
    Failed(LookupError),
    /// A newer activation started first; the region was left alone.
    Stale(RequestToken),
}

impl LookupOutcome {
    /// Region content for this outcome; `None` for stale results.
    pub fn content(&self) -> Option<RegionContent> {
        match self {
            LookupOutcome::EmptyInput => Some(RegionContent::text(EMPTY_INPUT_MESSAGE)),
            LookupOutcome::Found(report) => Some(RegionContent::Report(report.clone())),
            LookupOutcome::NotFound => Some(RegionContent::text(NOT_FOUND_MESSAGE)),
            LookupOutcome::Failed(_) => Some(RegionContent::text(LOOKUP_FAILED_MESSAGE)),
            LookupOutcome::Stale(_) => None,
        }
    }
}

/// Reacts to activations: read the field, fetch, parse, render.
#[derive(Debug)]
pub struct WeatherLookupHandler {
    transport: Arc<dyn WeatherTransport>,
    options: LookupOptions,
    sequencer: RequestSequencer,
}

impl WeatherLookupHandler {
    pub fn new(transport: Arc<dyn WeatherTransport>, options: LookupOptions) -> Self {
        Self { transport, options, sequencer: RequestSequencer::new() }
    }

    pub fn options(&self) -> LookupOptions {
        self.options
    }

    /// Run one activation against `handles` and report what was shown.
    ///
    /// Overlapping calls are not cancelled; see [`Sequencing`] for which
    /// result ends up in the region.
    pub async fn activate(&self, handles: &LookupHandles) -> LookupOutcome {
        let activation = self.begin(handles);
        self.complete(activation, handles).await
    }

    /// Press the button without waiting for the result.
    ///
    /// The field is read and the token issued before this returns, so the
    /// caller may edit the field and activate again right away.
    pub fn spawn_activation(
        self: &Arc<Self>,
        handles: &LookupHandles,
    ) -> JoinHandle<LookupOutcome> {
        let activation = self.begin(handles);
        let handler = Arc::clone(self);
        let handles = handles.clone();
        tokio::spawn(async move { handler.complete(activation, &handles).await })
    }

    fn begin(&self, handles: &LookupHandles) -> Activation {
        Activation { token: self.sequencer.issue(), city: CityQuery::new(handles.input.value()) }
    }

    #[instrument(skip_all, fields(token = activation.token.get()))]
    async fn complete(&self, activation: Activation, handles: &LookupHandles) -> LookupOutcome {
        let Activation { token, city } = activation;

        let Some(city) = city else {
            debug!("Empty city, skipping request");
            return self.render(token, handles, LookupOutcome::EmptyInput);
        };

        let path = request_path(&city, self.options.encoding);
        debug!(path = %path, "Looking up weather");

        let outcome = match self.lookup(&path).await {
            Ok(payload) => match payload.report() {
                Some(report) => LookupOutcome::Found(report),
                None => LookupOutcome::NotFound,
            },
            Err(err) => LookupOutcome::Failed(err),
        };

        if let LookupOutcome::Failed(err) = &outcome {
            error!(error = ?err, path = %path, "Error fetching weather data");
        }

        self.render(token, handles, outcome)
    }

    async fn lookup(&self, path: &str) -> Result<WeatherPayload, LookupError> {
        let response = self.transport.fetch(path).await?;
        parse_body(&response)
    }

    fn render(
        &self,
        token: RequestToken,
        handles: &LookupHandles,
        outcome: LookupOutcome,
    ) -> LookupOutcome {
        let Some(content) = outcome.content() else {
            return outcome;
        };

        match self.options.sequencing {
            Sequencing::CompletionOrder => {
                handles.region.replace(content);
                outcome
            }
            Sequencing::LatestWins => {
                // Check and write happen under the sequencer lock.
                match self.sequencer.if_current(token, || handles.region.replace(content)) {
                    Some(()) => outcome,
                    None => {
                        debug!("Discarding stale weather result");
                        LookupOutcome::Stale(token)
                    }
                }
            }
        }
    }
}

/// Field value and token captured when the button is pressed.
#[derive(Debug)]
struct Activation {
    token: RequestToken,
    city: Option<CityQuery>,
}

/// Second stage: decode the whole body as JSON, whatever the status.
fn parse_body(response: &FetchedResponse) -> Result<WeatherPayload, LookupError> {
    let value = serde_json::from_slice(&response.body)?;
    Ok(WeatherPayload::new(value))
}
