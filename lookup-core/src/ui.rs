//! Handles to the three page elements a lookup touches.
//!
//! The activation control is whoever calls
//! [`WeatherLookupHandler::activate`](crate::handler::WeatherLookupHandler::activate);
//! the input field and result region are passed in as [`LookupHandles`].

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::model::WeatherReport;

/// Source of the city text, read once per activation.
pub trait CityInput: Send + Sync + Debug {
    fn value(&self) -> String;
}

/// The single output element. Every call replaces what was shown before.
pub trait ResultRegion: Send + Sync + Debug {
    fn replace(&self, content: RegionContent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionContent {
    Text(String),
    Report(WeatherReport),
}

impl RegionContent {
    pub fn text(message: &str) -> Self {
        RegionContent::Text(message.to_string())
    }

    /// What a reader sees: the message, or the report's two lines.
    pub fn visible_text(&self) -> String {
        match self {
            RegionContent::Text(text) => text.clone(),
            RegionContent::Report(report) => report.to_string(),
        }
    }

    /// Markup form, as it would be written into the element.
    pub fn markup(&self) -> String {
        match self {
            RegionContent::Text(text) => text.clone(),
            RegionContent::Report(report) => report.to_markup(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupHandles {
    pub input: Arc<dyn CityInput>,
    pub region: Arc<dyn ResultRegion>,
}

impl LookupHandles {
    pub fn new(input: Arc<dyn CityInput>, region: Arc<dyn ResultRegion>) -> Self {
        Self { input, region }
    }
}

/// Editable text field shared between whoever types and the handler.
#[derive(Debug, Default)]
pub struct TextField {
    value: Mutex<String>,
}

impl TextField {
    pub fn new(initial: impl Into<String>) -> Self {
        Self { value: Mutex::new(initial.into()) }
    }

    pub fn set(&self, value: impl Into<String>) {
        *lock(&self.value) = value.into();
    }
}

impl CityInput for TextField {
    fn value(&self) -> String {
        lock(&self.value).clone()
    }
}

/// Region that remembers its current content.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    state: Mutex<MemoryRegionState>,
}

#[derive(Debug, Default)]
struct MemoryRegionState {
    content: Option<RegionContent>,
    writes: usize,
}

impl MemoryRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<RegionContent> {
        lock(&self.state).content.clone()
    }

    /// Visible text, empty before the first write.
    pub fn text(&self) -> String {
        self.content().map(|c| c.visible_text()).unwrap_or_default()
    }

    pub fn writes(&self) -> usize {
        lock(&self.state).writes
    }
}

impl ResultRegion for MemoryRegion {
    fn replace(&self, content: RegionContent) {
        let mut state = lock(&self.state);
        state.content = Some(content);
        state.writes += 1;
    }
}

// A panic while holding one of these locks cannot leave a half-written value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
