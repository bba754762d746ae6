//! Core library for the `weather-lookup` client.
//!
//! This crate defines:
//! - The lookup handler: read the city, fetch, parse, render
//! - Handles for the input field and result region
//! - HTTP transport and request path construction
//! - Configuration handling
//!
//! It is used by `lookup-cli`, but any front end that can supply the two
//! handles can drive it.

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod path;
pub mod sequence;
pub mod transport;
pub mod ui;

pub use config::Config;
pub use error::LookupError;
pub use handler::{LookupOptions, LookupOutcome, WeatherLookupHandler};
pub use model::{CityQuery, WeatherPayload, WeatherReport};
pub use path::PathEncoding;
pub use sequence::Sequencing;
pub use transport::{FetchedResponse, HttpTransport, WeatherTransport};
pub use ui::{CityInput, LookupHandles, MemoryRegion, RegionContent, ResultRegion, TextField};
