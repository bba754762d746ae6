use serde_json::Value;
use std::fmt;

/// City name exactly as typed into the input field.
///
/// No trimming or normalization is applied: `"   "` is a non-empty query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Returns `None` for a zero-length value.
    pub fn new(raw: String) -> Option<Self> {
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Untyped JSON body returned by the weather endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload(Value);

impl WeatherPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// `null`, `false`, zero and `""` count as "no data"; everything else,
    /// empty objects and arrays included, counts as a result.
    pub fn is_truthy(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Display text for a top-level field, `undefined` when absent.
    pub fn field_text(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(value) if self.0.is_object() => display_value(value),
            _ => "undefined".to_string(),
        }
    }

    /// Two-line report, or `None` when the payload carries no data.
    pub fn report(&self) -> Option<WeatherReport> {
        self.is_truthy().then(|| WeatherReport {
            temperature: self.field_text("temperature"),
            windspeed: self.field_text("windspeed"),
        })
    }
}

/// Field values already rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub temperature: String,
    pub windspeed: String,
}

impl WeatherReport {
    /// Markup inserted into the result region. Values are not escaped.
    pub fn to_markup(&self) -> String {
        format!(
            "<p>Temperature: {}</p>\n<p>Wind Speed: {}</p>",
            self.temperature, self.windspeed
        )
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Temperature: {}\nWind Speed: {}", self.temperature, self.windspeed)
    }
}

/// Renders a JSON value the way template-string interpolation prints it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn display_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        // Outside [1e-6, 1e21) interpolation switches to exponent notation.
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_form(f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `1e21` -> `1e+21`, `1.5e-7` -> `1.5e-7`.
fn exponent_form(f: f64) -> String {
    let shortest = format!("{f:e}");
    match shortest.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => shortest,
    }
}
