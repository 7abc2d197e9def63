use super::client::{NearbyResponse, PlacesError, SearchOutcome};

/// How many places to list when the API answers `OK`.
pub const TOP_RESULTS: usize = 3;
const KEY_PREVIEW_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub stream: Stream,
    pub text: String,
}

impl Line {
    fn out(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Out,
            text: text.into(),
        }
    }

    fn err(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Err,
            text: text.into(),
        }
    }

    pub fn print(&self) {
        match self.stream {
            Stream::Out => println!("{}", self.text),
            Stream::Err => eprintln!("{}", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Ok,
    RequestDenied,
    OverQueryLimit,
    Other(String),
}

impl From<&str> for ApiStatus {
    fn from(status: &str) -> Self {
        match status {
            "OK" => ApiStatus::Ok,
            "REQUEST_DENIED" => ApiStatus::RequestDenied,
            "OVER_QUERY_LIMIT" => ApiStatus::OverQueryLimit,
            other => ApiStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Denied { message: String },
    QuotaExceeded,
    Working { top: Vec<String> },
    Unexpected { status: String },
}

impl Verdict {
    pub fn from_response(body: &NearbyResponse) -> Self {
        match ApiStatus::from(body.status.as_str()) {
            ApiStatus::RequestDenied => Verdict::Denied {
                message: body
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "No error message".to_string()),
            },
            ApiStatus::OverQueryLimit => Verdict::QuotaExceeded,
            ApiStatus::Ok => Verdict::Working {
                top: body
                    .results
                    .iter()
                    .take(TOP_RESULTS)
                    .enumerate()
                    .map(|(i, place)| format!("{}. {} ({})", i + 1, place.name, place.vicinity))
                    .collect(),
            },
            ApiStatus::Other(status) => Verdict::Unexpected { status },
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Verdict::Working { .. })
    }

    pub fn lines(&self) -> Vec<Line> {
        match self {
            Verdict::Denied { message } => vec![
                Line::err("\n❌ API REQUEST DENIED!"),
                Line::err(format!("Error: {}", message)),
                Line::err("\nPossible causes:"),
                Line::err("1. API key restrictions (check allowed IPs/referrers)"),
                Line::err("2. Places API not enabled in Google Cloud Console"),
                Line::err("3. Billing not set up"),
            ],
            Verdict::QuotaExceeded => vec![
                Line::err("\n❌ OVER QUERY LIMIT!"),
                Line::err("Your API quota has been exceeded"),
            ],
            Verdict::Working { top } => {
                let mut lines = vec![Line::out("\n✅ API is working correctly!")];
                if !top.is_empty() {
                    lines.push(Line::out(format!("\nTop {} places found:", TOP_RESULTS)));
                    lines.extend(top.iter().map(Line::out));
                }
                lines
            }
            Verdict::Unexpected { status } => {
                vec![Line::err(format!("\n⚠️ Unexpected status: {}", status))]
            }
        }
    }
}

/// First characters of the key, enough to tell keys apart without leaking one.
pub fn key_preview(api_key: &str) -> String {
    api_key.chars().take(KEY_PREVIEW_CHARS).collect()
}

pub fn summary(outcome: &SearchOutcome) -> (Verdict, Vec<Line>) {
    let verdict = Verdict::from_response(&outcome.body);

    let mut lines = vec![
        Line::out(format!("\n✅ Status Code: {}", outcome.http_status.as_u16())),
        Line::out(format!("📊 API Status: {}", outcome.body.status)),
        Line::out(format!("📍 Results Found: {}", outcome.body.results.len())),
    ];
    lines.extend(verdict.lines());

    (verdict, lines)
}

pub fn failure_report(err: &PlacesError) -> Vec<Line> {
    let mut lines = vec![Line::err(format!("\n❌ Request failed: {}", err))];
    if let PlacesError::Status { status, body } = err {
        lines.push(Line::err(format!("Response status: {}", status.as_u16())));
        lines.push(Line::err(format!("Response data: {}", body)));
    }
    lines
}
