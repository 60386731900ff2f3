use thiserror::Error;

type BoxedSource = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Errors raised while building, sending, or mapping analytics requests.
///
/// Any of these aborts the whole batch; the reporter never hands out a partial report.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Missing or invalid credentials, a misconfigured provider, or a reporting API failure.
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The HTTP provider answered with something other than `200 OK`, or never answered.
    #[error("upstream request failed ({}): {body}", status_label(.status))]
    Upstream { status: Option<u16>, body: String },

    /// A raw result could not be folded into the report.
    #[error("cannot map report '{name}': {reason}")]
    Mapping { name: String, reason: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| format!("status {s}"))
}

impl AnalyticsError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration_with(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn upstream(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Upstream { status, body: body.into() }
    }

    pub fn mapping(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Mapping {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by an upstream error, if the provider answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}
