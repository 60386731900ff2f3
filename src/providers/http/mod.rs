mod provider;

pub use provider::{DEFAULT_BASE_URL, HttpProvider, HttpRequest};
