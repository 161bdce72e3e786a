// Lake access layer
//
// Everything the adapter needs from the lake goes through `LakeTransport`, so
// the orchestrator can run against the HTTP client or a scripted fake.

pub mod http;
pub mod transport;

#[cfg(test)]
pub mod fake;

pub use http::HttpLakeClient;
pub use transport::{LakeTransport, LakeVersion};
