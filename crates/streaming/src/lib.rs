//! The one production transport (C9/§4.9): every inter-node RPC the core
//! issues (liveness probe, lookup, predecessor queries, content
//! transfer, and forwarded replicated operations) goes out over HTTP
//! against the routes of §6, each call carrying the bounded timeout of
//! §5.

pub mod http_transport;

pub use http_transport::HttpTransport;
