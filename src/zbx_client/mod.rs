pub(crate) mod api;
pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;
pub(crate) mod rpc;
pub(crate) mod session;

pub use api::MonitoringApi;
pub use client::ZbxClient;
pub use session::Session;
