//! Service calls off the UI thread.
//!
//! The main loop sends [`types::ApiRequest`]s over a crossbeam channel to a
//! dedicated worker thread, which spawns one tokio task per request on the
//! main runtime. Every response comes back as `AppEvent::ApiResult`.
pub mod types;
pub mod worker;
