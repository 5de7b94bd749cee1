//! Core of the airepair client: wire types, the HTTP gateway to the repair
//! service, the review and chat session state machines, and the pure view
//! projection the terminal UI renders from. Nothing in this crate touches the
//! terminal.

pub mod chat;
pub mod error;
pub mod gateway;
pub mod review;
pub mod types;
pub mod view;

pub use error::{ApiError, GuardError};
pub use gateway::{Gateway, StatusKind, StatusLine};
