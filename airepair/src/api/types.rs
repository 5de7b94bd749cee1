//! Messages exchanged with the API worker thread.
//!
//! Requests carry the fencing data the sessions need to match a response to
//! the request that produced it: a sequence number for review calls, the
//! thinking-bubble ticket for chat calls.

use airepair_core::chat::SolveTicket;
use airepair_core::types::{
    AnalyzeRequest, AnalyzeResponse, RepairRequest, RepairResponse, SolveRequest, SolveResponse,
};
use airepair_core::ApiError;

/// Commands sent from the main thread to the API worker.
#[derive(Debug)]
pub enum ApiRequest {
    /// Analyze or replan.
    Analyze { seq: u64, body: AnalyzeRequest },
    /// Proceed, direct repair or autofix.
    Repair { seq: u64, body: RepairRequest },
    /// Chat send or regenerate.
    Solve { ticket: SolveTicket, body: SolveRequest },
}

/// Result sent back to the main loop inside `AppEvent::ApiResult`.
#[derive(Debug)]
pub enum ApiResultPayload {
    Analyzed { seq: u64, outcome: Result<AnalyzeResponse, ApiError> },
    Repaired { seq: u64, outcome: Result<RepairResponse, ApiError> },
    Solved { ticket: SolveTicket, outcome: Result<SolveResponse, ApiError> },
}
