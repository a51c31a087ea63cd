//! Wire shapes exchanged with the assessment and recommendation backends.
//!
//! All payloads are JSON over HTTP. Raw responses are normalized here into
//! the tagged types the session state machine consumes.

mod wire;

pub use wire::{
    CaptureBody, RecommendRequest, StartedSession, SubmitOutcome, classify_submit_response,
    error_detail, is_truthy, parse_question, parse_start,
};
