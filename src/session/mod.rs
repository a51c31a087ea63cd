//! Client-side lifecycle of one assessment attempt.
//!
//! A [`QuizSession`] drives the remote assessment client, persists its
//! `{sessionID, currentQuestion, result}` triple after every transition, and
//! publishes a [`SessionSnapshot`] that presentation renders from.

mod machine;
mod progress;
mod view;

#[cfg(test)]
mod tests;

pub use machine::{QuizSession, Rejection};
pub use progress::QuizProgress;
pub use view::{Phase, Recovery, SessionSnapshot};
