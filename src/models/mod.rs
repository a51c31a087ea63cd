//! Domain types shared by the clients, the session state machine and the UI.

mod kind;
mod question;
mod recommendation;
mod result;

pub use kind::QuizKind;
pub use question::{Answer, Choice, Question};
pub use recommendation::ClusterRecommendation;
pub use result::{
    CompletedResult, HollandAnalysis, MbtiResult, RiasecAxis, RiasecResult, RiasecScores,
    TraitMetrics,
};
