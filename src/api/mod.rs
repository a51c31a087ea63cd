//! HTTP clients for the assessment and recommendation backends.
//!
//! Both clients sit behind traits so the session state machine and the
//! dashboard can be driven by scripted doubles in tests.

mod assessment;
mod body;
mod error;
mod recommend;

use reqwest::Url;

pub use assessment::{AssessmentBackend, HttpAssessmentClient};
pub use body::message_from_body;
pub use error::{ApiError, indicates_expired_session};
pub use recommend::{HttpRecommendationClient, RecommendationBackend};

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
