//! JSON payloads for the assessment and recommendation endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Answer, Choice, QuizKind, Question, RiasecScores};

const DEFAULT_LIKERT_MIN: i64 = 1;
const DEFAULT_LIKERT_MAX: i64 = 5;

/// A freshly created backend session and its first question.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedSession {
    pub session_id: String,
    pub question: Question,
}

/// What a capture call produced, normalized from the raw response.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another question is pending.
    NextQuestion(Question),
    /// No more questions; the result can be fetched.
    Completed,
    /// Neither a question nor a completion marker.
    Malformed(String),
}

/// Question identifiers arrive as strings from one backend and numbers from another.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct MbtiQuestionPayload {
    #[serde(rename = "questionID", deserialize_with = "string_or_number")]
    question_id: String,
    #[serde(rename = "questionDesc")]
    question_desc: String,
    #[serde(rename = "currentIndex")]
    current_index: u32,
    #[serde(rename = "maxQuestions")]
    max_questions: u32,
    #[serde(default)]
    option_1: Option<String>,
    #[serde(default)]
    option_2: Option<String>,
}

impl MbtiQuestionPayload {
    fn into_question(self) -> Question {
        let options = [
            self.option_1.unwrap_or_else(|| "Yes".to_string()),
            self.option_2.unwrap_or_else(|| "No".to_string()),
        ];
        Question {
            id: self.question_id,
            text: self.question_desc,
            position: self.current_index,
            total: self.max_questions,
            choices: options
                .into_iter()
                .map(|label| Choice {
                    answer: Answer::Text(label.clone()),
                    label,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LikertChoice {
    value: i64,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RiasecQuestionPayload {
    #[serde(rename = "questionID", deserialize_with = "string_or_number")]
    question_id: String,
    #[serde(rename = "questionText")]
    question_text: String,
    index: u32,
    total: u32,
    #[serde(default)]
    likert_min: Option<i64>,
    #[serde(default)]
    likert_max: Option<i64>,
    #[serde(default)]
    choices: Vec<LikertChoice>,
}

impl RiasecQuestionPayload {
    fn into_question(self) -> Question {
        let choices = if self.choices.is_empty() {
            let min = self.likert_min.unwrap_or(DEFAULT_LIKERT_MIN);
            let max = self.likert_max.unwrap_or(DEFAULT_LIKERT_MAX).max(min);
            (min..=max)
                .map(|value| Choice {
                    label: value.to_string(),
                    answer: Answer::Scale(value),
                })
                .collect()
        } else {
            self.choices
                .into_iter()
                .map(|choice| Choice {
                    label: choice.label.unwrap_or_else(|| choice.value.to_string()),
                    answer: Answer::Scale(choice.value),
                })
                .collect()
        };

        Question {
            id: self.question_id,
            text: self.question_text,
            position: self.index,
            total: self.total,
            choices,
        }
    }
}

/// Parse a question payload in the shape used by `kind`'s backend.
pub fn parse_question(kind: QuizKind, value: &Value) -> Result<Question, serde_json::Error> {
    match kind {
        QuizKind::Mbti => {
            MbtiQuestionPayload::deserialize(value).map(MbtiQuestionPayload::into_question)
        }
        QuizKind::Riasec => {
            RiasecQuestionPayload::deserialize(value).map(RiasecQuestionPayload::into_question)
        }
    }
}

/// Parse a session-start response: a session id plus the first question.
pub fn parse_start(kind: QuizKind, value: &Value) -> Result<StartedSession, String> {
    let session_id = value
        .get("sessionID")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| "Invalid response from server: missing sessionID".to_string())?;

    let question = parse_question(kind, value)
        .map_err(|e| format!("Invalid response from server: {e}"))?;

    Ok(StartedSession {
        session_id: session_id.to_string(),
        question,
    })
}

/// JavaScript-style truthiness, which is what the backend's markers were designed for.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Decide what a capture response means.
///
/// Completion wins over everything else; a payload with a question id must
/// also parse as a full question for `kind`.
pub fn classify_submit_response(kind: QuizKind, value: &Value) -> SubmitOutcome {
    let completed = ["sentinel", "result_ready"]
        .iter()
        .any(|key| value.get(key).is_some_and(is_truthy));
    if completed {
        return SubmitOutcome::Completed;
    }

    if value.get("questionID").is_none_or(Value::is_null) {
        return SubmitOutcome::Malformed(
            "Unexpected response from server. Please try again.".to_string(),
        );
    }

    match parse_question(kind, value) {
        Ok(question) => SubmitOutcome::NextQuestion(question),
        Err(e) => SubmitOutcome::Malformed(format!("Malformed question from server: {e}")),
    }
}

/// Body of a capture request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CaptureBody {
    Text {
        #[serde(rename = "questionID")]
        question_id: String,
        answer: String,
    },
    Scale {
        #[serde(rename = "questionID")]
        question_id: String,
        value: i64,
    },
}

impl CaptureBody {
    /// The MBTI backend takes `answer`, the RIASEC backend takes a numeric `value`.
    pub fn new(kind: QuizKind, question_id: &str, answer: &Answer) -> Result<Self, String> {
        let question_id = question_id.to_string();
        match (kind, answer) {
            (QuizKind::Mbti, answer) => Ok(CaptureBody::Text {
                question_id,
                answer: answer.to_string(),
            }),
            (QuizKind::Riasec, Answer::Scale(value)) => Ok(CaptureBody::Scale {
                question_id,
                value: *value,
            }),
            (QuizKind::Riasec, Answer::Text(text)) => text
                .trim()
                .parse()
                .map(|value| CaptureBody::Scale { question_id, value })
                .map_err(|_| format!("'{text}' is not a valid scale value")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest<'a> {
    pub mbti: &'a str,
    pub riasec_raw: &'a RiasecScores,
}

/// Pull a human-readable message out of a structured error body.
///
/// Looks at `detail` first, then `message`. A non-string `detail` (e.g. a
/// validation error list) is rendered as compact JSON.
pub fn error_detail(value: &Value) -> Option<String> {
    ["detail", "message"].iter().find_map(|key| match value.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}
