use std::fmt;
use serde::{Serialize, Deserialize, Deserializer};
use serde::de::{self, Visitor};
use crate::ErrorKind;

pub const NEW_USER_PATH     : &str = "/api/exercise/new-user/";
pub const ADD_EXERCISE_PATH : &str = "/api/exercise/add";
pub const EXERCISE_LOG_PATH : &str = "/api/exercise/log";

/// a single submitted field, from a form body, json body or query string.
///
/// form and query values always arrive as text, json clients may send numbers instead;
/// either way the validator sees the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldValue(pub String);

impl FieldValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
        Ok(FieldValue(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
        Ok(FieldValue(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
        Ok(FieldValue(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
        Ok(FieldValue(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
        Ok(FieldValue(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

/// api request to register a user (`POST /api/exercise/new-user/`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<FieldValue>,
}

/// api request to log an exercise (`POST /api/exercise/add`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddExerciseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldValue>,
    /// minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<FieldValue>,
    /// `YYYY-MM-DD` or rfc 3339; omitted or empty means "now"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
}

/// api request (query string) to list a user's exercises (`GET /api/exercise/log`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseLogRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<FieldValue>,
}

/// body of every non-2xx api response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub status: u16,
    pub kind: ErrorKind,
    pub field: Option<String>,
    pub error: String,
}

impl NewUserRequest {
    pub fn new(username: &str) -> Self {
        Self { username: Some(username.into()) }
    }
}

impl ExerciseLogRequest {
    pub fn for_username(username: &str) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }
}
