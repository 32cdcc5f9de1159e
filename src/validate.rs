//! request validation.
//!
//! each operation's rules run in a fixed order and the first failure is returned. a request
//! that passes comes out as a typed command the service can act on without re-checking.

use serde::{Serialize, Deserialize};
use chrono::prelude::*;
use crate::{AddExerciseRequest, ExerciseLogRequest, FieldValue, NewUserRequest};
use crate::{DESCRIPTION_MAX_LEN, DURATION_MAX_MINUTES, DURATION_MIN_MINUTES, USERNAME_MAX_LEN};

pub const MISSING_FIELDS: &str = "Required Field(s) are missing.";
pub const BLANK_FIELDS: &str = "Required Field(s) are blank.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MissingField,
    BlankField,
    TooLong,
    NotANumber,
    OutOfRange,
    InvalidDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, field: Option<&'static str>, message: impl Into<String>) -> Self {
        Self { kind, field, message: message.into() }
    }

    fn missing(field: &'static str) -> Self {
        Self::new(ValidationKind::MissingField, Some(field), MISSING_FIELDS)
    }

    fn blank(field: &'static str) -> Self {
        Self::new(ValidationKind::BlankField, Some(field), BLANK_FIELDS)
    }
}

/// validated `NewUserRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
}

/// validated `AddExerciseRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub username: String,
    pub description: String,
    pub duration: i32,
    /// `None` when the caller left the date out; the service stamps "now"
    pub date: Option<DateTime<Utc>>,
}

/// validated `ExerciseLogRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub username: String,
    pub from: Option<DateTime<Utc>>,
    /// the calendar day named by the caller, not yet widened to the end of that day
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// parse a caller-supplied date.
///
/// accepts `YYYY-MM-DD` (midnight utc) or an rfc 3339 timestamp (normalized to utc).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc))
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// a whole number, written plainly (`30`), with a zero fraction (`30.0`) or in exponent form (`1e3`).
///
/// magnitude is not checked here, so `99999999999999999999` comes back as a (huge) whole number.
fn parse_whole_number(s: &str) -> Option<f64> {
    let n = s.trim().parse::<f64>().ok()?;
    if n.is_finite() && n.fract() == 0.0 {
        Some(n)
    } else {
        None
    }
}

fn check_username(username: &str) -> Result<(), ValidationError> {
    if char_len(username) > USERNAME_MAX_LEN {
        return Err(ValidationError::new(
            ValidationKind::TooLong,
            Some("username"),
            format!("Username cannot be greater than {} characters", USERNAME_MAX_LEN),
        ))
    }
    Ok(())
}

/// rules: `username` present, not blank, at most 10 characters
pub fn new_user(req: &NewUserRequest) -> Result<NewUser, ValidationError> {
    let username = req.username.as_ref()
        .map(FieldValue::as_str)
        .ok_or_else(|| ValidationError::missing("username"))?;

    if username.is_empty() {
        return Err(ValidationError::new(ValidationKind::BlankField, Some("username"), "Username cannot be blank"))
    }

    check_username(username)?;

    Ok(NewUser { username: username.to_string() })
}

pub fn new_exercise(req: &AddExerciseRequest) -> Result<NewExercise, ValidationError> {
    let (username, description, duration) = match (&req.username, &req.description, &req.duration) {
        (Some(u), Some(d), Some(n)) => (u.as_str(), d.as_str(), n.as_str()),
        (None, _, _) => return Err(ValidationError::missing("username")),
        (_, None, _) => return Err(ValidationError::missing("description")),
        (_, _, None) => return Err(ValidationError::missing("duration")),
    };

    for &(field, value) in &[("username", username), ("description", description), ("duration", duration)] {
        if value.is_empty() {
            return Err(ValidationError::blank(field))
        }
    }

    check_username(username)?;

    if char_len(description) > DESCRIPTION_MAX_LEN {
        return Err(ValidationError::new(
            ValidationKind::TooLong,
            Some("description"),
            format!("Description cannot be greater than {} characters", DESCRIPTION_MAX_LEN),
        ))
    }

    let minutes = parse_whole_number(duration)
        .ok_or_else(|| ValidationError::new(ValidationKind::NotANumber, Some("duration"), "Duration must be a number"))?;

    if minutes > f64::from(DURATION_MAX_MINUTES) {
        return Err(ValidationError::new(
            ValidationKind::OutOfRange,
            Some("duration"),
            format!("Duration must be less than {} minutes (24 hours)", DURATION_MAX_MINUTES),
        ))
    }

    if minutes < f64::from(DURATION_MIN_MINUTES) {
        return Err(ValidationError::new(
            ValidationKind::OutOfRange,
            Some("duration"),
            format!("Duration must be at least {} minute", DURATION_MIN_MINUTES),
        ))
    }

    let date = match req.date.as_ref().map(FieldValue::as_str) {
        None | Some("") => None,
        Some(s) => {
            let date = parse_date(s)
                .ok_or_else(|| ValidationError::new(ValidationKind::InvalidDate, Some("date"), "Date is not a valid date"))?;
            Some(date)
        }
    };

    Ok(NewExercise {
        username: username.to_string(),
        description: description.to_string(),
        duration: minutes as i32, // whole and within range, checked above
        date,
    })
}

pub fn log_query(req: &ExerciseLogRequest) -> Result<LogQuery, ValidationError> {
    let username = req.username.as_ref()
        .map(FieldValue::as_str)
        .ok_or_else(|| ValidationError::missing("username"))?;

    if username.is_empty() {
        return Err(ValidationError::blank("username"))
    }

    check_username(username)?;

    let from = match &req.from {
        Some(s) => Some(parse_date(s.as_str())
            .ok_or_else(|| ValidationError::new(ValidationKind::InvalidDate, Some("from"), "From is not a valid date"))?),
        None => None,
    };

    let to = match &req.to {
        Some(s) => Some(parse_date(s.as_str())
            .ok_or_else(|| ValidationError::new(ValidationKind::InvalidDate, Some("to"), "To is not a valid date"))?),
        None => None,
    };

    let limit = match &req.limit {
        Some(s) => {
            let n = parse_whole_number(s.as_str())
                .ok_or_else(|| ValidationError::new(ValidationKind::NotANumber, Some("limit"), "Limit is not a valid number"))?;
            if n < 1.0 {
                return Err(ValidationError::new(ValidationKind::OutOfRange, Some("limit"), "Limit must be greater than 0"))
            }
            Some(n as usize) // saturates
        }
        None => None,
    };

    Ok(LogQuery { username: username.to_string(), from, to, limit })
}

#[allow(unused)]
#[cfg(test)]
mod tests {
    use super::*;

    fn add_req(username: &str, description: &str, duration: &str, date: Option<&str>) -> AddExerciseRequest {
        AddExerciseRequest {
            username: Some(username.into()),
            description: Some(description.into()),
            duration: Some(duration.into()),
            date: date.map(FieldValue::from),
        }
    }

    fn kind_of<T: std::fmt::Debug>(res: Result<T, ValidationError>) -> ValidationKind {
        res.unwrap_err().kind
    }

    #[test]
    fn parse_date_accepts_calendar_dates_and_timestamps() {
        assert_eq!(parse_date("2021-07-27"), Some(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0)));
        assert_eq!(parse_date(" 2021-07-27 "), Some(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0)));
        assert_eq!(parse_date("2021-07-27T06:30:00Z"), Some(Utc.ymd(2021, 7, 27).and_hms(6, 30, 0)));
        assert_eq!(parse_date("2021-07-27T06:30:00+02:00"), Some(Utc.ymd(2021, 7, 27).and_hms(4, 30, 0)));
        assert_eq!(parse_date("2021-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn new_user_rules() {
        assert_eq!(new_user(&NewUserRequest::new("alice")).unwrap().username, "alice");
        assert_eq!(new_user(&NewUserRequest::new("abcdefghij")).unwrap().username, "abcdefghij");
        assert_eq!(kind_of(new_user(&NewUserRequest::default())), ValidationKind::MissingField);

        let err = new_user(&NewUserRequest::new("")).unwrap_err();
        assert_eq!(err.kind, ValidationKind::BlankField);
        assert_eq!(err.message, "Username cannot be blank");

        let err = new_user(&NewUserRequest::new("abcdefghijk")).unwrap_err();
        assert_eq!(err.kind, ValidationKind::TooLong);
        assert_eq!(err.field, Some("username"));
        assert_eq!(err.to_string(), "Username cannot be greater than 10 characters");
    }

    #[test]
    fn username_length_counts_characters_not_bytes() {
        assert!(new_user(&NewUserRequest::new("ééééééééé")).is_ok());
    }

    #[test]
    fn new_exercise_accepts_valid_input() {
        let cmd = new_exercise(&add_req("alice", "run", "30", None)).unwrap();
        assert_eq!(cmd, NewExercise { username: "alice".into(), description: "run".into(), duration: 30, date: None });

        let cmd = new_exercise(&add_req("alice", "run", "1440", Some(""))).unwrap();
        assert_eq!(cmd.duration, 1440);
        assert_eq!(cmd.date, None);

        let cmd = new_exercise(&add_req("alice", "run", "1", Some("2021-07-27"))).unwrap();
        assert_eq!(cmd.date, Some(Utc.ymd(2021, 7, 27).and_hms(0, 0, 0)));
    }

    #[test]
    fn new_exercise_rules_in_order() {
        let mut req = add_req("alice", "run", "30", None);
        req.description = None;
        let err = new_exercise(&req).unwrap_err();
        assert_eq!(err.kind, ValidationKind::MissingField);
        assert_eq!(err.message, MISSING_FIELDS);

        // missing beats blank
        let mut req = add_req("", "run", "30", None);
        req.duration = None;
        assert_eq!(kind_of(new_exercise(&req)), ValidationKind::MissingField);

        let err = new_exercise(&add_req("alice", "", "30", None)).unwrap_err();
        assert_eq!(err.kind, ValidationKind::BlankField);
        assert_eq!(err.field, Some("description"));

        // blank beats too long
        let err = new_exercise(&add_req("abcdefghijk", "run", "", None)).unwrap_err();
        assert_eq!(err.kind, ValidationKind::BlankField);

        let err = new_exercise(&add_req("abcdefghijk", "run", "abc", None)).unwrap_err();
        assert_eq!((err.kind, err.field), (ValidationKind::TooLong, Some("username")));

        let long = "x".repeat(101);
        let err = new_exercise(&add_req("alice", &long, "abc", None)).unwrap_err();
        assert_eq!((err.kind, err.field), (ValidationKind::TooLong, Some("description")));
        assert!(new_exercise(&add_req("alice", &"x".repeat(100), "30", None)).is_ok());

        let err = new_exercise(&add_req("alice", "run", "thirty", Some("not a date"))).unwrap_err();
        assert_eq!(err.message, "Duration must be a number");

        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "30.5", None))), ValidationKind::NotANumber);

        let err = new_exercise(&add_req("alice", "run", "1441", Some("not a date"))).unwrap_err();
        assert_eq!(err.kind, ValidationKind::OutOfRange);
        assert_eq!(err.message, "Duration must be less than 1440 minutes (24 hours)");

        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "0", None))), ValidationKind::OutOfRange);
        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "NaN", None))), ValidationKind::NotANumber);
        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "inf", None))), ValidationKind::NotANumber);
        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "-5", None))), ValidationKind::OutOfRange);

        let err = new_exercise(&add_req("alice", "run", "30", Some("not a date"))).unwrap_err();
        assert_eq!((err.kind, err.field), (ValidationKind::InvalidDate, Some("date")));
    }

    #[test]
    fn duration_accepts_any_spelling_of_a_whole_number() {
        assert_eq!(new_exercise(&add_req("alice", "run", "30.0", None)).unwrap().duration, 30);
        assert_eq!(new_exercise(&add_req("alice", "run", "1e3", None)).unwrap().duration, 1000);
        assert_eq!(new_exercise(&add_req("alice", "run", " 45 ", None)).unwrap().duration, 45);

        // too big for any integer type is still just too long a workout
        let err = new_exercise(&add_req("alice", "run", "99999999999999999999", None)).unwrap_err();
        assert_eq!((err.kind, err.message.as_str()), (ValidationKind::OutOfRange, "Duration must be less than 1440 minutes (24 hours)"));
        assert_eq!(kind_of(new_exercise(&add_req("alice", "run", "1e9999", None))), ValidationKind::NotANumber);
    }

    #[test]
    fn log_query_rules() {
        let q = log_query(&ExerciseLogRequest::for_username("alice")).unwrap();
        assert_eq!(q, LogQuery { username: "alice".into(), from: None, to: None, limit: None });

        assert_eq!(kind_of(log_query(&ExerciseLogRequest::default())), ValidationKind::MissingField);
        assert_eq!(kind_of(log_query(&ExerciseLogRequest::for_username(""))), ValidationKind::BlankField);
        assert_eq!(kind_of(log_query(&ExerciseLogRequest::for_username("abcdefghijk"))), ValidationKind::TooLong);

        let mut req = ExerciseLogRequest::for_username("alice");
        req.from = Some("2021-07-01".into());
        req.to = Some("2021-07-31".into());
        req.limit = Some("5".into());
        let q = log_query(&req).unwrap();
        assert_eq!(q.from, Some(Utc.ymd(2021, 7, 1).and_hms(0, 0, 0)));
        assert_eq!(q.to, Some(Utc.ymd(2021, 7, 31).and_hms(0, 0, 0)));
        assert_eq!(q.limit, Some(5));

        let mut bad = req.clone();
        bad.from = Some("july".into());
        let err = log_query(&bad).unwrap_err();
        assert_eq!((err.kind, err.message.as_str()), (ValidationKind::InvalidDate, "From is not a valid date"));

        let mut bad = req.clone();
        bad.to = Some("august".into());
        let err = log_query(&bad).unwrap_err();
        assert_eq!((err.field, err.message.as_str()), (Some("to"), "To is not a valid date"));

        let mut bad = req.clone();
        bad.limit = Some("ten".into());
        assert_eq!(kind_of(log_query(&bad)), ValidationKind::NotANumber);

        let mut big = req.clone();
        big.limit = Some("1e3".into());
        assert_eq!(log_query(&big).unwrap().limit, Some(1000));
        big.limit = Some("99999999999999999999".into());
        assert_eq!(log_query(&big).unwrap().limit, Some(usize::MAX));

        let mut bad = req.clone();
        bad.limit = Some("0".into());
        let err = log_query(&bad).unwrap_err();
        assert_eq!((err.kind, err.message.as_str()), (ValidationKind::OutOfRange, "Limit must be greater than 0"));
    }
}
