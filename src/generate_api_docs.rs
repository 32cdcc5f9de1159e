use std::io;
use chrono::prelude::*;
use http::StatusCode;
use uuid::Uuid;
use exercise_log::*;

const API_DOCS_TEMPLATE: &str = include_str!("../static/api-documentation.tera.md");
const OUTPUT_PATH: &str = "./README.md";

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, io::Error> {
    serde_json::to_string_pretty(value).map_err(io::Error::from)
}

fn main() -> Result<(), io::Error> {
    let mut tera = tera::Tera::default();
    tera.add_raw_template("api-documentation.md", API_DOCS_TEMPLATE)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut ctx = tera::Context::new();
    let current_time = Utc::now().to_rfc2822();
    ctx.insert("current_time", &current_time);
    ctx.insert("new_user_path", NEW_USER_PATH);
    ctx.insert("add_exercise_path", ADD_EXERCISE_PATH);
    ctx.insert("exercise_log_path", EXERCISE_LOG_PATH);
    ctx.insert("username_max_len", &USERNAME_MAX_LEN);
    ctx.insert("description_max_len", &DESCRIPTION_MAX_LEN);
    ctx.insert("duration_min", &DURATION_MIN_MINUTES);
    ctx.insert("duration_max", &DURATION_MAX_MINUTES);
    ctx.insert("schema_sql", db::SCHEMA_SQL);

    let user = User { id: Uuid::new_v4(), username: "alice".to_string() };
    ctx.insert("new_user_req_json", &to_json(&NewUserRequest::new(&user.username))?);
    ctx.insert("new_user_resp_json", &to_json(&user)?);

    let add_req = AddExerciseRequest {
        username: Some(user.username.as_str().into()),
        description: Some("run".into()),
        duration: Some(30.into()),
        date: Some("2021-07-27".into()),
    };
    ctx.insert("add_exercise_req_json", &to_json(&add_req)?);

    let exercise = Exercise {
        user_id: user.id,
        description: "run".to_string(),
        duration: 30,
        date: Utc.ymd(2021, 7, 27).and_hms(0, 0, 0),
    };
    ctx.insert("add_exercise_resp_json", &to_json(&exercise)?);

    let log_query = format!("{}?username={}&from=2021-07-01&to=2021-07-31&limit=10", EXERCISE_LOG_PATH, user.username);
    ctx.insert("exercise_log_query", &log_query);
    ctx.insert("exercise_log_resp_json", &to_json(&vec![exercise])?);

    let duplicate = Error::DuplicateUsername { username: user.username.clone() };
    ctx.insert("duplicate_resp_json", &to_json(&ErrorMsg::from(&duplicate))?);

    let invalid = ErrorMsg::new(StatusCode::BAD_REQUEST, ErrorKind::ValidationError, "Limit must be greater than 0");
    ctx.insert("validation_resp_json", &to_json(&ErrorMsg { field: Some("limit".to_string()), ..invalid })?);

    let api_docs = tera.render("api-documentation.md", &ctx)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(OUTPUT_PATH, &api_docs)?;
    Ok(())
}
