use std::convert::Infallible;
use std::time::Duration;
use serde::de::DeserializeOwned;
use http::StatusCode;
use tracing::{debug, error, info};
use warp::{Filter, Rejection, Reply};
use crate::{AddExerciseRequest, Error, ErrorKind, ErrorMsg, ExerciseLog, ExerciseLogRequest, NewUserRequest};

pub const MAX_BODY_BYTES: u64 = 16 * 1024;

/// the whole api, with rejections turned into json `ErrorMsg` replies
pub fn routes(log: ExerciseLog) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_log = warp::any().map(move || log.clone());

    let new_user = warp::path!("api" / "exercise" / "new-user")
        .and(warp::post())
        .and(form_or_json::<NewUserRequest>())
        .and(with_log.clone())
        .and_then(handle_new_user);

    let add_exercise = warp::path!("api" / "exercise" / "add")
        .and(warp::post())
        .and(form_or_json::<AddExerciseRequest>())
        .and(with_log.clone())
        .and_then(handle_add_exercise);

    // the final segment is a placeholder (`/api/exercise/log`); any value is accepted
    let exercise_log = warp::path!("api" / "exercise" / String)
        .and(warp::get())
        .and(log_query())
        .and(with_log)
        .and_then(handle_exercise_log);

    // the inner recover turns errors into replies so they get cors headers too; the outer one
    // catches preflights the cors filter refuses
    new_user
        .or(add_exercise)
        .or(exercise_log)
        .recover(handle_rejection)
        .with(cors())
        .recover(handle_rejection)
        .with(warp::log::custom(|info| {
            info!(
                method = %info.method(),
                path = info.path(),
                status = info.status().as_u16(),
                elapsed = ?info.elapsed(),
                "request"
            );
        }))
}

/// request body as `application/json` or `application/x-www-form-urlencoded`
fn form_or_json<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
    where T: DeserializeOwned + Send + 'static
{
    warp::body::content_length_limit(MAX_BODY_BYTES)
        .and(warp::body::json().or(warp::body::form()).unify())
}

/// any origin may call the api from a browser
fn cors() -> warp::filters::cors::Cors {
    warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"])
        .max_age(Duration::from_secs(60 * 60))
        .build()
}

/// query string parameters. every field is optional, so a missing query string is an empty
/// request; a malformed one is rejected with `InvalidQuery`.
fn log_query() -> impl Filter<Extract = (ExerciseLogRequest,), Error = Rejection> + Clone {
    warp::query::<ExerciseLogRequest>()
}

async fn handle_new_user(req: NewUserRequest, log: ExerciseLog) -> Result<impl Reply, Rejection> {
    match log.register(&req).await {
        Ok(user) => Ok(warp::reply::json(&user)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

async fn handle_add_exercise(req: AddExerciseRequest, log: ExerciseLog) -> Result<impl Reply, Rejection> {
    match log.log_exercise(&req).await {
        Ok(exercise) => Ok(warp::reply::json(&exercise)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

async fn handle_exercise_log(_segment: String, req: ExerciseLogRequest, log: ExerciseLog) -> Result<impl Reply, Rejection> {
    match log.exercise_log(&req).await {
        Ok(items) => Ok(warp::reply::json(&items)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let body;
    if let Some(e) = err.find::<Error>() {
        match e {
            Error::Storage(cause) => error!(%cause, "storage failure"),
            other => debug!(kind = ?other.kind(), error = %other, "request rejected"),
        }
        code = e.status();
        body = ErrorMsg::from(e);
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        body = ErrorMsg::new(code, ErrorKind::ValidationError, format!("Malformed request body: {}", e));
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        body = ErrorMsg::new(code, ErrorKind::ValidationError, format!("Malformed query string: {}", e));
    } else if let Some(e) = err.find::<warp::filters::cors::CorsForbidden>() {
        code = StatusCode::FORBIDDEN;
        body = ErrorMsg::new(code, ErrorKind::Forbidden, e.to_string());
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        body = ErrorMsg::new(code, ErrorKind::PayloadTooLarge, format!("Request body exceeds {} bytes", MAX_BODY_BYTES));
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = StatusCode::LENGTH_REQUIRED;
        body = ErrorMsg::new(code, ErrorKind::ValidationError, "Request body length required");
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        body = ErrorMsg::new(code, ErrorKind::UnsupportedMediaType, "Expected a json or urlencoded form body");
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        body = ErrorMsg::new(code, ErrorKind::MethodNotAllowed, "Method not allowed");
    } else if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        body = ErrorMsg::new(code, ErrorKind::NotFound, "Not found");
    } else {
        error!(rejection = ?err, "unhandled rejection");
        code = StatusCode::INTERNAL_SERVER_ERROR;
        body = ErrorMsg::new(code, ErrorKind::Internal, "Internal server error");
    }

    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}
