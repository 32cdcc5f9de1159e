use std::time::*;
use std::sync::Arc;
use pretty_toa::ThousandsSep;
use structopt::StructOpt;
use tokio::runtime::Runtime;
use tracing::{error, info};
use exercise_log::config::Config;
use exercise_log::db::DataBase;
use exercise_log::memory::MemoryStore;
use exercise_log::{logging, routes, ExerciseLog, Store};

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if config.in_memory {
        return Ok(Arc::new(MemoryStore::default()))
    }
    let db = DataBase::new(&config.database_url).await?;
    db.apply_schema().await?;
    Ok(Arc::new(db))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let run_start = Instant::now();
    dotenv::dotenv().ok();

    let config = Config::from_args();
    logging::init(&config.log_level);

    let rt = Runtime::new()?;

    rt.block_on(async {
        let store = open_store(&config).await?;
        let n_users = store.count_users().await?;
        let n_exercises = store.count_exercises().await?;

        info!(
            backend = store.backend(),
            users = %n_users.thousands_sep(),
            exercises = %n_exercises.thousands_sep(),
            "store ready in {:?}", Instant::now() - run_start
        );

        let log = ExerciseLog::new(store, config.request_timeout());

        let (addr, server) = warp::serve(routes::routes(log))
            .try_bind_with_graceful_shutdown(config.socket_addr(), async {
                tokio::signal::ctrl_c().await.ok();
                info!("shutting down");
            })?;

        info!(%addr, "listening");
        server.await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!(%e, "exercise-log-server failed");
        eprintln!("exercise-log-server failed: {}", e);
        std::process::exit(1);
    }
}
