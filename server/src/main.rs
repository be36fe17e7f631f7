use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use log::{error, info, initialize_logger};
use tokio::sync::mpsc;
use warp::Filter;

use skysquare::config::{get_variable, parse_optional_variable, parse_variable};
use skysquare::db::PgDb;
use skysquare::environment::{Config, Environment, DEFAULT_SEARCH_RADIUS_METERS};
use skysquare::routes;
use skysquare::store::S3Store;
use skysquare::urls::Urls;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let store = Arc::new(S3Store::from_env().expect("initialize S3 store from environment"));

    let main_port: u16 = parse_variable("BACKEND_PORT");
    let admin_port: u16 = parse_variable("BACKEND_ADMIN_PORT");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from BACKEND_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::new(
        get_variable("BACKEND_BASE_URL"),
        get_variable("BACKEND_API_PATH"),
    ));

    let config = Config::new(
        DEFAULT_SEARCH_RADIUS_METERS,
        std::env::var("BACKEND_DEFAULT_PICTURE_URL").ok(),
        parse_optional_variable("BACKEND_PICKER_SEED"),
    );
    let environment = Environment::new(logger.clone(), db, urls, store, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate: routes::admin::TerminationFunctionWrapper<'static> = {
        let logger = logger.clone();

        Arc::new(move || {
            let termination_sender = termination_sender.clone();
            let logger = logger.clone();

            async move {
                if termination_sender.send(()).await.is_err() {
                    error!(logger, "Termination was already requested");
                }
            }
            .boxed()
        })
    };

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::make_api(environment.clone());

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route()
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
