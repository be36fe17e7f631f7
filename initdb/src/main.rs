//! Applies the schema migrations under `migrations/` to the database
//! named by `BACKEND_DB_CONNECTION_STRING`.

use std::env;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger, o};

const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

fn main() {
    dotenv::dotenv().ok();

    let connection_string = env::var("BACKEND_DB_CONNECTION_STRING")
        .expect("must define BACKEND_DB_CONNECTION_STRING environment variable");
    let migrations_dir = env::var("BACKEND_MIGRATIONS_DIR")
        .unwrap_or_else(|_| DEFAULT_MIGRATIONS_DIR.to_owned());

    let logger = initialize_logger().new(o!("migrations_dir" => migrations_dir.clone()));

    debug!(logger, "Connecting to database...");
    let client = Client::connect(&connection_string, NoTls).expect("connect to database");

    let mut movine = Movine::new(client);
    movine.set_migration_dir(&migrations_dir);

    if movine.status().is_err() {
        debug!(logger, "Initializing migration table...");
        movine.initialize().expect("initialize movine");
    }

    info!(logger, "Applying pending migrations...");
    movine.up().expect("apply migrations");

    info!(logger, "Schema is up to date.");
}
