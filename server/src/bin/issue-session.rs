use std::error::Error;

use dotenv::dotenv;
use log::{info, initialize_logger};
use structopt::StructOpt;
use uuid::Uuid;

use skysquare::config::get_variable;
use skysquare::db::{Db, PgDb};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "issue-session",
    about = "Open a session for each of the given users and print its token"
)]
struct Opt {
    /// The user IDs to open sessions for
    #[structopt(parse(try_from_str = Uuid::parse_str))]
    ids: Vec<Uuid>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from BACKEND_DB_CONNECTION_STRING");
    let db = PgDb::new(pool);

    for id in &opt.ids {
        let logger = logger.new(log::o!("user_id" => id.to_string()));

        if db.retrieve_user(id).await?.is_none() {
            info!(logger, "Skipping unknown user");
            continue;
        }

        let token = db.create_session(id).await?;
        info!(logger, "Opened session");
        println!("{}\t{}", id, token);
    }

    Ok(())
}
