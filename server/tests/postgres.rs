//! Storage tests against a live database. They need
//! `BACKEND_DB_CONNECTION_STRING`; set `BACKEND_TEST_INITIALIZE_DB=1` to
//! apply the migrations first. Run with `cargo test -- --ignored`.

use std::env;

use rand::Rng;
use uuid::Uuid;

use skysquare::config::get_variable;
use skysquare::db::{Db, PgDb};
use skysquare::place::{Categories, Category, Coordinates, NewPlace, Vote};
use skysquare::search::{NearbyFilter, NearbyQuery};
use skysquare::user::{NewUser, Relation};

const RADIUS_METERS: f64 = 15_000.0;

#[tokio::test]
#[ignore]
async fn postgres_storage_works() {
    dotenv::dotenv().ok();

    prepare_db().await;

    let pool = sqlx::Pool::connect(&get_variable("BACKEND_DB_CONNECTION_STRING"))
        .await
        .expect("create database pool from BACKEND_DB_CONNECTION_STRING");
    let db = PgDb::new(pool);

    // places from earlier runs stay behind, so every run searches
    // around its own point in the South Pacific. Both values stay
    // valid latitudes so the swapped point is still on the globe.
    let origin = {
        let mut rng = rand::thread_rng();
        Coordinates::new(rng.gen_range(-89.0..-85.0), rng.gen_range(-45.0..-35.0))
    };

    let owner = insert_user(&db).await;

    test_coordinate_order(&db, &owner, origin).await;
    test_radius_and_order(&db, &owner, origin).await;
    test_name_pattern(&db, &owner, origin).await;
    test_category(&db, &owner, origin).await;
    test_revote_moves_to_end(&db, &owner, origin).await;
    test_double_toggle(&db, &owner, origin).await;
}

async fn prepare_db() {
    let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");

    if env::var("BACKEND_TEST_INITIALIZE_DB").unwrap_or_else(|_| "0".to_owned()) == "1" {
        tokio::task::spawn_blocking(move || initialize_db_for_test(&connection_string))
            .await
            .expect("initialize DB");
    }
}

fn initialize_db_for_test(connection_string: &str) {
    use movine::Movine;
    use postgres::{Client, NoTls};

    let mut client = Client::connect(connection_string, NoTls)
        .expect("create postgres::Client from BACKEND_DB_CONNECTION_STRING");
    let mut movine = Movine::new(&mut client);

    movine.set_migration_dir("../migrations");
    movine.set_strict(true);

    if movine.status().is_err() {
        movine.initialize().expect("initialize movine");
    }

    movine.up().expect("run movine migrations");
}

async fn insert_user(db: &PgDb) -> Uuid {
    db.insert_user(NewUser {
        name: "Ana".to_owned(),
        surname: "Puig".to_owned(),
        email: format!("{}@example.com", Uuid::new_v4()),
        password_hash: "$argon2id$unused".to_owned(),
        birthday: "1990-01-01".to_owned(),
        gender: None,
        phone: None,
    })
    .await
    .expect("insert user")
}

async fn insert_place(db: &PgDb, owner: &Uuid, name: &str, location: Coordinates) -> Uuid {
    insert_tagged_place(db, owner, name, location, Categories::default()).await
}

async fn insert_tagged_place(
    db: &PgDb,
    owner: &Uuid,
    name: &str,
    location: Coordinates,
    categories: Categories,
) -> Uuid {
    db.insert_place(
        owner,
        NewPlace {
            name: name.to_owned(),
            address: "Somewhere".to_owned(),
            location,
            categories,
        },
    )
    .await
    .expect("insert place")
}

async fn nearby(db: &PgDb, filter: NearbyFilter, origin: Coordinates) -> Vec<Uuid> {
    db.find_nearby(NearbyQuery {
        filter,
        origin,
        radius_meters: RADIUS_METERS,
    })
    .await
    .expect("find nearby places")
    .into_iter()
    .map(|place| place.id)
    .collect()
}

fn north_of(origin: Coordinates, meters: f64) -> Coordinates {
    let degrees = meters / (skysquare::place::EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0);
    Coordinates::new(origin.longitude, origin.latitude + degrees)
}

async fn test_coordinate_order(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    let name = format!("Axes {}", Uuid::new_v4());
    let id = insert_place(db, owner, &name, origin).await;

    let place = db.retrieve_place(&id).await.unwrap().expect("place exists");
    assert_eq!(place.location, origin);

    let found = nearby(db, NearbyFilter::Name(name.clone()), origin).await;
    assert_eq!(found, vec![id]);

    let swapped = Coordinates::new(origin.latitude, origin.longitude);
    assert!(nearby(db, NearbyFilter::Name(name), swapped).await.is_empty());
}

async fn test_radius_and_order(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    let tag = Uuid::new_v4().to_string();

    let far = insert_place(db, owner, &format!("Far {}", tag), north_of(origin, 13_000.0)).await;
    let near = insert_place(db, owner, &format!("Near {}", tag), north_of(origin, 500.0)).await;
    insert_place(db, owner, &format!("Outside {}", tag), north_of(origin, 16_000.0)).await;

    assert_eq!(nearby(db, NearbyFilter::Name(tag), origin).await, vec![near, far]);
}

async fn test_name_pattern(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    let tag = Uuid::new_v4().to_string();

    let literal = insert_place(db, owner, &format!("100% {}", tag), origin).await;
    insert_place(db, owner, &format!("1000 {}", tag), origin).await;

    let found = nearby(db, NearbyFilter::Name(format!("0% {}", tag.to_uppercase())), origin).await;
    assert_eq!(found, vec![literal]);

    let found = nearby(db, NearbyFilter::Name(format!("00_ {}", tag)), origin).await;
    assert!(found.is_empty());
}

async fn test_category(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    // a point of its own, so earlier subtests' places stay out
    let spot = north_of(origin, 40_000.0);
    let coffee = Categories {
        coffee: true,
        ..Categories::default()
    };

    let cafe = insert_tagged_place(db, owner, "Cafe", spot, coffee).await;
    insert_place(db, owner, "Bar", spot).await;

    assert_eq!(nearby(db, NearbyFilter::Category(Category::Coffee), spot).await, vec![cafe]);
    assert!(nearby(db, NearbyFilter::Category(Category::ThingsToDo), spot).await.is_empty());
}

async fn test_revote_moves_to_end(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    let place = insert_place(db, owner, "Voted", origin).await;
    let other = insert_user(db).await;

    db.upsert_vote(&place, Vote::new(*owner, 10)).await.unwrap();
    db.upsert_vote(&place, Vote::new(other, 0)).await.unwrap();
    let voters = db.upsert_vote(&place, Vote::new(*owner, 5)).await.unwrap();

    assert_eq!(voters, vec![Vote::new(other, 0), Vote::new(*owner, 5)]);

    let stored = db.retrieve_place(&place).await.unwrap().expect("place exists");
    assert_eq!(stored.voters, voters);
}

async fn test_double_toggle(db: &PgDb, owner: &Uuid, origin: Coordinates) {
    let first = insert_place(db, owner, "First favourite", origin).await;
    let second = insert_place(db, owner, "Second favourite", origin).await;
    let user = insert_user(db).await;

    assert!(db.toggle_relation(Relation::Favourite, &user, &first).await.unwrap());
    assert!(db.toggle_relation(Relation::Favourite, &user, &second).await.unwrap());

    let related: Vec<_> = db
        .related_places(Relation::Favourite, &user)
        .await
        .unwrap()
        .into_iter()
        .map(|place| place.id)
        .collect();
    assert_eq!(related, vec![first, second]);

    assert!(!db.toggle_relation(Relation::Favourite, &user, &first).await.unwrap());
    assert!(!db.toggle_relation(Relation::Favourite, &user, &second).await.unwrap());

    assert!(db.related_places(Relation::Favourite, &user).await.unwrap().is_empty());
    assert!(db.related_places(Relation::CheckIn, &user).await.unwrap().is_empty());

    let stored = db.retrieve_user(&user).await.unwrap().expect("user exists");
    assert!(stored.favourites.is_empty());
}
