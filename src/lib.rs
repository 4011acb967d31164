#[macro_use]
extern crate rocket;

pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;

use chrono::Local;
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::{Build, Rocket};

use crate::config::AppConfig;
use crate::db::Store;

/// Assembles the server from a configuration figment. The store is opened while
/// igniting; if that fails, launch is aborted.
pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("Expense store", open_store))
        .attach(AdHoc::on_shutdown("Expense store", |_| {
            Box::pin(async {
                log::info!("Shutting down; releasing expense store");
            })
        }))
        .mount(
            "/",
            routes![
                routes::list_expenses,
                routes::create_expense,
                routes::update_expense,
                routes::delete_expense,
                routes::categories,
                routes::summary,
            ],
        )
        .register("/", catchers![routes::json_catcher])
}

async fn open_store(rocket: Rocket<Build>) -> Result<Rocket<Build>, Rocket<Build>> {
    let config = match rocket.figment().extract::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid expense tracker configuration: {err}");
            return Err(rocket);
        }
    };

    let opened = Store::open(&config.database).and_then(|store| {
        if config.seed_sample_data {
            store.seed_sample_expenses(Local::now().date_naive())?;
        }
        Ok(store)
    });
    match opened {
        Ok(store) => {
            log::info!("Expense store ready at {}", config.database.display());
            Ok(rocket.manage(store))
        }
        Err(err) => {
            log::error!("Failed to open expense store: {err:#}");
            Err(rocket)
        }
    }
}
