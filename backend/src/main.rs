mod audit;
mod auth;
mod config;
mod crypto;
mod db;
mod error;
mod job_controller;
mod llm;
mod ocr;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use std::io;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

use crate::config::Settings;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::load().map_err(io::Error::other)?;
    let bind = (settings.host.clone(), settings.port);
    let state = web::Data::new(AppState::new(settings).map_err(io::Error::other)?);

    let (jobs, rx) = JobsState::new();
    tokio::spawn(start_job_updater(jobs.clone(), rx));
    let jobs = web::Data::new(jobs);

    info!("HealthLand API listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(jobs.clone())
            .configure(services::configure)
    })
    .bind(bind)?
    .run()
    .await
}
