mod config;
mod feed;
mod github;
mod hooks;
mod html;
mod http;
mod notifier;
mod phabricator;
mod push;

use actix::{Actor, Recipient};
use actix_web::{middleware::Logger, App, HttpServer};
use color_eyre::eyre;

use crate::notifier::ChatMessage;

#[actix_web::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    color_eyre::install()?;

    let config::Config {
        phabricator_host,
        phabricator_username,
        phabricator_certificate,
        hipchat_token,
        listen,
        debug,
    } = envy::prefixed("FOXHOOK_").from_env()?;

    tracing_log::LogTracer::init()?;
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_max_level(level).finish(),
    )?;

    let notifier: Recipient<ChatMessage> =
        notifier::Notifier::new(notifier::Config { hipchat_token })
            .start()
            .recipient();
    let phabricator_config = phabricator::Config {
        host: phabricator_host,
        username: phabricator_username,
        certificate: phabricator_certificate,
    };

    tracing::info!("Listening on {}", listen);
    HttpServer::new(move || {
        App::new()
            .data(notifier.clone())
            .data(phabricator::Phabricator::new(phabricator_config.clone()))
            .wrap(Logger::default())
            .configure(hooks::configure)
    })
    .bind(&listen)?
    .run()
    .await
    .map_err(Into::into)
}
