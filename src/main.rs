use anyhow::Context;
use rocket::{routes, Build, Rocket};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::info;

mod config;
use config::Config;

mod deploy;
use deploy::{DeployRequest, Deployer};

mod health;

mod webhooks;
use webhooks::{github::GitHubSecret, github_webhook, DeploySender};

fn server(config: Config, sender: UnboundedSender<DeployRequest>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port));

    rocket::custom(figment)
        .mount("/", routes![github_webhook])
        .mount("/", webhooks::github::method_not_allowed_routes())
        .mount("/", health::routes())
        .manage(DeploySender(sender))
        .manage(GitHubSecret(config.webhook_secret))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("failed to load configuration")?;
    let port = config.port;

    let (sender, receiver) = unbounded_channel();

    let deployer = Deployer::default();
    tokio::spawn(async move { deployer.run(receiver).await });

    info!("webhook server listening on port {}", port);
    server(config, sender)
        .launch()
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!(err))
}
