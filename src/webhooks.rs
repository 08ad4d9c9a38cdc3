use tokio::sync::mpsc::UnboundedSender;

pub mod github;
pub use github::github_webhook;

use crate::deploy::DeployRequest;

pub struct DeploySender(pub UnboundedSender<DeployRequest>);
