use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

/// Deployment script run after every push to the main branch. Invoked with no
/// arguments; it inherits our stdout/stderr so its output lands in our logs.
const DEPLOY_SCRIPT: &str = "/opt/deploy/deploy.sh";

/// A push that passed authentication and filtering, waiting to be deployed.
#[derive(Debug)]
pub struct DeployRequest {
    pub r#ref: String,
}

pub struct Deployer {
    script: PathBuf,
}

impl Default for Deployer {
    fn default() -> Self {
        Deployer::new(DEPLOY_SCRIPT)
    }
}

impl Deployer {
    pub fn new<P: Into<PathBuf>>(script: P) -> Self {
        Deployer {
            script: script.into(),
        }
    }

    /// Launches a deploy for every request received, until all senders are
    /// dropped. Each deploy runs in its own task: the caller already got its
    /// HTTP response, and a slow deploy shouldn't hold back the next one.
    pub async fn run(self, mut receiver: UnboundedReceiver<DeployRequest>) {
        while let Some(request) = receiver.recv().await {
            let script = self.script.clone();
            tokio::spawn(async move {
                info!("deploying {}", request.r#ref);

                let status = Command::new(&script)
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await;

                match status {
                    Ok(status) if status.success() => info!("deploy succeeded"),
                    Ok(status) => error!("deploy failed: {}", status),
                    Err(err) => error!("deploy failed to start: {}", err),
                }
            });
        }
    }
}
