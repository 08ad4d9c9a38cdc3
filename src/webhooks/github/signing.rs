use std::io;

use anyhow::anyhow;
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    Data, Request, State,
};
use tracing::{trace, warn};

use crate::webhooks::github::GitHubSecret;

const X_GITHUB_SIGNATURE: &str = "X-Hub-Signature-256";

fn validate_signature(secret: &str, signature: &str, data: &str) -> bool {
    use hmac::{Hmac, Mac, NewMac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    // GitHub puts a prefix in front of its hex SHA256
    let signature = match signature.strip_prefix("sha256=") {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("this should never fail");

    mac.update(data.as_bytes());

    // Mac::verify compares in constant time
    match hex::decode(signature) {
        Ok(bytes) => mac.verify(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", signature);
            false
        }
    }
}

/// Request body whose `X-Hub-Signature-256` header matched the shared secret.
/// Payloads that fail authentication never reach a route handler.
pub struct SignedGitHubPayload(pub String);

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

// Tracking issue for chaining Data guards to avoid reimplementing all this:
// https://github.com/SergioBenitez/Rocket/issues/775
#[rocket::async_trait]
impl<'r> FromData<'r> for SignedGitHubPayload {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on webhook endpoint: {:?}", request);

        let signature = match request.headers().get_one(X_GITHUB_SIGNATURE) {
            Some(signature) => signature,
            None => {
                warn!("rejecting payload without a {} header", X_GITHUB_SIGNATURE);
                return Outcome::Failure((
                    Status::Unauthorized,
                    anyhow!("missing {} header", X_GITHUB_SIGNATURE),
                ));
            }
        };

        let content = match data.open(LIMIT).into_string().await {
            Ok(s) if s.is_complete() => s.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                trace!("payload was too big");
                return Outcome::Failure((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded").into(),
                ));
            }
            Err(e) => return Outcome::Failure((Status::BadRequest, e.into())),
        };

        let secret = request.guard::<&State<GitHubSecret>>().await.unwrap();

        if !validate_signature(&secret.0, signature, &content) {
            warn!("invalid signature, rejecting payload");
            return Outcome::Failure((
                Status::Unauthorized,
                anyhow!("couldn't verify signature"),
            ));
        }

        trace!("validated webhook payload");
        Outcome::Success(SignedGitHubPayload(content))
    }
}
