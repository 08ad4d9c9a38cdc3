use rocket::{
    http::Method,
    route::{self, Handler},
    Data, Request, Route,
};

/// Answers uptime probes with a static 200 regardless of the method used.
/// Rocket routes are method-scoped, so the handler is mounted once per method.
pub fn routes() -> Vec<Route> {
    const METHODS: [Method; 9] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Patch,
        Method::Trace,
        Method::Connect,
    ];

    METHODS
        .iter()
        .map(|&method| Route::new(method, "/health", HealthCheck))
        .collect()
}

#[derive(Clone)]
struct HealthCheck;

#[rocket::async_trait]
impl Handler for HealthCheck {
    async fn handle<'r>(&self, request: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        route::Outcome::from(request, "OK")
    }
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{Method, Status},
        local::blocking::Client,
    };
    use tokio::sync::mpsc::unbounded_channel;

    use crate::config::Config;

    fn client() -> Client {
        let (sender, _receiver) = unbounded_channel();
        let config = Config {
            webhook_secret: "testsecret".to_string(),
            port: 0,
        };
        Client::tracked(crate::server(config, sender)).expect("valid rocket")
    }

    #[test]
    fn health_answers_every_method() {
        let client = client();

        for request in [
            client.get("/health"),
            client.post("/health"),
            client.put("/health"),
            client.delete("/health"),
            client.req(Method::Trace, "/health"),
            client.req(Method::Connect, "/health"),
        ] {
            let response = request.dispatch();
            assert_eq!(response.status(), Status::Ok);
            assert_eq!(response.into_string().unwrap(), "OK");
        }
    }
}
