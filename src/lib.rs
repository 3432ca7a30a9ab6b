pub mod api;
pub mod config;
pub mod dataset;
pub mod fonts;
pub mod openapi;
pub mod pdf;
pub mod qr;
pub mod ticket;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: config::Config,
}
