use crate::config::ApiConfig;
use reqwest::Client;
use std::time::Duration;

pub fn build_service_client(api: &ApiConfig) -> Client {
    build_service_client_with_timeouts(api.timeout(), api.connect_timeout())
}

pub fn build_service_client_with_timeouts(timeout: Duration, connect_timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
