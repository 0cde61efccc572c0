use std::time::Duration;

/// Build the upstream reqwest client. `timeout` bounds the whole request;
/// connecting gets at most a third of it.
pub fn make_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout / 3)
        .timeout(timeout)
        .build()
}
