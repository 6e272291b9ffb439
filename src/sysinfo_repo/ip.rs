// Host address for the dashboard header: public IP when reachable, else local outbound IP.

use std::net::UdpSocket;
use std::time::Duration;

pub(super) const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(2);

const FALLBACK_IP: &str = "127.0.0.1";

/// Address of the interface the OS would route 8.8.8.8 through. UDP connect sends nothing.
pub(super) fn local_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|sock| {
            sock.connect("8.8.8.8:80")?;
            sock.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "local ip lookup failed");
            FALLBACK_IP.to_string()
        })
}

pub(super) async fn public_ip(client: &reqwest::Client, url: &str) -> String {
    let body = match client.get(url).send().await {
        Ok(resp) => match resp.error_for_status() {
            Ok(resp) => resp.text().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    match body {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => local_ip(),
        Err(e) => {
            tracing::debug!(error = %e, url, "public ip lookup failed, using local ip");
            local_ip()
        }
    }
}
