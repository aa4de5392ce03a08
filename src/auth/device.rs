// Device metadata derived from the request. Purely descriptive; never feeds
// an authorization decision.

use axum::http::HeaderMap;
use serde::Serialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub ip: String,
    pub device_type: &'static str,
    pub browser: &'static str,
    pub os: &'static str,
}

impl DeviceInfo {
    /// Derive device metadata from the User-Agent header and peer address
    pub fn from_request(headers: &HeaderMap, peer_addr: Option<SocketAddr>) -> Self {
        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let ip = peer_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default();

        Self {
            device_type: device_type(&user_agent),
            browser: browser(&user_agent),
            os: os(&user_agent),
            user_agent,
            ip,
        }
    }

    pub fn unknown() -> Self {
        Self {
            user_agent: String::new(),
            ip: String::new(),
            device_type: "Desktop",
            browser: "Unknown",
            os: "Unknown",
        }
    }
}

// Ordered substring tests, first match wins.

fn device_type(user_agent: &str) -> &'static str {
    if ["Mobile", "Android", "iPhone", "iPad"]
        .iter()
        .any(|needle| user_agent.contains(needle))
    {
        return "Mobile";
    }
    if user_agent.contains("Tablet") {
        return "Tablet";
    }
    "Desktop"
}

fn browser(user_agent: &str) -> &'static str {
    if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else if user_agent.contains("Edge") {
        "Edge"
    } else {
        "Unknown"
    }
}

fn os(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iOS") {
        "iOS"
    } else {
        "Unknown"
    }
}
