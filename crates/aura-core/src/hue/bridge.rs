//! Bridge discovery, pairing, and light listing.
//!
//! Only the setup wizard calls these; the daemon itself never needs them.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::client::{HueError, insecure_client};

/// Device type aura registers on the bridge during pairing.
const DEVICE_TYPE: &str = "aura#user";

/// A bridge advertised by the Hue discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub internal_ip: String,
}

/// A light as listed by the bridge.
#[derive(Debug, Clone)]
pub struct BridgeLight {
    pub id: u32,
    pub name: String,
    pub kind: String,
    pub reachable: bool,
}

/// Query the public discovery endpoint for bridges on this network.
pub async fn discover_bridges() -> Result<Vec<DiscoveredBridge>, HueError> {
    let client = insecure_client()?;
    let response = client
        .get("https://discovery.meethue.com")
        .send()
        .await
        .map_err(|e| HueError::Transport {
            host: "discovery.meethue.com".to_string(),
            source: e,
        })?;
    if !response.status().is_success() {
        return Err(HueError::Protocol(format!(
            "bridge discovery failed: {}",
            response.status()
        )));
    }
    response.json().await.map_err(|e| HueError::Transport {
        host: "discovery.meethue.com".to_string(),
        source: e,
    })
}

/// Ask the bridge for an API username.
///
/// Fails with the bridge's own description (typically "link button not
/// pressed") until the user presses the physical button; the setup wizard
/// retries a bounded number of times.
pub async fn create_user(bridge_ip: &str) -> Result<String, HueError> {
    let client = insecure_client()?;
    let response = client
        .post(format!("https://{bridge_ip}/api"))
        .json(&json!({ "devicetype": DEVICE_TYPE, "generateclientkey": true }))
        .send()
        .await
        .map_err(|e| HueError::Transport {
            host: bridge_ip.to_string(),
            source: e,
        })?;

    let data: Value = response.json().await.map_err(|e| HueError::Transport {
        host: bridge_ip.to_string(),
        source: e,
    })?;
    debug!(%data, "pairing response");

    let first = data
        .get(0)
        .ok_or_else(|| HueError::Protocol("empty pairing response".to_string()))?;
    if let Some(error) = first.get("error") {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown bridge error");
        return Err(HueError::Bridge(description.to_string()));
    }
    first
        .pointer("/success/username")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| HueError::Protocol("no username in pairing response".to_string()))
}

/// List the lights known to the bridge.
pub async fn get_lights(bridge_ip: &str, username: &str) -> Result<Vec<BridgeLight>, HueError> {
    let client = insecure_client()?;
    let response = client
        .get(format!("https://{bridge_ip}/api/{username}/lights"))
        .send()
        .await
        .map_err(|e| HueError::Transport {
            host: bridge_ip.to_string(),
            source: e,
        })?;

    let data: Value = response.json().await.map_err(|e| HueError::Transport {
        host: bridge_ip.to_string(),
        source: e,
    })?;

    let map = data
        .as_object()
        .ok_or_else(|| HueError::Protocol("lights response is not an object".to_string()))?;

    let mut lights: Vec<BridgeLight> = map
        .iter()
        .filter_map(|(id, light)| {
            Some(BridgeLight {
                id: id.parse().ok()?,
                name: light.get("name")?.as_str()?.to_string(),
                kind: light
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                reachable: light
                    .pointer("/state/reachable")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            })
        })
        .collect();
    lights.sort_by_key(|l| l.id);
    Ok(lights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_bridge_deserializes_hue_field_names() {
        let json = r#"[{"id":"0017884e7dad","internalipaddress":"192.168.1.50"}]"#;
        let bridges: Vec<DiscoveredBridge> = serde_json::from_str(json).unwrap();
        assert_eq!(bridges[0].internal_ip, "192.168.1.50");
    }
}
