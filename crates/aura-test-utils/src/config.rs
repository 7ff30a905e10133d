//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AuraConfig`] values
//! without repeating boilerplate across crate boundaries. Defaults point
//! the bridge at a TEST-NET address so nothing real is ever contacted.

use aura_config::AuraConfig;

/// Fluent builder for [`AuraConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .port(7700)
///     .brightness(50)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AuraConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = AuraConfig::default();
        config.bridge.ip = "192.0.2.1".to_string();
        config.bridge.username = "test-user".to_string();
        config.light.id = 1;
        config.light.name = "Test Lamp".to_string();
        Self { config }
    }

    pub fn bridge_ip(mut self, ip: &str) -> Self {
        self.config.bridge.ip = ip.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn brightness(mut self, percent: u8) -> Self {
        self.config.brightness = percent;
        self
    }

    pub fn transition_ms(mut self, ms: u64) -> Self {
        self.config.transition_ms = ms;
        self
    }

    pub fn idle_color(mut self, hex: &str) -> Self {
        self.config.colors.idle = hex.to_string();
        self
    }

    pub fn thinking_color(mut self, hex: &str) -> Self {
        self.config.colors.thinking = hex.to_string();
        self
    }

    pub fn needs_input_color(mut self, hex: &str) -> Self {
        self.config.colors.needs_input = hex.to_string();
        self
    }

    pub fn build(self) -> AuraConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
