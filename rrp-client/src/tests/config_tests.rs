//! Tests for configuration management functionality
//!
//! These tests verify that the configuration providers and the client
//! configuration work correctly.

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::{
        ClientConfig, CompositeConfigProvider, ConfigProvider, ConfigProviderExt, EnvConfigProvider,
        MemoryConfigProvider, DEFAULT_TIMEOUT,
    };
    use crate::core::DispatcherBuilder;

    #[test]
    fn test_memory_config_provider() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("url", "https://shop.example.com/api/rrp");
        provider.set("max_lines", "16");
        provider.set("compression", "off");
        provider.set("timeout", "1500ms");

        assert_eq!(provider.get_string("url").unwrap(), "https://shop.example.com/api/rrp");
        assert_eq!(provider.get_int("max_lines").unwrap(), 16);
        assert!(!provider.get_bool("compression").unwrap());
        assert_eq!(provider.get_duration("timeout").unwrap(), Duration::from_millis(1500));

        // Defaults
        assert_eq!(provider.get_string_or("missing", "default"), "default");
        assert_eq!(provider.get_int_or("missing", 60), 60);
        assert!(provider.get_bool_or("missing", true));

        // Errors
        assert!(provider.get_string("missing").is_err());
        assert!(provider.get_int("url").is_err());
        assert!(provider.get_duration("url").is_err());
    }

    #[test]
    fn test_env_config_provider() {
        env::set_var("RRPTEST_ENV_USER_AGENT", "orders-ui/2.0");
        env::set_var("RRPTEST_ENV_MAX_LINES", "8");

        let provider = EnvConfigProvider::new().with_prefix("RRPTEST_ENV");

        // Keys are uppercased, non-alphanumerics become underscores
        assert_eq!(provider.get_string("user-agent").unwrap(), "orders-ui/2.0");
        assert_eq!(provider.get_int("max-lines").unwrap(), 8);
        assert!(provider.get_string("not_set").is_err());

        env::remove_var("RRPTEST_ENV_USER_AGENT");
        env::remove_var("RRPTEST_ENV_MAX_LINES");
    }

    #[test]
    fn test_composite_config_provider() {
        let mut memory_provider = MemoryConfigProvider::new();
        memory_provider.set("URL", "https://memory.example.com/rrp");

        env::set_var("RRPTEST_COMPOSITE_URL", "https://env.example.com/rrp");
        env::set_var("RRPTEST_COMPOSITE_TIMEOUT", "5s");

        let mut composite = CompositeConfigProvider::new().with_provider(memory_provider);
        composite.add_provider(Arc::new(EnvConfigProvider::new().with_prefix("RRPTEST_COMPOSITE")));

        // First provider wins
        assert_eq!(composite.get_string("URL").unwrap(), "https://memory.example.com/rrp");
        // Falls through to the second one
        assert_eq!(composite.get_duration("timeout").unwrap(), Duration::from_secs(5));
        assert!(composite.get_string("NON_EXISTENT").is_err());

        env::remove_var("RRPTEST_COMPOSITE_URL");
        env::remove_var("RRPTEST_COMPOSITE_TIMEOUT");
    }

    #[test]
    fn test_client_config_from_provider() {
        let provider = MemoryConfigProvider::new()
            .with("url", "http://localhost:8080/api/rrp")
            .with("timeout", "10s")
            .with("user_agent", "orders-ui/2.0");

        let config = ClientConfig::from_provider(&provider).unwrap();
        assert_eq!(config.url, "http://localhost:8080/api/rrp");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent.as_deref(), Some("orders-ui/2.0"));
        assert!(config.compression);
    }

    #[test]
    fn test_client_config_requires_url() {
        let provider = MemoryConfigProvider::new();
        assert!(ClientConfig::from_provider(&provider).is_err());

        let mut provider = MemoryConfigProvider::new();
        provider.set("url", "https://shop.example.com/rrp");
        provider.set("timeout", "soon");
        assert!(ClientConfig::from_provider(&provider).is_err());

        let provider = MemoryConfigProvider::new()
            .with("url", "https://shop.example.com/rrp")
            .with("compression", "maybe");
        assert!(ClientConfig::from_provider(&provider).is_err());
    }

    #[test]
    fn test_client_config_validation() {
        assert!(ClientConfig::for_url("https://shop.example.com/rrp").validate().is_ok());

        let err = ClientConfig::default().validate().unwrap_err();
        assert_eq!(err.kind(), "configuration");

        assert!(ClientConfig::for_url("not a url").validate().is_err());
        assert!(ClientConfig::for_url("ftp://shop.example.com/rrp").validate().is_err());
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.compression);
        assert!(config.user_agent.is_none());
    }

    #[tokio::test]
    async fn test_builder_from_config() {
        let config = ClientConfig {
            compression: false,
            ..ClientConfig::for_url("http://localhost:9/api/rrp")
        };

        let dispatcher = DispatcherBuilder::from_config(&config).build().unwrap();
        assert_eq!(dispatcher.endpoint(), "http://localhost:9/api/rrp");
    }

    #[test]
    fn test_builder_rejects_invalid_settings() {
        assert!(DispatcherBuilder::new().build().is_err());
        assert!(DispatcherBuilder::new().url("mailto:orders@example.com").build().is_err());
        assert!(DispatcherBuilder::new()
            .url("https://shop.example.com/rrp")
            .header("bad header", "x")
            .build()
            .is_err());
    }
}
