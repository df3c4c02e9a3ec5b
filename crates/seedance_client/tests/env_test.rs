//! Tests for environment-driven configuration.
//!
//! Kept in a single test so no other test observes the variables changing.

use seedance_client::{
    API_KEY_ENV, BASE_HOST_ENV, ClientConfig, DEFAULT_BASE_HOST, api_base_host, v3_api_base_url,
};
use seedance_error::SeedanceErrorKind;

#[test]
fn test_environment_resolution() {
    // SAFETY: this is the only test in this binary touching the environment.
    unsafe {
        std::env::remove_var(BASE_HOST_ENV);
        std::env::remove_var(API_KEY_ENV);
    }
    assert_eq!(api_base_host(), DEFAULT_BASE_HOST);
    assert_eq!(v3_api_base_url(), "https://api.volces.com/v3");

    let err = ClientConfig::from_env().expect_err("no key configured");
    match err.kind() {
        SeedanceErrorKind::Config(config) => assert_eq!(config.message, "API key is required"),
        other => panic!("unexpected error kind: {:?}", other),
    }
    let err = ClientConfig::builder()
        .base_url("https://other.example.com")
        .build()
        .expect_err("no key configured");
    assert!(matches!(err.kind(), SeedanceErrorKind::Config(_)));

    unsafe {
        std::env::set_var(BASE_HOST_ENV, "https://custom-api.com");
        std::env::set_var(API_KEY_ENV, "env-api-key-12345");
    }
    assert_eq!(api_base_host(), "https://custom-api.com");
    assert_eq!(v3_api_base_url(), "https://custom-api.com/v3");

    let config = ClientConfig::from_env().expect("key configured");
    assert_eq!(config.base_url(), "https://custom-api.com/v3");

    // The builder falls back to the environment key
    let config = ClientConfig::builder()
        .base_url("https://other.example.com")
        .build()
        .expect("key from environment");
    assert_eq!(config.base_url(), "https://other.example.com");

    // An explicit key takes precedence over the environment
    let err = ClientConfig::builder()
        .api_key("short")
        .build()
        .expect_err("explicit key is validated");
    match err.kind() {
        SeedanceErrorKind::Config(config) => {
            assert_eq!(config.message, "Invalid API key format - must be at least 10 characters")
        }
        other => panic!("unexpected error kind: {:?}", other),
    }

    // An explicit base URL is used verbatim
    let config = ClientConfig::builder()
        .api_key("env-api-key-12345")
        .base_url("https://other.example.com")
        .build()
        .expect("valid config");
    assert_eq!(config.base_url(), "https://other.example.com");

    unsafe {
        std::env::set_var(BASE_HOST_ENV, "");
    }
    assert_eq!(api_base_host(), DEFAULT_BASE_HOST);

    unsafe {
        std::env::remove_var(BASE_HOST_ENV);
        std::env::remove_var(API_KEY_ENV);
    }
}
