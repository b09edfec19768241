//! Integration tests for loadout

#[test]
fn test_workspace_builds() {
    // Basic smoke test to ensure the workspace compiles
    assert!(true);
}

#[test]
fn test_default_configuration() {
    use loadout_core::config::ResolverConfig;

    let config = ResolverConfig::default();
    assert!(config.is_binary("lib/net8.0/App.dll"));
    assert!(!config.is_binary("lib/net8.0/App.xml"));
}
