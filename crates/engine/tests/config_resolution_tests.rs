use std::{fs, sync::Arc};

use serde_json::json;
use thematic_engine::{ResolutionError, ThemeContext, ThemedResolver, ThemedWrapper};
use thematic_registry::{ComponentRegistry, LoadError, LoadedModule, PropertyModule, lazy, ready};
use thematic_types::{BindingDescriptor, FallbackPolicy, ImplementationSource, ThemeIdentifier};
use thematic_util::{THEME_ENV, ThematicConfig, load_config_from_path};

const CONFIG: &str = r#"
activeTheme: mantis
fallbackPolicy: strict
themes:
  - name: dspace
  - name: mantis
    extends: dspace
  - name: custom
"#;

fn load_config(contents: &str) -> ThematicConfig {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).expect("write config");
    temp_env::with_var_unset(THEME_ENV, || load_config_from_path(&path)).expect("config")
}

fn registry() -> ComponentRegistry {
    let inputs = ["title", "content", "hasInnerHtml"];
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            "ComcolPageContentComponent",
            BindingDescriptor::inputs(inputs).expect("descriptor"),
            ready(PropertyModule::new("ComcolPageContentComponent").with_inputs(inputs)),
        )
        .expect("register")
        .register_override(
            "ComcolPageContentComponent",
            "dspace",
            ready(PropertyModule::new("dspace/ComcolPageContentComponent").with_inputs(inputs)),
        )
        .expect("dspace override")
        .register_override(
            "ComcolPageContentComponent",
            "custom",
            lazy(|| async { Err::<LoadedModule, _>(LoadError::transient("custom/ComcolPageContentComponent", "timed out")) }),
        )
        .expect("custom override");
    registry
}

#[tokio::test]
async fn configured_theme_inherits_parent_override() {
    let config = load_config(CONFIG);
    let resolver = Arc::new(ThemedResolver::from_config(Arc::new(registry()), &config).expect("resolver"));

    let mut wrapper =
        ThemedWrapper::new("ComcolPageContentComponent", resolver, ThemeContext::fixed(config.active_theme())).expect("wrapper");
    wrapper.set_input("title", json!("Communities")).expect("title");
    wrapper.set_input("hasInnerHtml", json!(true)).expect("hasInnerHtml");
    wrapper.attach().await.expect("attached");

    let implementation = wrapper.implementation().expect("bound");
    assert_eq!(implementation.requested_theme().as_str(), "mantis");
    assert_eq!(implementation.source(), &ImplementationSource::Themed("dspace".into()));
    assert_eq!(implementation.snapshot()["inputs"]["hasInnerHtml"], json!(true));
}

#[tokio::test]
async fn strict_config_surfaces_broken_override() {
    let config = load_config(CONFIG);
    let resolver = ThemedResolver::from_config(Arc::new(registry()), &config).expect("resolver");

    let error = resolver
        .resolve(&"ComcolPageContentComponent".into(), &"custom".into())
        .await
        .expect_err("strict");
    assert!(error.is_transient());
    assert!(matches!(error, ResolutionError::OverrideLoad { .. }));
}

#[tokio::test]
async fn lenient_config_falls_back_to_default() {
    let config = load_config(&CONFIG.replace("fallbackPolicy: strict", "fallbackPolicy: lenient"));
    assert_eq!(config.fallback_policy, FallbackPolicy::Lenient);
    let resolver = ThemedResolver::from_config(Arc::new(registry()), &config).expect("resolver");

    let resolved = resolver
        .resolve(&"ComcolPageContentComponent".into(), &"custom".into())
        .await
        .expect("lenient fallback");
    assert!(resolved.source().is_default());
    assert_eq!(resolved.module_name(), "ComcolPageContentComponent");
}

#[tokio::test]
async fn unconfigured_theme_only_matches_its_own_overrides() {
    let config = load_config(CONFIG);
    let resolver = ThemedResolver::from_config(Arc::new(registry()), &config).expect("resolver");

    let resolved = resolver
        .resolve(&"ComcolPageContentComponent".into(), &"atmire".into())
        .await
        .expect("default");
    assert!(resolved.source().is_default());

    let unthemed = resolver
        .resolve(&"ComcolPageContentComponent".into(), &ThemeIdentifier::none())
        .await
        .expect("default");
    assert_eq!(unthemed.used_theme(), None);
}
