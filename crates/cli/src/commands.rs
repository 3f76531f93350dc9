//! Command implementations. Each returns the JSON document printed by `main`.

use std::{env, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde_json::{Value, json};
use thematic_engine::{AttachOutcome, ThemeContext, ThemedResolver, ThemedWrapper};
use thematic_registry::{ComponentRegistry, ThemeCatalog};
use thematic_types::{BindingValue, ThemeDefinition, ThemeIdentifier};
use thematic_util::{THEME_ENV, ThematicConfig, ThemePreferences, save_config_to_path, validate_theme_name};
use tracing::{info, warn};

/// Pick the theme to resolve for.
///
/// Precedence: explicit flag, `THEMATIC_THEME` (already folded into the
/// loaded config), the persisted preference, then the configured active theme.
pub fn select_theme(flag: Option<&str>, config: &ThematicConfig, preferences: &ThemePreferences) -> ThemeIdentifier {
    if let Some(theme) = flag {
        return ThemeIdentifier::new(theme);
    }
    let env_selected = env::var(THEME_ENV).map(|value| !value.trim().is_empty()).unwrap_or(false);
    if !env_selected && let Some(preferred) = preferences.preferred_theme() {
        return ThemeIdentifier::new(preferred);
    }
    config.active_theme()
}

/// Parse a `name=value` input. The value is read as JSON when it parses,
/// otherwise taken verbatim as a string.
pub fn parse_input(raw: &str) -> Result<(String, BindingValue)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("input '{raw}' must look like name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("input '{raw}' has an empty name");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

pub fn parse_inputs(raw: &[String]) -> Result<IndexMap<String, BindingValue>> {
    raw.iter().map(|input| parse_input(input)).collect()
}

pub fn components_report(registry: &ComponentRegistry) -> Value {
    let components: Vec<Value> = registry
        .registrations()
        .map(|registration| {
            let bindings = registration.bindings();
            json!({
                "identity": registration.identity().as_str(),
                "inputs": bindings.input_names().collect::<Vec<_>>(),
                "outputs": bindings.output_names().collect::<Vec<_>>(),
                "themes": registration.overridden_themes().map(ThemeIdentifier::as_str).collect::<Vec<_>>(),
            })
        })
        .collect();
    Value::Array(components)
}

pub fn themes_report(catalog: &ThemeCatalog, active: &ThemeIdentifier) -> Value {
    let themes: Vec<Value> = catalog
        .definitions()
        .map(|definition| {
            let ancestry: Vec<String> = catalog
                .ancestry(&ThemeIdentifier::new(definition.name.as_str()))
                .into_iter()
                .map(String::from)
                .collect();
            let is_active = active.name() == Some(definition.name.as_str());
            json!({
                "name": definition.name,
                "extends": definition.extends,
                "ancestry": ancestry,
                "active": is_active,
            })
        })
        .collect();
    json!({
        "activeTheme": active.name(),
        "themes": themes,
    })
}

/// Resolve `identity` for `theme` through a wrapper and describe the result.
pub async fn resolve_report(
    resolver: Arc<ThemedResolver>,
    identity: &str,
    theme: ThemeIdentifier,
    inputs: IndexMap<String, BindingValue>,
) -> Result<Value> {
    let mut wrapper = ThemedWrapper::new(identity, resolver, ThemeContext::fixed(theme.clone()))?;
    for (name, value) in inputs {
        wrapper.set_input(&name, value)?;
    }

    let outcome = wrapper
        .attach()
        .await
        .with_context(|| format!("failed to resolve {identity} for theme {theme}"))?;
    if outcome == AttachOutcome::Discarded {
        bail!("resolution of {identity} was cancelled");
    }
    let implementation = wrapper.implementation().context("wrapper has no bound implementation")?;

    Ok(json!({
        "identity": identity,
        "requestedTheme": theme.name(),
        "usedTheme": wrapper.used_theme().map(ThemeIdentifier::as_str),
        "source": implementation.source().to_string(),
        "state": wrapper.state().to_string(),
        "implementation": implementation.snapshot(),
    }))
}

/// Show, set or clear the preferred theme.
pub fn prefer_theme(preferences: &ThemePreferences, catalog: &ThemeCatalog, theme: Option<String>, clear: bool) -> Result<Value> {
    if clear {
        preferences.set_preferred_theme(None)?;
        info!("preferred theme cleared");
    } else if let Some(theme) = theme {
        validate_theme_name(&theme)?;
        if !catalog.contains(&theme) {
            warn!(theme = %theme, "theme is not configured; only its own overrides will apply");
        }
        preferences.set_preferred_theme(Some(theme.clone()))?;
        info!(theme = %theme, "preferred theme saved");
    }
    Ok(json!({ "preferredTheme": preferences.preferred_theme() }))
}

/// Write a starter configuration describing the demo themes.
pub fn init_config(path: &Path, force: bool) -> Result<Value> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let config = ThematicConfig {
        active_theme: Some("dspace".to_string()),
        themes: vec![ThemeDefinition::new("dspace"), ThemeDefinition::extending("custom", "dspace")],
        ..ThematicConfig::default()
    };
    save_config_to_path(&config, path)?;
    info!(path = %path.display(), "configuration written");
    Ok(json!({ "path": path.display().to_string(), "config": config }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_registry;
    use thematic_util::load_config_from_path;

    fn demo_config() -> ThematicConfig {
        ThematicConfig {
            active_theme: Some("dspace".to_string()),
            themes: vec![ThemeDefinition::new("dspace"), ThemeDefinition::extending("mantis", "dspace")],
            ..ThematicConfig::default()
        }
    }

    fn demo_resolver() -> Arc<ThemedResolver> {
        let registry = Arc::new(demo_registry().expect("demo registry"));
        Arc::new(ThemedResolver::from_config(registry, &demo_config()).expect("resolver"))
    }

    #[test]
    fn parse_input_reads_json_or_falls_back_to_string() {
        assert_eq!(parse_input("hasInnerHtml=true").expect("bool"), ("hasInnerHtml".to_string(), json!(true)));
        assert_eq!(parse_input("title=Communities").expect("string"), ("title".to_string(), json!("Communities")));
        assert_eq!(parse_input("item={\"id\":1}").expect("object"), ("item".to_string(), json!({"id": 1})));
        assert_eq!(parse_input("content=").expect("empty"), ("content".to_string(), json!("")));
        assert!(parse_input("title").is_err());
        assert!(parse_input("=value").is_err());
    }

    #[test]
    fn theme_flag_wins_over_everything() {
        let preferences = ThemePreferences::in_memory();
        preferences.set_preferred_theme(Some("mantis".into())).expect("prefer");
        let theme = select_theme(Some("custom"), &demo_config(), &preferences);
        assert_eq!(theme.as_str(), "custom");
    }

    #[test]
    fn preference_beats_configured_theme_unless_env_is_set() {
        let preferences = ThemePreferences::in_memory();
        preferences.set_preferred_theme(Some("mantis".into())).expect("prefer");

        temp_env::with_var_unset(THEME_ENV, || {
            assert_eq!(select_theme(None, &demo_config(), &preferences).as_str(), "mantis");
        });
        temp_env::with_var(THEME_ENV, Some("dspace"), || {
            assert_eq!(select_theme(None, &demo_config(), &preferences).as_str(), "dspace");
        });
    }

    #[test]
    fn configured_theme_is_the_last_resort() {
        temp_env::with_var_unset(THEME_ENV, || {
            let theme = select_theme(None, &demo_config(), &ThemePreferences::in_memory());
            assert_eq!(theme.as_str(), "dspace");
        });
    }

    #[test]
    fn components_report_lists_bindings_and_overrides() {
        let report = components_report(&demo_registry().expect("demo registry"));
        let comcol = &report[0];
        assert_eq!(comcol["identity"], json!("ComcolPageContentComponent"));
        assert_eq!(comcol["inputs"], json!(["title", "content", "hasInnerHtml"]));
        assert_eq!(comcol["themes"], json!(["dspace", "custom"]));
    }

    #[test]
    fn themes_report_includes_ancestry() {
        let catalog = ThemeCatalog::new(demo_config().themes).expect("catalog");
        let report = themes_report(&catalog, &"mantis".into());
        assert_eq!(report["activeTheme"], json!("mantis"));
        assert_eq!(report["themes"][1]["ancestry"], json!(["mantis", "dspace"]));
        assert_eq!(report["themes"][1]["active"], json!(true));
        assert_eq!(report["themes"][0]["extends"], Value::Null);
    }

    #[tokio::test]
    async fn resolve_report_describes_the_bound_implementation() {
        let inputs = parse_inputs(&["title=Communities".to_string(), "hasInnerHtml=true".to_string()]).expect("inputs");
        let report = resolve_report(demo_resolver(), "ComcolPageContentComponent", "mantis".into(), inputs)
            .await
            .expect("resolved");

        assert_eq!(report["requestedTheme"], json!("mantis"));
        assert_eq!(report["usedTheme"], json!("dspace"));
        assert_eq!(report["source"], json!("theme:dspace"));
        assert_eq!(report["state"], json!("resolved"));
        assert_eq!(report["implementation"]["implementation"], json!("dspace/ComcolPageContentComponent"));
        assert_eq!(report["implementation"]["inputs"]["title"], json!("Communities"));
    }

    #[tokio::test]
    async fn resolve_report_falls_back_when_override_is_missing() {
        let report = resolve_report(demo_resolver(), "BrowseByTitlePageComponent", "custom".into(), IndexMap::new())
            .await
            .expect("resolved");
        assert_eq!(report["usedTheme"], Value::Null);
        assert_eq!(report["source"], json!("default"));
    }

    #[tokio::test]
    async fn resolve_report_rejects_undeclared_inputs() {
        let inputs = parse_inputs(&["colour=red".to_string()]).expect("inputs");
        let error = resolve_report(demo_resolver(), "ComcolPageContentComponent", ThemeIdentifier::none(), inputs)
            .await
            .expect_err("undeclared input");
        assert!(error.to_string().contains("colour"));
    }

    #[test]
    fn prefer_theme_persists_and_clears() {
        let directory = tempfile::tempdir().expect("tempdir");
        let preferences = ThemePreferences::open(directory.path().join("preferences.json")).expect("preferences");
        let catalog = ThemeCatalog::empty();

        let report = prefer_theme(&preferences, &catalog, Some("custom".into()), false).expect("set");
        assert_eq!(report["preferredTheme"], json!("custom"));
        assert!(prefer_theme(&preferences, &catalog, Some("not a theme".into()), false).is_err());

        let report = prefer_theme(&preferences, &catalog, None, true).expect("clear");
        assert_eq!(report["preferredTheme"], Value::Null);
    }

    #[test]
    fn init_config_writes_a_loadable_file_once() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("thematic").join("config.yaml");

        init_config(&path, false).expect("written");
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).expect("overwritten");

        let config = temp_env::with_var_unset(THEME_ENV, || load_config_from_path(&path)).expect("load");
        assert_eq!(config.active_theme().as_str(), "dspace");
        assert_eq!(config.themes, vec![ThemeDefinition::new("dspace"), ThemeDefinition::extending("custom", "dspace")]);
    }
}
