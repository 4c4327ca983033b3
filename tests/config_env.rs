// tests/config_env.rs
//
// EngineConfig resolution: file → defaults → env overrides.
// Env-mutating tests are serialized.

use std::{env, fs};

use truthlens::config::engine::{
    ENV_CONFIG_PATH, ENV_CREDIBILITY_MATCH, ENV_MODEL_PATH, ENV_TOP_N,
};
use truthlens::credibility::MatchStrategy;
use truthlens::{Engine, EngineConfig};

fn clear_env() {
    for k in [ENV_CONFIG_PATH, ENV_MODEL_PATH, ENV_TOP_N, ENV_CREDIBILITY_MATCH] {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn missing_file_gives_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(ENV_CONFIG_PATH, dir.path().join("absent.toml"));

    let cfg = EngineConfig::from_env().unwrap();
    assert_eq!(cfg.explain.top_n, 5);
    assert_eq!(cfg.credibility.match_strategy, MatchStrategy::Substring);
    clear_env();
}

#[serial_test::serial]
#[test]
fn env_overrides_file_values() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truthlens.toml");
    fs::write(
        &path,
        r#"
[model]
path = "from-file.json"

[explain]
top_n = 4
"#,
    )
    .unwrap();

    env::set_var(ENV_CONFIG_PATH, &path);
    let cfg = EngineConfig::from_env().unwrap();
    assert_eq!(cfg.model.path.to_string_lossy(), "from-file.json");
    assert_eq!(cfg.explain.top_n, 4);

    env::set_var(ENV_MODEL_PATH, "  /srv/model.json ");
    env::set_var(ENV_TOP_N, "500");
    env::set_var(ENV_CREDIBILITY_MATCH, "suffix");
    let cfg = EngineConfig::from_env().unwrap();
    assert_eq!(cfg.model.path.to_string_lossy(), "/srv/model.json");
    assert_eq!(cfg.explain.top_n, 50, "clamped");
    assert_eq!(cfg.credibility.match_strategy, MatchStrategy::Suffix);
    clear_env();
}

#[serial_test::serial]
#[test]
fn bad_match_strategy_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(ENV_CONFIG_PATH, dir.path().join("absent.toml"));
    env::set_var(ENV_CREDIBILITY_MATCH, "fuzzy");
    assert!(EngineConfig::from_env().is_err());
    clear_env();
}

#[serial_test::serial]
#[test]
fn malformed_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[explain\ntop_n = ").unwrap();
    assert!(EngineConfig::load_from_file(&path).is_err());
}

#[test]
fn engine_from_config_goes_offline_on_missing_artifact() {
    let mut cfg = EngineConfig::default();
    cfg.model.path = "/nonexistent/model.json".into();
    let e = Engine::from_config(&cfg);
    assert!(!e.is_ready());
    assert!(e.classify("hoax").is_err());
}

#[test]
fn engine_from_config_honors_explain_settings() {
    let mut cfg = EngineConfig::default();
    cfg.model.path = format!("{}/tests/fixtures/model_small.json", env!("CARGO_MANIFEST_DIR")).into();
    cfg.explain.top_n = 2;
    cfg.explain.rationale_words = 1;
    let e = Engine::from_config(&cfg);
    let v = e.classify("shocking secret hoax conspiracy").unwrap();
    assert_eq!(v.contributing_words.len(), 2);
    assert_eq!(v.contributing_words[0].word, "conspiracy");
    assert!(v.rationale.contains("identifies 'conspiracy' as key factors"));
}

#[test]
fn bundled_demo_model_and_config_load() {
    let root = env!("CARGO_MANIFEST_DIR");
    let cfg = EngineConfig::load_from_file(format!("{root}/config/truthlens.toml")).unwrap();
    assert_eq!(cfg.explain.top_n, 5);

    let mut cfg = cfg;
    cfg.model.path = format!("{root}/models/model_v1.json").into();
    let e = Engine::from_config(&cfg);
    assert!(e.is_ready(), "{:?}", e.capabilities().offline_reason);
    let v = e
        .classify("The prime minister told reporters the budget would rise 2 percent")
        .unwrap();
    assert_eq!(v.label, truthlens::Label::Real);
}
