use docrag_core::config::{expand_path, resolve_with_base, Config, Settings};
use docrag_core::error::Error;
use docrag_core::types::{IdScheme, MetadataPolicy};
use figment::providers::{Format, Toml};
use figment::{Figment, Jail};
use std::path::Path;

fn jail_err(e: Error) -> figment::Error { figment::Error::from(e.to_string()) }

#[test]
fn defaults_apply_when_only_key_is_set() {
    let cfg = Config::from_figment(Figment::new().merge(Toml::string(r#"google_api_key = "k""#)));
    let s = cfg.settings().expect("settings");
    assert_eq!(s.persist_directory, ".chroma");
    assert_eq!(s.chunk_size, 1000);
    assert_eq!(s.chunk_overlap, 200);
    assert_eq!(s.max_retrieval_docs, 5);
    assert_eq!(s.embedding_model, "embedding-001");
    assert_eq!(s.generation_model, "gemini-1.5-pro");
    assert_eq!(s.metadata_policy, MetadataPolicy::Replace);
    assert_eq!(s.id_strategy, IdScheme::ContentHash);
}

#[test]
fn missing_api_key_is_config_missing() {
    let cfg = Config::from_figment(Figment::new().merge(Toml::string("chunk_size = 10")));
    match cfg.settings() {
        Err(Error::ConfigMissing(key)) => assert_eq!(key, "GOOGLE_API_KEY"),
        other => panic!("expected ConfigMissing, got {other:?}"),
    }

    let blank = Config::from_figment(Figment::new().merge(Toml::string(r#"google_api_key = "  ""#)));
    assert!(matches!(blank.settings(), Err(Error::ConfigMissing(_))));
}

#[test]
fn overlap_larger_than_chunk_is_rejected() {
    let cfg = Config::from_figment(Figment::new().merge(Toml::string(
        r#"
        google_api_key = "k"
        chunk_size = 100
        chunk_overlap = 150
        "#,
    )));
    assert!(matches!(cfg.settings(), Err(Error::InvalidConfig(_))));
}

#[test]
fn plain_env_vars_override_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "chunk_size = 400\nmax_retrieval_docs = 3\n")?;
        jail.set_env("GOOGLE_API_KEY", "from-env");
        jail.set_env("CHUNK_SIZE", "500");
        jail.set_env("CHUNK_OVERLAP", "50");
        jail.set_env("PERSIST_DIRECTORY", "store");

        let s = Config::load_for_env("test").and_then(|c| c.settings()).map_err(jail_err)?;
        assert_eq!(s.google_api_key, "from-env");
        assert_eq!(s.chunk_size, 500);
        assert_eq!(s.chunk_overlap, 50);
        assert_eq!(s.max_retrieval_docs, 3);
        assert_eq!(s.persist_directory, "store");
        Ok(())
    });
}

#[test]
fn chroma_alias_sets_persist_directory() {
    Jail::expect_with(|jail| {
        jail.set_env("GOOGLE_API_KEY", "k");
        jail.set_env("CHROMA_PERSIST_DIRECTORY", "legacy_dir");
        let s = Config::load_for_env("test").and_then(|c| c.settings()).map_err(jail_err)?;
        assert_eq!(s.persist_directory, "legacy_dir");
        Ok(())
    });
}

#[test]
fn app_prefixed_vars_and_env_file_are_merged() {
    Jail::expect_with(|jail| {
        jail.create_file("config.test.toml", "id_strategy = \"positional\"\n")?;
        jail.set_env("APP_GOOGLE_API_KEY", "k");
        jail.set_env("APP_METADATA_POLICY", "merge");
        let s = Config::load_for_env("test").and_then(|c| c.settings()).map_err(jail_err)?;
        assert_eq!(s.id_strategy, IdScheme::Positional);
        assert_eq!(s.metadata_policy, MetadataPolicy::Merge);
        Ok(())
    });
}

#[test]
fn settings_new_validates() {
    let mut s = Settings::new("k");
    assert!(s.validate().is_ok());
    s.max_retrieval_docs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn path_helpers_expand_and_resolve() {
    Jail::expect_with(|jail| {
        jail.set_env("DOCRAG_TEST_DIR", "/tmp/docrag");
        assert_eq!(expand_path("$DOCRAG_TEST_DIR/db"), Path::new("/tmp/docrag/db"));
        assert_eq!(resolve_with_base(Path::new("/base"), "rel/db"), Path::new("/base/rel/db"));
        assert_eq!(resolve_with_base(Path::new("/base"), "/abs/db"), Path::new("/abs/db"));
        Ok(())
    });
}
