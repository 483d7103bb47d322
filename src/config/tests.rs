use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.logging.format, LogFormat::Compact);
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(300));
    assert_eq!(settings.cache.capacity.get(), 1024);
    assert_eq!(settings.cache.operation_timeout, Duration::from_millis(250));
    assert!(!settings.cascade.reactivate_descendants);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.ttl_seconds = Some(60);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_ttl_seconds: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.ttl, Duration::from_secs(5));
}

#[test]
fn environment_overrides_file_values() {
    let raw: RawSettings = Config::builder()
        .set_default("cache.capacity", 16_i64)
        .expect("default")
        .set_override("cache.capacity", 64_i64)
        .expect("override")
        .build()
        .expect("build")
        .try_deserialize()
        .expect("deserialize");

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.capacity.get(), 64);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn blank_database_url_selects_in_memory_store() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.cache.capacity = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn cascade_policy_toggle_is_read() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cascade_reactivate_descendants: Some(true),
        ..Default::default()
    };
    raw.apply_serve_overrides(&overrides);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.cascade.reactivate_descendants);
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "arbor",
        "serve",
        "--server-port",
        "8080",
        "--database-url",
        "postgres://example",
        "--cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(
                serve.overrides.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from(["arbor", "migrate", "--database-url", "postgres://db"]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://db")
            );
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["arbor"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}
