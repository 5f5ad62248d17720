use sigil_domain::config::{LicensingConfig, LoggingConfig, SigilConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let licensing = LicensingConfig::default();
    assert_eq!(licensing.version, "v1");
    assert_eq!(licensing.consumer_type, "User");
    assert_eq!(licensing.consumers, 1);
    assert!(licensing.secret.is_none());

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.directory.is_none());
}

#[test]
fn sigil_config_deserializes_partial_sections() {
    let raw = json!({
        "licensing": { "subject": "Widget", "version": "v2", "secret": "s3cr3t" },
        "logging": { "level": "debug", "json": true }
    });

    let cfg: SigilConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.licensing.subject, "Widget");
    assert_eq!(cfg.licensing.version, "v2");
    assert_eq!(cfg.licensing.secret.as_deref(), Some("s3cr3t"));
    assert_eq!(cfg.licensing.store, std::path::PathBuf::from("license.lic"));
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
}

#[test]
fn sigil_config_clones_share_until_mutated() {
    let original = SigilConfig::default();
    let mut copy = original.clone();
    copy.licensing.subject = "Gadget".to_owned();

    assert_eq!(original.licensing.subject, "sigil");
    assert_eq!(copy.licensing.subject, "Gadget");
}
