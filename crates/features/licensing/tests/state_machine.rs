use sigil_licensing::prelude::*;
use std::sync::Arc;
use std::thread;

fn keys() -> VendorKeys {
    VendorKeys::from_seed(&[31u8; 32], None)
}

fn issue(holder: &str) -> Vec<u8> {
    BasicVendorManager::new(VendorParameters::new("Widget", keys()))
        .unwrap()
        .generator(License::builder().holder(holder).build())
        .unwrap()
        .to_bytes()
        .unwrap()
}

fn consumer() -> BasicConsumerManager {
    BasicConsumerManager::new(ConsumerParameters::new("Widget", keys().consumer_keys())).unwrap()
}

fn assert_not_installed(manager: &BasicConsumerManager) {
    assert_eq!(manager.state(), LicenseState::Uninstalled);
    assert_eq!(manager.view().unwrap_err().kind(), LicenseErrorKind::NotInstalled);
    assert_eq!(manager.verify().unwrap_err().kind(), LicenseErrorKind::NotInstalled);
    assert_eq!(manager.view_verified().unwrap_err().kind(), LicenseErrorKind::NotInstalled);
    assert_eq!(manager.uninstall().unwrap_err().kind(), LicenseErrorKind::NotInstalled);
}

#[test]
fn uninstall_returns_to_uninstalled() {
    let manager = consumer();
    assert_not_installed(&manager);

    manager.install(&issue("CN=Acme")).unwrap();
    assert_eq!(manager.state(), LicenseState::Installed);
    manager.verify().unwrap();

    manager.uninstall().unwrap();
    assert_not_installed(&manager);

    manager.install(&issue("CN=Acme")).unwrap();
    assert_eq!(manager.view().unwrap().holder(), "CN=Acme");
}

#[test]
fn install_replaces_previous_artifact() {
    let manager = consumer();
    manager.install(&issue("CN=First")).unwrap();
    manager.install(&issue("CN=Second")).unwrap();
    assert_eq!(manager.view().unwrap().holder(), "CN=Second");
}

#[test]
fn failed_install_keeps_previous_artifact() {
    let manager = consumer();
    let installed = manager.install(&issue("CN=Acme")).unwrap();

    let mut forged = issue("CN=Mallory");
    let last = forged.len() - 1;
    forged[last] ^= 0xff;
    assert_eq!(manager.install(&forged).unwrap_err().kind(), LicenseErrorKind::AuthenticationFailed);

    let foreign = VendorKeys::from_seed(&[32u8; 32], None);
    let unsigned = BasicVendorManager::new(VendorParameters::new("Widget", foreign))
        .unwrap()
        .generator(License::builder().build())
        .unwrap()
        .to_bytes()
        .unwrap();
    assert_eq!(
        manager.install(&unsigned).unwrap_err().kind(),
        LicenseErrorKind::AuthenticationFailed
    );

    assert_eq!(manager.view().unwrap(), installed);
    manager.verify().unwrap();
}

#[test]
fn failed_source_read_keeps_state() {
    let manager = consumer();
    let empty = MemoryStore::new();
    assert_eq!(manager.install(&empty).unwrap_err().kind(), LicenseErrorKind::StoreIo);
    assert_eq!(manager.state(), LicenseState::Uninstalled);
}

#[test]
fn verify_is_deterministic_at_fixed_time() {
    let manager = BasicConsumerManager::new(
        ConsumerParameters::new("Widget", keys().consumer_keys())
            .clock(FixedClock::from_secs(1_717_200_000)),
    )
    .unwrap();
    manager.install(&issue("CN=Acme")).unwrap();

    let outcomes: Vec<_> = (0..5).map(|_| manager.verify().map_err(|e| e.kind())).collect();
    assert!(outcomes.iter().all(|outcome| *outcome == Ok(())));
}

#[test]
fn concurrent_readers_and_writers() {
    let manager = Arc::new(consumer());
    manager.install(&issue("CN=Acme")).unwrap();
    let artifact = Arc::new(issue("CN=Acme"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let artifact = Arc::clone(&artifact);
            thread::spawn(move || {
                for _ in 0..20 {
                    if i % 4 == 0 {
                        manager.install(&*artifact).unwrap();
                    } else {
                        assert_eq!(manager.view().unwrap().holder(), "CN=Acme");
                        manager.verify().unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(manager.state(), LicenseState::Installed);
}
