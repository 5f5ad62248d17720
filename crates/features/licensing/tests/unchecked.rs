use sigil_licensing::prelude::*;
use sigil_licensing::unchecked::{UncheckedConsumerManager, UncheckedVendorManager};
use std::panic::AssertUnwindSafe;

fn keys() -> VendorKeys {
    VendorKeys::from_seed(&[41u8; 32], None)
}

fn vendor() -> BasicVendorManager {
    BasicVendorManager::new(VendorParameters::new("Widget", keys())).unwrap()
}

fn consumer(now: i64) -> UncheckedConsumerManager<BasicConsumerManager> {
    BasicConsumerManager::new(
        ConsumerParameters::new("Widget", keys().consumer_keys()).clock(FixedClock::from_secs(now)),
    )
    .unwrap()
    .unchecked()
}

/// Runs the same operation through both surfaces and checks the unchecked failure wraps
/// exactly the checked one.
fn assert_same_failure<T: std::fmt::Debug>(
    checked: Result<T, LicenseError>,
    unchecked: impl FnOnce() -> T,
    expected: LicenseErrorKind,
) {
    let checked = checked.unwrap_err();
    let raised = catch_unchecked(AssertUnwindSafe(unchecked)).unwrap_err();

    assert_eq!(checked.kind(), expected);
    assert_eq!(raised.kind(), expected);
    assert_eq!(raised.get_ref().to_string(), checked.to_string());
    assert!(std::error::Error::source(&raised).is_some());
}

#[test]
fn success_values_pass_through() {
    let vendor = vendor().unchecked();
    let generator = vendor.generator(License::builder().holder("CN=Acme").build());
    let bytes = generator.to_bytes();
    assert_eq!(bytes, generator.checked().to_bytes().unwrap());

    let manager = consumer(0);
    let installed = manager.install(&bytes);
    assert_eq!(&installed, generator.license());
    assert_eq!(manager.view(), installed);
    assert_eq!(manager.view_verified(), installed);
    manager.verify();
    assert_eq!(manager.subject(), "Widget");
    assert_eq!(manager.state(), LicenseState::Installed);
    manager.uninstall();
    assert_eq!(manager.checked().state(), LicenseState::Uninstalled);
}

#[test]
fn every_failure_kind_is_wrapped_faithfully() {
    let expired = vendor().generator(License::builder().validity(0, 10).build()).unwrap();
    let future = vendor().generator(License::builder().validity(100, 200).build()).unwrap();
    let seats = vendor().generator(License::builder().consumer_type("Seat").build()).unwrap();

    let manager = consumer(50);
    let checked = manager.checked();

    assert_same_failure(checked.view(), || manager.view(), LicenseErrorKind::NotInstalled);
    assert_same_failure(checked.uninstall(), || manager.uninstall(), LicenseErrorKind::NotInstalled);

    let garbage = b"garbage".to_vec();
    assert_same_failure(
        checked.install(&garbage),
        || manager.install(&garbage),
        LicenseErrorKind::CorruptArtifact,
    );

    let mut forged = expired.to_bytes().unwrap();
    let last = forged.len() - 1;
    forged[last] ^= 1;
    assert_same_failure(
        checked.install(&forged),
        || manager.install(&forged),
        LicenseErrorKind::AuthenticationFailed,
    );

    let empty = MemoryStore::new();
    assert_same_failure(checked.install(&empty), || manager.install(&empty), LicenseErrorKind::StoreIo);

    manager.install(&expired.to_bytes().unwrap());
    assert_same_failure(checked.verify(), || manager.verify(), LicenseErrorKind::Expired);

    manager.install(&future.to_bytes().unwrap());
    assert_same_failure(checked.verify(), || manager.verify(), LicenseErrorKind::NotYetValid);

    manager.install(&seats.to_bytes().unwrap());
    assert_same_failure(
        checked.view_verified(),
        || manager.view_verified(),
        LicenseErrorKind::ConsumerLimitExceeded,
    );
}

#[test]
fn vendor_failures_are_wrapped() {
    let vendor: UncheckedVendorManager<_> = vendor().unchecked();
    let inverted = License::builder().validity(10, 0).build();

    assert_same_failure(
        vendor.checked().generator(inverted.clone()).map(|_| ()),
        || {
            vendor.generator(inverted);
        },
        LicenseErrorKind::InvalidPayload,
    );
}

#[test]
fn into_checked_keeps_installed_state() {
    let bytes = vendor().generator(License::builder().build()).unwrap().to_bytes().unwrap();
    let manager = consumer(0);
    manager.install(&bytes);

    let checked = manager.into_checked();
    assert_eq!(checked.state(), LicenseState::Installed);
    checked.verify().unwrap();
}

#[test]
#[should_panic(expected = "boom")]
fn foreign_panics_are_resumed() {
    let _ = catch_unchecked(|| panic!("boom"));
}
