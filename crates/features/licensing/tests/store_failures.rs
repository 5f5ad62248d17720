use sigil_licensing::prelude::*;
use sigil_licensing::unchecked::UncheckedGenerator;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory slot whose writes and deletes fail while `broken` is set.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    broken: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self, op: &str) -> Result<(), LicenseError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::other(format!("{op} refused")).into());
        }
        Ok(())
    }
}

impl Source for FlakyStore {
    fn read(&self) -> Result<Vec<u8>, LicenseError> {
        self.inner.read()
    }
}

impl Sink for FlakyStore {
    fn write(&self, bytes: &[u8]) -> Result<(), LicenseError> {
        self.check("write")?;
        self.inner.write(bytes)
    }
}

impl Store for FlakyStore {
    fn exists(&self) -> bool {
        self.inner.exists()
    }

    fn delete(&self) -> Result<(), LicenseError> {
        self.check("delete")?;
        self.inner.delete()
    }
}

fn keys() -> VendorKeys {
    VendorKeys::from_seed(&[51u8; 32], None)
}

fn generator(holder: &str) -> LicenseKeyGenerator {
    BasicVendorManager::new(VendorParameters::new("Widget", keys()))
        .unwrap()
        .generator(License::builder().holder(holder).build())
        .unwrap()
}

fn consumer() -> (BasicConsumerManager, Arc<AtomicBool>) {
    let store = FlakyStore::default();
    let broken = Arc::clone(&store.broken);
    let manager =
        BasicConsumerManager::new(ConsumerParameters::new("Widget", keys().consumer_keys()).store(store))
            .unwrap();
    (manager, broken)
}

#[test]
fn write_to_failing_sink_reports_store_io() {
    let sink = FlakyStore::default();
    sink.broken.store(true, Ordering::SeqCst);
    let generator = generator("CN=Acme");

    assert_eq!(generator.write_to(&sink).unwrap_err().kind(), LicenseErrorKind::StoreIo);
    assert!(!sink.exists());

    let unchecked = UncheckedGenerator::new(generator);
    let raised = catch_unchecked(AssertUnwindSafe(|| unchecked.write_to(&sink))).unwrap_err();
    assert_eq!(raised.kind(), LicenseErrorKind::StoreIo);
}

#[test]
fn failed_persist_leaves_uninstalled_manager_untouched() {
    let (manager, broken) = consumer();
    broken.store(true, Ordering::SeqCst);

    let artifact = generator("CN=Acme").to_bytes().unwrap();
    assert_eq!(manager.install(&artifact).unwrap_err().kind(), LicenseErrorKind::StoreIo);
    assert_eq!(manager.state(), LicenseState::Uninstalled);
    assert_eq!(manager.view().unwrap_err().kind(), LicenseErrorKind::NotInstalled);
}

#[test]
fn failed_persist_keeps_previous_license() {
    let (manager, broken) = consumer();
    let installed = manager.install(&generator("CN=First").to_bytes().unwrap()).unwrap();

    broken.store(true, Ordering::SeqCst);
    let replacement = generator("CN=Second").to_bytes().unwrap();
    assert_eq!(manager.install(&replacement).unwrap_err().kind(), LicenseErrorKind::StoreIo);

    let unchecked = manager.unchecked();
    let raised = catch_unchecked(AssertUnwindSafe(|| unchecked.install(&replacement))).unwrap_err();
    assert_eq!(raised.kind(), LicenseErrorKind::StoreIo);

    let manager = unchecked.into_checked();
    assert_eq!(manager.state(), LicenseState::Installed);
    assert_eq!(manager.view().unwrap(), installed);
    manager.verify().unwrap();
}

#[test]
fn failed_delete_keeps_license_installed() {
    let (manager, broken) = consumer();
    let installed = manager.install(&generator("CN=Acme").to_bytes().unwrap()).unwrap();

    broken.store(true, Ordering::SeqCst);
    assert_eq!(manager.uninstall().unwrap_err().kind(), LicenseErrorKind::StoreIo);

    let unchecked = manager.unchecked();
    let raised = catch_unchecked(AssertUnwindSafe(|| unchecked.uninstall())).unwrap_err();
    assert_eq!(raised.kind(), LicenseErrorKind::StoreIo);

    let manager = unchecked.into_checked();
    assert_eq!(manager.state(), LicenseState::Installed);
    assert_eq!(manager.view().unwrap(), installed);
    manager.verify().unwrap();

    broken.store(false, Ordering::SeqCst);
    manager.uninstall().unwrap();
    assert_eq!(manager.state(), LicenseState::Uninstalled);
}
