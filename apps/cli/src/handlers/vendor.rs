use crate::handlers::print_license;
use crate::models::args::IssueArgs;
use crate::services::managers;
use anyhow::{Context, Result};
use sigil_kernel::domain::config::LicensingConfig;
use sigil_licensing::prelude::*;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Issues a license artifact and prints the normalized payload.
///
/// # Errors
/// Fails if the keyset cannot be loaded, the payload is rejected, or writing fails.
pub fn issue_license(config: &LicensingConfig, args: IssueArgs) -> Result<()> {
    let manager = managers::vendor_manager(config, args.model)?;

    let mut builder = License::builder();
    if let Some(subject) = args.subject {
        builder = builder.subject(subject);
    }
    if let Some(issuer) = args.issuer {
        builder = builder.issuer(issuer);
    }
    if let Some(holder) = args.holder {
        builder = builder.holder(holder);
    }
    if let Some(consumer_type) = args.consumer_type {
        builder = builder.consumer_type(consumer_type);
    }
    if let Some(consumers) = args.consumers {
        builder = builder.consumer_amount(consumers);
    }
    if let Some(info) = args.info {
        builder = builder.info(info);
    }
    for (key, value) in args.attributes {
        builder = builder.attribute(key, value);
    }

    let not_after = args.not_after.or_else(|| {
        args.days.map(|days| {
            let start = args.not_before.unwrap_or_else(|| SystemClock.now_secs());
            start + i64::from(days) * SECONDS_PER_DAY
        })
    });
    builder = builder.not_before(args.not_before).not_after(not_after);

    let generator = manager.generator(builder.build())?;
    generator
        .write_to(&FileStore::new(&args.output))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_license(generator.license())
}
