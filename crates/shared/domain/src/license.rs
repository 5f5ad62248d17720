//! # License Payload
//!
//! [`License`] is the immutable payload carried inside every artifact. It is built once
//! through [`LicenseBuilder`] and never mutated afterwards; vendors that need a normalized
//! copy go through [`License::to_builder`] and build a new value.
//!
//! Timestamps are Unix seconds (UTC). Custom attributes are kept in a [`BTreeMap`] so the
//! serialized form is canonical regardless of insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The license payload.
///
/// Field order is part of the canonical binary encoding. Append new fields at the end
/// and introduce a new artifact format version when doing so.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct License {
    subject: String,
    issuer: String,
    holder: String,
    issued: i64,
    not_before: Option<i64>,
    not_after: Option<i64>,
    consumer_type: String,
    consumer_amount: u32,
    info: Option<String>,
    extra: BTreeMap<String, String>,
}

impl License {
    /// Returns an empty [`LicenseBuilder`].
    #[must_use]
    pub fn builder() -> LicenseBuilder {
        LicenseBuilder::default()
    }

    /// Returns a builder pre-populated with every field of this license.
    #[must_use]
    pub fn to_builder(&self) -> LicenseBuilder {
        LicenseBuilder { inner: self.clone() }
    }

    /// The licensed product or feature, e.g. `"Widget"`.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Distinguished name of the issuing party.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Distinguished name of the license holder.
    #[must_use]
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Issue timestamp (Unix seconds). `0` means "not set yet".
    #[must_use]
    pub const fn issued(&self) -> i64 {
        self.issued
    }

    /// Start of the validity window (inclusive), if any.
    #[must_use]
    pub const fn not_before(&self) -> Option<i64> {
        self.not_before
    }

    /// End of the validity window (inclusive), if any.
    #[must_use]
    pub const fn not_after(&self) -> Option<i64> {
        self.not_after
    }

    /// Kind of consumer the license counts, e.g. `"User"` or `"Seat"`.
    #[must_use]
    pub fn consumer_type(&self) -> &str {
        &self.consumer_type
    }

    /// How many consumers of [`License::consumer_type`] the license admits.
    #[must_use]
    pub const fn consumer_amount(&self) -> u32 {
        self.consumer_amount
    }

    /// Free-form note for humans.
    #[must_use]
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Custom string-keyed attributes.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Looks up a single custom attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

/// Fluent builder for [`License`].
///
/// Unset fields stay empty (`""`, `0`, `None`); issuers fill them in during normalization.
#[derive(Debug, Clone, Default)]
pub struct LicenseBuilder {
    inner: License,
}

impl LicenseBuilder {
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.inner.subject = subject.into();
        self
    }

    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.inner.issuer = issuer.into();
        self
    }

    #[must_use]
    pub fn holder(mut self, holder: impl Into<String>) -> Self {
        self.inner.holder = holder.into();
        self
    }

    #[must_use]
    pub const fn issued(mut self, issued: i64) -> Self {
        self.inner.issued = issued;
        self
    }

    #[must_use]
    pub const fn not_before(mut self, not_before: Option<i64>) -> Self {
        self.inner.not_before = not_before;
        self
    }

    #[must_use]
    pub const fn not_after(mut self, not_after: Option<i64>) -> Self {
        self.inner.not_after = not_after;
        self
    }

    /// Sets both ends of the validity window.
    #[must_use]
    pub const fn validity(mut self, not_before: i64, not_after: i64) -> Self {
        self.inner.not_before = Some(not_before);
        self.inner.not_after = Some(not_after);
        self
    }

    #[must_use]
    pub fn consumer_type(mut self, consumer_type: impl Into<String>) -> Self {
        self.inner.consumer_type = consumer_type.into();
        self
    }

    #[must_use]
    pub const fn consumer_amount(mut self, consumer_amount: u32) -> Self {
        self.inner.consumer_amount = consumer_amount;
        self
    }

    #[must_use]
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.inner.info = Some(info.into());
        self
    }

    /// Adds (or replaces) a custom attribute.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> License {
        self.inner
    }
}
