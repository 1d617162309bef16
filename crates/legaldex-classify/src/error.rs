// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by a [`crate::ClassifierProvider`] adapter or the
//! [`crate::ClassifierRouter`] that dispatches to them (§4.3/§7).

use legaldex_core::{ClassificationFailure, ErrorKind};

/// Failure modes for classifier dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The provider could not be reached or refused the request outright.
    #[error("classifier '{provider}' unavailable: {reason}")]
    Unavailable {
        /// Name of the provider that failed.
        provider: String,
        /// Human-readable cause.
        reason: String,
    },
    /// The provider's usage quota was exhausted.
    #[error("classifier '{provider}' quota exceeded")]
    QuotaExceeded {
        /// Name of the provider that failed.
        provider: String,
    },
    /// The provider responded but the payload could not be parsed.
    #[error("classifier '{provider}' returned a malformed response: {reason}")]
    Malformed {
        /// Name of the provider that failed.
        provider: String,
        /// Parse failure detail.
        reason: String,
    },
    /// No adapter is configured (missing credentials for every provider).
    #[error("no classifier provider is configured")]
    NoProviderConfigured,
    /// The caller requested a provider name the router does not know.
    #[error("requested classifier provider '{0}' is not registered")]
    UnknownProvider(String),
}

impl ClassifyError {
    /// Maps onto [`ErrorKind::Classification`] (§7), except for the two
    /// router-local variants which are caller input errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoProviderConfigured | Self::UnknownProvider(_) => ErrorKind::Validation,
            Self::Unavailable { .. } | Self::QuotaExceeded { .. } | Self::Malformed { .. } => {
                ErrorKind::Classification
            }
        }
    }

    /// The [`ClassificationFailure`] sub-kind, when this is a classification
    /// failure at all (the two router-local variants have none).
    #[must_use]
    pub fn failure(&self) -> Option<ClassificationFailure> {
        match self {
            Self::Unavailable { .. } => Some(ClassificationFailure::Unavailable),
            Self::QuotaExceeded { .. } => Some(ClassificationFailure::QuotaExceeded),
            Self::Malformed { .. } => Some(ClassificationFailure::Malformed),
            Self::NoProviderConfigured | Self::UnknownProvider(_) => None,
        }
    }
}
