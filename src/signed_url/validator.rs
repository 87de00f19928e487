use std::sync::Arc;

use super::query::{ParsedTarget, EXPIRES_PARAM, SIGNATURE_PARAM};
use super::storage::SignedUrlStorage;
use super::{signature_input, ENCODED_SEPARATOR};
use crate::clock::Clock;
use crate::{Sha256Hmac, SignedUrlError};

/// Checks signed urls and counts their use.
pub struct SignedUrlValidator {
    storage: Arc<dyn SignedUrlStorage>,
    hmac: Sha256Hmac,
    clock: Arc<dyn Clock>,
}

impl SignedUrlValidator {
    pub fn new(storage: Arc<dyn SignedUrlStorage>, hmac: Sha256Hmac, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            hmac,
            clock,
        }
    }

    /// Validates a signed url (absolute or host-relative) and consumes one
    /// use.
    ///
    /// The signature is checked before the expiry, so a tampered link is
    /// always reported as `InvalidSignature`.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if the url is malformed, lacks `expires` or
    ///   `signature`, or does not match its signature
    /// - `Expired` if the current time is past `expires`
    /// - `UsageExceeded` if the link has been used `max_usage` times
    /// - `Storage` on a backend failure
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "validate_signed_url", skip_all, err)
    )]
    pub fn validate(&self, url_or_path: &str, request_context: &str) -> Result<(), SignedUrlError> {
        let invalid = || SignedUrlError::InvalidSignature(url_or_path.to_owned());

        let mut parsed = ParsedTarget::parse(url_or_path).map_err(|_| invalid())?;
        let (Some(expires), Some(signature)) = (
            single(parsed.take_param(EXPIRES_PARAM)),
            single(parsed.take_param(SIGNATURE_PARAM)),
        ) else {
            return Err(invalid());
        };

        let expires = parse_timestamp(expires).ok_or_else(invalid)?;
        let (identifier, hash) = split_signature(signature).ok_or_else(invalid)?;

        let input = signature_input(identifier, &parsed.path_and_query(), expires, request_context);
        if !self.hmac.verify(&input, hash) {
            log::warn!(
                target: "warden::signed_url",
                "msg=\"signed url signature mismatch\" identifier_prefix=\"{}...\"",
                identifier.chars().take(8).collect::<String>()
            );
            return Err(invalid());
        }

        let now = self.clock.current_timestamp();
        if now > expires {
            log::debug!(
                target: "warden::signed_url",
                "msg=\"signed url expired\" identifier={identifier} expired_at={expires}"
            );
            return Err(SignedUrlError::Expired {
                identifier: identifier.to_owned(),
                expired_at: expires,
            });
        }

        self.consume(identifier)
    }

    fn consume(&self, identifier: &str) -> Result<(), SignedUrlError> {
        let exceeded = || {
            log::info!(
                target: "warden::signed_url",
                "msg=\"signed url usage exceeded\" identifier={identifier}"
            );
            SignedUrlError::UsageExceeded {
                identifier: identifier.to_owned(),
            }
        };

        let record = match self.storage.get(identifier)? {
            Some(record) if !record.is_exhausted() => record,
            _ => return Err(exceeded()),
        };

        let used = match self.storage.increment_usage(identifier) {
            Ok(used) => used,
            // collected between get and increment
            Err(SignedUrlError::UnknownIdentifier(_)) => return Err(exceeded()),
            Err(e) => return Err(e),
        };

        if used > record.max_usage {
            return Err(exceeded());
        }
        Ok(())
    }
}

fn single(mut values: Vec<&str>) -> Option<&str> {
    if values.len() == 1 {
        values.pop()
    } else {
        None
    }
}

/// Splits `identifier%7Chash` exactly as the signer writes it.
fn split_signature(signature: &str) -> Option<(&str, &str)> {
    signature.split_once(ENCODED_SEPARATOR)
}

/// Parses the canonical decimal form only: ascii digits, no sign and no
/// leading zero.
fn parse_timestamp(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if value.len() > 1 && value.starts_with('0') {
        return None;
    }
    value.parse().ok()
}
