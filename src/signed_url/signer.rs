use std::sync::Arc;

use super::query::{ParsedTarget, EXPIRES_PARAM, SIGNATURE_PARAM};
use super::storage::SignedUrlStorage;
use super::{signature_input, SignedUrl, ENCODED_SEPARATOR};
use crate::clock::Clock;
use crate::crypto::random_hex;
use crate::{InvalidArgument, Sha256Hmac, SignedUrlError};

/// Random bytes in a signed url identifier.
pub const IDENTIFIER_STRENGTH: usize = 16;

/// Issues signed urls and records them in storage.
pub struct UrlSigner {
    storage: Arc<dyn SignedUrlStorage>,
    hmac: Sha256Hmac,
    clock: Arc<dyn Clock>,
}

impl UrlSigner {
    pub fn new(storage: Arc<dyn SignedUrlStorage>, hmac: Sha256Hmac, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            hmac,
            clock,
        }
    }

    /// Signs `target` for `lifetime_in_sec` seconds and `max_usage` uses.
    ///
    /// `target` is either a host-relative path (`/path?query`) or an
    /// absolute `http(s)` url. Only path and query are signed, so the link
    /// validates with or without its origin. `request_context` is mixed into
    /// the signature and must be passed again on validation, which binds the
    /// link to e.g. a user id or a host.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed target, a lifetime below
    ///   one second or a `max_usage` of zero
    /// - `ReservedParameter` if the target already has an `expires` or
    ///   `signature` query parameter
    /// - `Storage` if the record cannot be stored
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_url", skip_all, err)
    )]
    pub fn sign(
        &self,
        target: &str,
        lifetime_in_sec: i64,
        max_usage: u32,
        request_context: &str,
    ) -> Result<SignedUrl, SignedUrlError> {
        if lifetime_in_sec <= 0 {
            return Err(InvalidArgument::new(format!(
                "lifetime must be a positive number of seconds, got {lifetime_in_sec}"
            ))
            .into());
        }
        if max_usage == 0 {
            return Err(InvalidArgument::new("max usage must be at least 1").into());
        }

        let parsed = ParsedTarget::parse(target)?;
        for reserved in [EXPIRES_PARAM, SIGNATURE_PARAM] {
            if parsed.has_param(reserved) {
                return Err(SignedUrlError::ReservedParameter(reserved.to_owned()));
            }
        }

        let identifier = random_hex(IDENTIFIER_STRENGTH);
        let expires = self
            .clock
            .current_timestamp()
            .checked_add(lifetime_in_sec)
            .ok_or_else(|| InvalidArgument::new("lifetime overflows the expiry timestamp"))?;

        let hash = self.hmac.sign(&signature_input(
            &identifier,
            &parsed.path_and_query(),
            expires,
            request_context,
        ));

        self.storage.store(&identifier, expires, max_usage)?;

        let url = format!(
            "{target}{}{EXPIRES_PARAM}={expires}&{SIGNATURE_PARAM}={identifier}{ENCODED_SEPARATOR}{hash}",
            query_separator(target)
        );

        log::debug!(
            target: "warden::signed_url",
            "msg=\"signed url issued\" identifier={identifier} expires={expires} max_usage={max_usage}"
        );

        Ok(SignedUrl::new(
            target.to_owned(),
            url,
            identifier,
            max_usage,
            expires,
        ))
    }

    /// A link for a single use without request context.
    ///
    /// # Errors
    ///
    /// See [`UrlSigner::sign`].
    pub fn sign_once(&self, target: &str, lifetime_in_sec: i64) -> Result<SignedUrl, SignedUrlError> {
        self.sign(target, lifetime_in_sec, 1, "")
    }
}

fn query_separator(target: &str) -> &'static str {
    if !target.contains('?') {
        "?"
    } else if target.ends_with('?') || target.ends_with('&') {
        ""
    } else {
        "&"
    }
}
