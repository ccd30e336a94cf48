//! Shared secret `Authorization` header validation.
//!
//! The expected secret is fixed for the lifetime of the process. Only its SHA-256 digest is
//! kept once an [`ExpectedSecret`] is built, and received header values are digested the same
//! way before a constant-time comparison. Comparing fixed-length digests means neither the
//! content nor the length of the secret influences how long a comparison takes.

use crate::error::Error;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

type SecretDigest = [u8; 32];

/// The `Authorization` header value that `/authz` callers must present.
#[derive(Clone, Default)]
pub struct ExpectedSecret {
    digest: Option<SecretDigest>,
}

impl ExpectedSecret {
    /// Build an expected secret. An empty secret can never be presented (an empty header
    /// counts as missing) so it's treated the same as no secret at all.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Self::unconfigured();
        }
        Self {
            digest: Some(digest(secret)),
        }
    }

    /// An expected secret that denies every request.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { digest: None }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Decide whether the `received` header value grants access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAuthzHeader`] when `received` is absent or empty and
    /// [`Error::WrongAuthzHeader`] when it doesn't match. Every denial is logged with its
    /// reason only.
    pub fn validate(&self, received: Option<&[u8]>) -> Result<(), Error> {
        let denial = match (received, &self.digest) {
            (None, _) => Error::MissingAuthzHeader,
            (Some(received), _) if received.is_empty() => Error::MissingAuthzHeader,
            (Some(_), None) => {
                tracing::error!("no expected Authorization header configured");
                Error::WrongAuthzHeader
            }
            (Some(received), Some(expected)) => {
                if bool::from(digest(received).as_slice().ct_eq(expected.as_slice())) {
                    return Ok(());
                }
                Error::WrongAuthzHeader
            }
        };
        tracing::error!(reason = %denial, "validate");
        Err(denial)
    }
}

impl fmt::Debug for ExpectedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_configured() {
            "configured"
        } else {
            "unconfigured"
        };
        f.debug_tuple("ExpectedSecret").field(&state).finish()
    }
}

fn digest(value: &[u8]) -> SecretDigest {
    Sha256::digest(value).into()
}
