//! Admin API token minting.
//!
//! An admin key is `"<id>:<hex secret>"`. Each token is an HS256 JWT with the
//! key id in the `kid` header, the admin audience, and a five minute lifetime.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Audience the admin API expects in every token.
pub const ADMIN_AUDIENCE: &str = "/admin/";

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 5 * 60;

/// A parsed admin key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminKey {
    id: String,
    secret: Vec<u8>,
}

// Keep the secret out of logs.
impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl AdminKey {
    /// Parse `"id:secret"`. The secret must be hex.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let (id, secret) = raw.trim().split_once(':').ok_or(
            CredentialError::InvalidCredentialFormat("expected '<id>:<secret>'"),
        )?;
        if id.is_empty() || secret.is_empty() {
            return Err(CredentialError::InvalidCredentialFormat(
                "id and secret must both be non-empty",
            ));
        }
        if secret.contains(':') {
            return Err(CredentialError::InvalidCredentialFormat(
                "expected exactly one ':' separator",
            ));
        }
        let secret = hex::decode(secret)
            .map_err(|_| CredentialError::InvalidCredentialFormat("secret is not valid hex"))?;
        Ok(Self {
            id: id.to_string(),
            secret,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Claims carried by an admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

/// Mint a token issued now.
pub fn mint(key: &AdminKey) -> Result<String, CredentialError> {
    mint_at(key, Utc::now().timestamp())
}

/// Mint a token issued at `issued_at` (unix seconds).
pub fn mint_at(key: &AdminKey, issued_at: i64) -> Result<String, CredentialError> {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(key.id.clone());

    let claims = AdminClaims {
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
        aud: ADMIN_AUDIENCE.to_string(),
    };

    encode(&header, &claims, &EncodingKey::from_secret(&key.secret))
        .map_err(|e| CredentialError::Signing(e.to_string()))
}

/// Parse `raw` and mint a token in one step.
pub fn prepare(raw: &str) -> Result<String, CredentialError> {
    mint(&AdminKey::parse(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
    use rstest::rstest;

    fn validation() -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.set_audience(&[ADMIN_AUDIENCE]);
        v
    }

    #[test]
    fn token_carries_key_id_and_five_minute_expiry() {
        let token = prepare("abc:646566").expect("token");

        let header = decode_header(&token).expect("header");
        assert_eq!(header.kid.as_deref(), Some("abc"));
        assert_eq!(header.alg, Algorithm::HS256);

        let data = decode::<AdminClaims>(&token, &DecodingKey::from_secret(b"def"), &validation())
            .expect("signature verifies with hex-decoded secret");
        assert_eq!(data.claims.exp - data.claims.iat, 300);
        assert_eq!(data.claims.aud, ADMIN_AUDIENCE);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = prepare("abc:646566").expect("token");
        let result = decode::<AdminClaims>(&token, &DecodingKey::from_secret(b"nope"), &validation());
        assert!(result.is_err());
    }

    #[test]
    fn mint_at_uses_given_issue_time() {
        let key = AdminKey::parse("k:00ff").unwrap();
        let token = mint_at(&key, 1_000).unwrap();
        let mut v = validation();
        v.validate_exp = false;
        let data = decode::<AdminClaims>(&token, &DecodingKey::from_secret(&[0x00, 0xff]), &v).unwrap();
        assert_eq!(data.claims.iat, 1_000);
        assert_eq!(data.claims.exp, 1_300);
    }

    #[rstest]
    #[case("no-colon-here")]
    #[case(":646566")]
    #[case("abc:")]
    #[case("abc:64:65")]
    #[case("abc:not-hex")]
    #[case("abc:6")]
    fn malformed_keys_are_rejected(#[case] raw: &str) {
        let err = AdminKey::parse(raw).unwrap_err();
        assert!(
            matches!(err, CredentialError::InvalidCredentialFormat(_)),
            "got: {err}"
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let key = AdminKey::parse("abc:646566").unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("abc"));
        assert!(!debug.contains("646566"));
    }
}
