use chirp_core::{Account, ChirpResult, SessionIssuer};

/// Signs the account in by minting a bearer JWT.
#[derive(Clone)]
pub struct JwtSessionIssuer {
    secret: String,
}

impl JwtSessionIssuer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn login(&self, account: &Account) -> ChirpResult<String> {
        chirp_crypto::create_session_token(&account.id, &self.secret)
    }
}
