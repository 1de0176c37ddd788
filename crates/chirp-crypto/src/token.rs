/// 32 random bytes, hex encoded. Used as the single-use email confirmation token.
pub fn generate_activation_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

pub fn generate_account_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
