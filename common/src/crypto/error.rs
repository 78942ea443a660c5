use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Private key is locked")]
    Locked,
    #[error("Key pair is already locked")]
    AlreadyLocked,
    #[error("Key pair is not locked")]
    NotLocked,
    #[error("Wrong unlock key")]
    WrongKey,
    #[error("Key pair was never locked")]
    NeverLocked,
    #[error("Cipher failure")]
    Cipher,
    #[error("Invalid key bytes")]
    InvalidKeyBytes,
}
