use std::fmt;

use chacha20poly1305::{aead::Aead, KeyInit, XChaCha20Poly1305, XNonce};
use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{hash, Address, CryptoError};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SIGNATURE_SIZE: usize = 64;

// Plaintext nonce prepended to the encrypted private key
const NONCE_SIZE: usize = 24;

/// Ed25519 signing key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; PRIVATE_KEY_SIZE]);

impl PrivateKey {
    pub fn new(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Serializer for PrivateKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let bytes = reader.read_bytes(PRIVATE_KEY_SIZE)?;
        Ok(Self(bytes))
    }

    fn size(&self) -> usize {
        PRIVATE_KEY_SIZE
    }
}

/// Ed25519 verifying key in compressed form.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub const fn new(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }

    // Verify an Ed25519 signature over `data`.
    // An off-curve public key cannot sign anything, so it verifies nothing.
    pub fn verify(&self, data: &[u8], signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let signature = DalekSignature::from_bytes(signature.as_bytes());
        key.verify(data, &signature).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serializer for PublicKey {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let bytes = reader.read_bytes(PUBLIC_KEY_SIZE)?;
        Ok(Self(bytes))
    }

    fn size(&self) -> usize {
        PUBLIC_KEY_SIZE
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        let bytes = hex::decode(hex).map_err(serde::de::Error::custom)?;
        let bytes: [u8; PUBLIC_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid public key length"))?;
        Ok(Self(bytes))
    }
}

/// Detached Ed25519 signature.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serializer for Signature {
    fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.0);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let bytes = reader.read_bytes(SIGNATURE_SIZE)?;
        Ok(Self(bytes))
    }

    fn size(&self) -> usize {
        SIGNATURE_SIZE
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        let bytes = hex::decode(hex).map_err(serde::de::Error::custom)?;
        let bytes: [u8; SIGNATURE_SIZE] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid signature length"))?;
        Ok(Self(bytes))
    }
}

/// Signing identity with an encrypt-at-rest lifecycle.
///
/// A pair starts unlocked. `lock` encrypts the private key under a caller
/// secret and drops the cleartext; `unlock` restores it; `relock` re-applies
/// the last lock without needing the secret again. While locked, every
/// operation that touches the private key fails with [`CryptoError::Locked`].
#[derive(Clone, Debug)]
pub struct KeyPair {
    public_key: PublicKey,
    // present iff the pair is unlocked
    private_key: Option<PrivateKey>,
    // nonce || AEAD ciphertext of the private key, kept across unlock so
    // relock() does not need the secret again
    ciphertext: Option<Vec<u8>>,
    locked: bool,
}

impl KeyPair {
    pub fn new() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        let public_key = PublicKey::new(signing.verifying_key().to_bytes());
        Self {
            public_key,
            private_key: Some(PrivateKey::new(signing.to_bytes())),
            ciphertext: None,
            locked: false,
        }
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let signing = SigningKey::from_bytes(private_key.as_bytes());
        Self {
            public_key: PublicKey::new(signing.verifying_key().to_bytes()),
            private_key: Some(private_key),
            ciphertext: None,
            locked: false,
        }
    }

    pub fn get_public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn get_address(&self) -> Address {
        self.public_key.to_address()
    }

    pub fn get_private_key(&self) -> Result<&PrivateKey, CryptoError> {
        if self.locked {
            return Err(CryptoError::Locked);
        }
        self.private_key.as_ref().ok_or(CryptoError::Locked)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn sign(&self, data: &[u8]) -> Result<Signature, CryptoError> {
        let private = self.get_private_key()?;
        let signing = SigningKey::from_bytes(private.as_bytes());
        Ok(Signature::new(signing.sign(data).to_bytes()))
    }

    // Encrypt the private key under `secret` and drop the cleartext
    pub fn lock(&mut self, secret: &[u8]) -> Result<(), CryptoError> {
        if self.locked {
            return Err(CryptoError::AlreadyLocked);
        }
        let private = self.private_key.as_ref().ok_or(CryptoError::Cipher)?;

        let cipher = cipher_from_secret(secret)?;
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        let data = cipher
            .encrypt((&nonce).into(), private.as_bytes().as_slice())
            .map_err(|_| CryptoError::Cipher)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + data.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&data);

        self.ciphertext = Some(blob);
        self.private_key = None;
        self.locked = true;
        Ok(())
    }

    // Restore the cleartext private key. On a wrong secret the pair stays
    // locked and the ciphertext is untouched.
    pub fn unlock(&mut self, secret: &[u8]) -> Result<(), CryptoError> {
        if !self.locked {
            return Err(CryptoError::NotLocked);
        }
        let blob = self.ciphertext.as_ref().ok_or(CryptoError::Cipher)?;
        if blob.len() <= NONCE_SIZE {
            return Err(CryptoError::Cipher);
        }

        let cipher = cipher_from_secret(secret)?;
        let nonce = XNonce::try_from(&blob[..NONCE_SIZE]).map_err(|_| CryptoError::Cipher)?;
        let decrypted = cipher
            .decrypt(&nonce, &blob[NONCE_SIZE..])
            .map_err(|_| CryptoError::WrongKey)?;

        let bytes: [u8; PRIVATE_KEY_SIZE] = decrypted
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyBytes)?;
        self.private_key = Some(PrivateKey::new(bytes));
        self.locked = false;
        Ok(())
    }

    // Re-apply the last lock without the secret: the ciphertext from the
    // previous lock() is still valid, only the cleartext must go
    pub fn relock(&mut self) -> Result<(), CryptoError> {
        if self.locked {
            return Err(CryptoError::AlreadyLocked);
        }
        if self.ciphertext.is_none() {
            return Err(CryptoError::NeverLocked);
        }
        self.private_key = None;
        self.locked = true;
        Ok(())
    }
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}

fn cipher_from_secret(secret: &[u8]) -> Result<XChaCha20Poly1305, CryptoError> {
    // stretch the caller secret to a 32-byte cipher key
    let key = hash(secret);
    XChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::Cipher)
}

impl Serializer for KeyPair {
    fn write(&self, writer: &mut Writer) {
        self.public_key.write(writer);
        writer.write_u8(self.locked as u8);
        if self.locked {
            let blob = self.ciphertext.as_ref().expect("locked pair has ciphertext");
            writer.write_u16(blob.len() as u16);
            writer.write_bytes(blob);
        } else {
            let private = self.private_key.as_ref().expect("unlocked pair has private key");
            private.write(writer);
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let public_key = PublicKey::read(reader)?;
        let locked = match reader.read_u8()? {
            0 => false,
            1 => true,
            _ => return Err(ReaderError::InvalidValue),
        };

        if locked {
            let len = reader.read_u16()? as usize;
            if len <= NONCE_SIZE {
                return Err(ReaderError::InvalidValue);
            }
            let blob = reader.read_bytes_ref(len)?.to_vec();
            Ok(Self {
                public_key,
                private_key: None,
                ciphertext: Some(blob),
                locked: true,
            })
        } else {
            let private_key = PrivateKey::read(reader)?;
            // the stored public key must belong to the private key
            let signing = SigningKey::from_bytes(private_key.as_bytes());
            if signing.verifying_key().to_bytes() != *public_key.as_bytes() {
                return Err(ReaderError::InvalidValue);
            }
            Ok(Self {
                public_key,
                private_key: Some(private_key),
                ciphertext: None,
                locked: false,
            })
        }
    }

    fn size(&self) -> usize {
        let secret = if self.locked {
            2 + self.ciphertext.as_ref().map(|b| b.len()).unwrap_or(0)
        } else {
            PRIVATE_KEY_SIZE
        };
        PUBLIC_KEY_SIZE + 1 + secret
    }
}
