use std::fmt::{Display, Error as FmtError, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    crypto::{
        Address, CryptoError, Hashable, KeyPair, PublicKey, Signature, ADDRESS_SIZE,
        PUBLIC_KEY_SIZE, SIGNATURE_SIZE,
    },
    serializer::{Reader, ReaderError, Serializer, Writer},
};

// sender (32) + recipient (20) + value (8) + fee (8) + nonce (4) + signature (64)
pub const TRANSACTION_SIZE: usize =
    PUBLIC_KEY_SIZE + ADDRESS_SIZE + 8 + 8 + 4 + SIGNATURE_SIZE;

/// Single-sender value transfer. The signature covers every field before it
/// in wire order.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    sender_pub_key: PublicKey,
    recipient: Address,
    value: u64,
    fee: u64,
    nonce: u32,
    signature: Signature,
}

impl Transaction {
    pub fn new(
        sender_pub_key: PublicKey,
        recipient: Address,
        value: u64,
        fee: u64,
        nonce: u32,
        signature: Signature,
    ) -> Self {
        Self {
            sender_pub_key,
            recipient,
            value,
            fee,
            nonce,
            signature,
        }
    }

    /// Build and sign a transfer in one step. Fails if the key pair is locked.
    pub fn new_signed(
        keypair: &KeyPair,
        recipient: Address,
        value: u64,
        fee: u64,
        nonce: u32,
    ) -> Result<Self, CryptoError> {
        let sender_pub_key = keypair.get_public_key().clone();
        let data = signature_data(&sender_pub_key, &recipient, value, fee, nonce);
        let signature = keypair.sign(&data)?;
        Ok(Self::new(sender_pub_key, recipient, value, fee, nonce, signature))
    }

    pub fn get_sender_pub_key(&self) -> &PublicKey {
        &self.sender_pub_key
    }

    // Pure derivation from the sender public key
    pub fn get_sender_address(&self) -> Address {
        self.sender_pub_key.to_address()
    }

    pub fn get_recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_fee(&self) -> u64 {
        self.fee
    }

    pub fn get_nonce(&self) -> u32 {
        self.nonce
    }

    pub fn get_signature(&self) -> &Signature {
        &self.signature
    }

    // The bytes the sender signed
    pub fn get_signature_data(&self) -> Vec<u8> {
        signature_data(
            &self.sender_pub_key,
            &self.recipient,
            self.value,
            self.fee,
            self.nonce,
        )
    }

    pub fn verify_signature(&self) -> bool {
        self.sender_pub_key
            .verify(&self.get_signature_data(), &self.signature)
    }
}

fn signature_data(
    sender_pub_key: &PublicKey,
    recipient: &Address,
    value: u64,
    fee: u64,
    nonce: u32,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(TRANSACTION_SIZE - SIGNATURE_SIZE);
    let mut writer = Writer::new(&mut bytes);
    sender_pub_key.write(&mut writer);
    recipient.write(&mut writer);
    writer.write_u64(&value);
    writer.write_u64(&fee);
    writer.write_u32(&nonce);
    bytes
}

impl Serializer for Transaction {
    fn write(&self, writer: &mut Writer) {
        self.sender_pub_key.write(writer);
        self.recipient.write(writer);
        writer.write_u64(&self.value);
        writer.write_u64(&self.fee);
        writer.write_u32(&self.nonce);
        self.signature.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Transaction, ReaderError> {
        let sender_pub_key = PublicKey::read(reader)?;
        let recipient = Address::read(reader)?;
        let value = reader.read_u64()?;
        let fee = reader.read_u64()?;
        let nonce = reader.read_u32()?;
        let signature = Signature::read(reader)?;

        Ok(Transaction {
            sender_pub_key,
            recipient,
            value,
            fee,
            nonce,
            signature,
        })
    }

    fn size(&self) -> usize {
        TRANSACTION_SIZE
    }
}

impl Hashable for Transaction {}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "Transaction[sender: {}, recipient: {}, value: {}, fee: {}, nonce: {}]",
            self.get_sender_address(),
            self.recipient,
            self.value,
            self.fee,
            self.nonce
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(keypair: &KeyPair) -> Transaction {
        let recipient = Address::from_public_key(KeyPair::new().get_public_key());
        Transaction::new_signed(keypair, recipient, 1000, 10, 0).unwrap()
    }

    #[test]
    fn test_signed_transaction_verifies() {
        let keypair = KeyPair::new();
        let tx = transfer(&keypair);
        assert!(tx.verify_signature());
        assert_eq!(tx.get_sender_address(), keypair.get_address());
    }

    #[test]
    fn test_tampered_transaction_fails() {
        let keypair = KeyPair::new();
        let tx = transfer(&keypair);

        let tampered = Transaction::new(
            tx.get_sender_pub_key().clone(),
            tx.get_recipient().clone(),
            tx.get_value() + 1,
            tx.get_fee(),
            tx.get_nonce(),
            tx.get_signature().clone(),
        );
        assert!(!tampered.verify_signature());
    }

    #[test]
    fn test_foreign_signature_fails() {
        let keypair = KeyPair::new();
        let other = KeyPair::new();
        let tx = transfer(&keypair);

        let forged = Transaction::new(
            other.get_public_key().clone(),
            tx.get_recipient().clone(),
            tx.get_value(),
            tx.get_fee(),
            tx.get_nonce(),
            tx.get_signature().clone(),
        );
        assert!(!forged.verify_signature());
    }

    #[test]
    fn test_round_trip() {
        let keypair = KeyPair::new();
        let tx = transfer(&keypair);
        let bytes = tx.to_bytes();
        assert_eq!(bytes.len(), TRANSACTION_SIZE);
        assert_eq!(bytes.len(), tx.size());

        let decoded = Transaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.verify_signature());
    }

    #[test]
    fn test_locked_keypair_cannot_sign() {
        let mut keypair = KeyPair::new();
        keypair.lock(b"secret").unwrap();
        let recipient = Address::zero();
        assert!(Transaction::new_signed(&keypair, recipient, 1, 1, 0).is_err());
    }
}
