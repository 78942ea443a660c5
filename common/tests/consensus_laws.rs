use basalt_common::{
    block::{Block, BlockBody, BlockHeader, BlockInterlink},
    config::{GENESIS_ACCOUNTS_HASH, GENESIS_N_BITS},
    crypto::{Address, Hash, Hashable, KeyPair},
    difficulty::compact_to_target,
    network::NetAddress,
    serializer::Serializer,
    transaction::Transaction,
};

// Mine a minimal valid child of `parent`
fn build_child(parent: &Block, txs: Vec<Transaction>) -> Block {
    let body = BlockBody::new(Address::new([7u8; 20]), txs);
    let next_target = compact_to_target(GENESIS_N_BITS).unwrap();
    let interlink = parent.next_interlink(&next_target);
    let mut header = BlockHeader::new(
        parent.hash(),
        interlink.hash(),
        body.hash(),
        GENESIS_ACCOUNTS_HASH,
        GENESIS_N_BITS,
        parent.get_header().height + 1,
        parent.get_header().timestamp + 60,
        0,
    );
    while !header.verify_proof_of_work() {
        header.nonce += 1;
    }
    Block::new(header, interlink, body)
}

fn signed_tx(nonce: u32) -> Transaction {
    let recipient = Address::from_public_key(KeyPair::new().get_public_key());
    Transaction::new_signed(&KeyPair::new(), recipient, 1000, 10, nonce).unwrap()
}

fn assert_round_trip<T: Serializer + PartialEq + std::fmt::Debug>(record: &T) {
    let bytes = record.to_bytes();
    assert_eq!(bytes.len(), record.size(), "size() must match the wire length");
    let decoded = T::from_bytes(&bytes).expect("canonical bytes must parse");
    assert_eq!(&decoded, record);
}

#[test]
fn round_trip_laws() {
    let block = build_child(Block::genesis(), vec![signed_tx(0), signed_tx(1)]);

    assert_round_trip(block.get_header());
    assert_round_trip(block.get_interlink());
    assert_round_trip(block.get_body());
    assert_round_trip(&block.get_body().get_transactions()[0]);
    assert_round_trip(&block);
    assert_round_trip(Block::genesis());
    assert_round_trip(&NetAddress::new(
        1,
        0x0102030405060708,
        "example.com".into(),
        8443,
        42,
    ));
}

#[test]
fn genesis_hash_is_stable() {
    let genesis = Block::genesis();
    assert!(genesis.verify());
    assert_eq!(genesis.hash(), *Block::genesis_hash());

    // the bound constant survives a serialization round trip
    let reparsed = Block::from_bytes(&genesis.to_bytes()).unwrap();
    assert_eq!(reparsed.hash(), *Block::genesis_hash());

    // and has a printable identity in both encodings
    assert_eq!(Block::genesis_hash().to_hex().len(), 64);
    assert_eq!(Block::genesis_hash().to_base64().len(), 44);
    assert_eq!(
        Hash::from_base64(&Block::genesis_hash().to_base64()).unwrap(),
        *Block::genesis_hash()
    );
}

#[test]
fn minimal_child_of_genesis_succeeds() {
    let genesis = Block::genesis();
    let child = build_child(genesis, Vec::new());

    assert_eq!(child.get_header().height, 2);
    assert!(child.get_header().timestamp >= genesis.get_header().timestamp);
    assert_eq!(child.get_header().prev_hash, genesis.hash());
    assert!(child.verify());
    assert!(child.is_successor_of(genesis));

    // and the parent does not succeed the child
    assert!(!genesis.is_successor_of(&child));
}

#[test]
fn bit_flips_break_validation() {
    let block = build_child(Block::genesis(), vec![signed_tx(0)]);
    assert!(block.verify());

    let bytes = block.to_bytes();

    // the interlink-hash and body-hash commitments in the header, then the
    // complete interlink and body regions; a flip anywhere in there must
    // surface as a parse error or a failed verification
    let ranges = [32..96, 144..bytes.len()];
    for range in ranges {
        for i in range {
            let mut corrupted = bytes.clone();
            corrupted[i] ^= 0x01;
            match Block::from_bytes(&corrupted) {
                Err(_) => {}
                Ok(parsed) => assert!(
                    !parsed.verify(),
                    "bit flip at byte {} went undetected",
                    i
                ),
            }
        }
    }
}

#[test]
fn duplicate_sender_fails_replacement_passes() {
    let keypair = KeyPair::new();
    let recipient = Address::from_public_key(KeyPair::new().get_public_key());
    let tx1 = Transaction::new_signed(&keypair, recipient.clone(), 100, 1, 0).unwrap();
    let tx2 = Transaction::new_signed(&keypair, recipient.clone(), 200, 1, 1).unwrap();

    let duplicate = build_child(Block::genesis(), vec![tx1.clone(), tx2]);
    assert!(!duplicate.verify());

    let replacement = Transaction::new_signed(&KeyPair::new(), recipient, 200, 1, 1).unwrap();
    let distinct = build_child(Block::genesis(), vec![tx1, replacement]);
    assert!(distinct.verify());
}

#[test]
fn keypair_lock_scenario() {
    let mut keypair = KeyPair::new();
    let original = keypair.get_private_key().unwrap().as_bytes().to_vec();

    keypair.lock(&[1, 2, 3, 4]).unwrap();
    assert!(keypair.unlock(&[1, 2, 3, 3]).is_err());
    assert!(keypair.is_locked());

    keypair.unlock(&[1, 2, 3, 4]).unwrap();
    assert_eq!(
        keypair.get_private_key().unwrap().as_bytes().as_slice(),
        original.as_slice()
    );

    // round trip preserves public key, private key and lock state
    let bytes = keypair.to_bytes();
    let decoded = KeyPair::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.get_public_key(), keypair.get_public_key());
    assert!(!decoded.is_locked());
    assert_eq!(
        decoded.get_private_key().unwrap().as_bytes().as_slice(),
        original.as_slice()
    );
}
