//! Terminal walkthrough of the Moose transaction pipeline.
//!
//! Derives keys from secrets, builds one transaction of every kind, second
//! signs a song registration, collects multisignature cosignatures and
//! verifies everything along the way.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use moose_protocol::transaction::{
    format_amount, DelegateOptions, MultisignatureOptions, SerializeMode, SigningEngine,
    SongOptions, SongTransferOptions, SubmissionRequest, Transaction, TransactionBuilder,
    TransactionOptions, TransferOptions, VoteOptions,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    MOOSE PROTOCOL  --  Offline Signing Walkthrough       {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]========================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn summarize(engine: &SigningEngine, tx: &Transaction) {
    let len = engine.bytes(tx, SerializeMode::Full).len();
    println!(
        "  {BOLD}{:<16}{RESET} id {YELLOW}{:<20}{RESET} fee {:>14} MOOSE  {DIM}{len} bytes{RESET}",
        tx.tx_type().to_string(),
        tx.id.to_string(),
        format_amount(tx.body.fee),
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let start = Instant::now();
    banner();

    let engine = SigningEngine::new();

    section(1, "Keys from secrets");
    let keys = engine.derive_keypair("123");
    let address = engine.derive_address(&keys.public_key());
    info("public key", &keys.public_key().to_hex());
    info("address", &address.to_string());
    assert_eq!(address.to_string(), "12475940823804898745M");
    success("secret \"123\" derives the well-known test account");

    section(2, "One transaction of every kind");
    let builder = TransactionBuilder::new(&engine);
    let delegate = engine.derive_keypair("delegate").public_key();
    let cosigner = engine.derive_keypair("cosigner");

    let kinds = vec![
        TransactionOptions::Transfer(TransferOptions {
            recipient_id: Some("58191285901858109M".to_string()),
            amount: Some(1000),
        }),
        TransactionOptions::SecondSignature,
        TransactionOptions::Delegate(DelegateOptions {
            username: Some("moose_delegate".to_string()),
        }),
        TransactionOptions::Vote(VoteOptions {
            votes: Some(vec![format!("+{}", delegate)]),
        }),
        TransactionOptions::Multisignature(MultisignatureOptions {
            keysgroup: Some(vec![cosigner.public_key().to_hex()]),
            min: Some(1),
            lifetime: Some(24),
        }),
        TransactionOptions::Song(SongOptions {
            title: Some("Moose the song".to_string()),
            artist: Some("the MooseCoin trio".to_string()),
            fingerprint: Some("abc".to_string()),
            song_type: Some(0),
            genre: Some(2),
            ..SongOptions::default()
        }),
        TransactionOptions::SongTransfer(SongTransferOptions {
            song_id: Some("1234213".to_string()),
        }),
    ];

    let mut built = Vec::new();
    for options in &kinds {
        match builder.build("secret", Some("secret 2"), options) {
            Ok(tx) => {
                assert!(engine.verify(&tx));
                summarize(&engine, &tx);
                built.push(tx);
            }
            Err(e) => println!("  {BOLD}{}{RESET} failed: {e}", options.kind()),
        }
    }
    success("every record verifies against its sender");

    section(3, "Second signatures");
    let second = engine.derive_keypair("secret 2").public_key();
    let song = &built[5];
    assert!(engine.verify_second_signature(song, &second));
    success("song registration carries a valid second signature");

    let mut tampered = song.clone();
    tampered.body.amount = 10_000;
    assert!(!engine.verify(&tampered));
    success("changing the amount invalidates the record");

    section(4, "Multisignature cosigning");
    let transfer = &built[0];
    let cosignature = engine.multi_sign(transfer, &cosigner);
    assert!(engine.verify_multisignature(transfer, &cosigner.public_key(), &cosignature));
    let request = SubmissionRequest::signature(transfer.id, &cosigner.public_key(), &cosignature);
    info("request", &format!("POST /api/{}", request.path));
    success("cosignature verifies and is ready to submit");

    section(5, "Submission");
    match SubmissionRequest::transaction(transfer) {
        Ok(request) => match serde_json::to_string_pretty(&request.body) {
            Ok(json) => println!("{DIM}{json}{RESET}"),
            Err(e) => println!("  could not render request: {e}"),
        },
        Err(e) => println!("  could not build request: {e}"),
    }

    println!();
    println!(
        "{DIM}  finished in {:.2} ms{RESET}",
        start.elapsed().as_secs_f64() * 1000.0
    );
}
