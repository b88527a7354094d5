use std::io::Write;
use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

use giftpay::{
    AppConfig, CardSource, CsvCardSource, PaymentOrchestrator, Portal, PromptCardSource,
    SandboxPortal, StopReason,
};

fn config(amount_per_card: Decimal, target_payment: Option<Decimal>, headless: bool) -> AppConfig {
    AppConfig {
        portal_url: "https://portal.example.edu/finances".into(),
        amount_per_card,
        zip_code: "94720".into(),
        username: "student".into(),
        password: "hunter2".into(),
        cards_csv: None::<PathBuf>,
        headless,
        target_payment,
    }
}

fn cards_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn csv_batch_run_nets_out_the_fee_and_exhausts_the_batch() {
    let file = cards_file(
        "number,expMonth,expYear,cvv\n\
         4111111111111111,3,23,123\n\
         4222222222222222,12,27,456\n\
         4333333333333333,07,24,789\n",
    );
    let config = config(dec!(200), None, true);
    let mut cards = CsvCardSource::load(file.path(), &config.zip_code).unwrap();
    assert_eq!(cards.len(), 3);

    let portal = SandboxPortal::new(dec!(10000), dec!(2.85));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let report = orchestrator.run(&mut cards).await.unwrap();

    // 200 / 1.0285 = 194.46 per card, three cards in file order
    assert_eq!(report.stop, StopReason::OutOfCards);
    assert_eq!(report.payments_made, 3);
    assert_eq!(report.amount_paid, dec!(583.38));
    assert_eq!(report.final_balance, dec!(9416.62));

    let session = orchestrator.into_session();
    assert_eq!(session.payments(), &[dec!(194.46), dec!(194.46), dec!(194.46)]);
    assert!(session.is_closed());
}

#[tokio::test]
async fn run_stops_once_the_balance_is_paid_in_full() {
    let file = cards_file(
        "number,expiration,cvv\n\
         4111111111111111,03/23,123\n\
         4222222222222222,3/24,456\n\
         4333333333333333,0424,789\n\
         4444444444444444,12/27,012\n",
    );
    let config = config(dec!(200), None, true);
    let mut cards = CsvCardSource::load(file.path(), &config.zip_code).unwrap();

    let portal = SandboxPortal::new(dec!(400), dec!(0));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let report = orchestrator.run(&mut cards).await.unwrap();

    assert_eq!(report.stop, StopReason::PaidInFull);
    assert_eq!(report.payments_made, 2);
    assert_eq!(report.final_balance, dec!(0));
    // the remaining two cards were never touched
    assert!(cards.next_card().await.unwrap().is_some());
}

#[tokio::test]
async fn target_payment_stops_the_run_before_overshooting() {
    let file = cards_file(
        "number,expMonth,expYear,cvv\n\
         4111111111111111,12,27,123\n\
         4222222222222222,12,27,456\n\
         4333333333333333,12,27,789\n\
         4444444444444444,12,27,012\n\
         4555555555555555,12,27,345\n",
    );
    let config = config(dec!(200), Some(dec!(500)), true);
    let mut cards = CsvCardSource::load(file.path(), &config.zip_code).unwrap();

    let portal = SandboxPortal::new(dec!(10000), dec!(0));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let report = orchestrator.run(&mut cards).await.unwrap();

    // two 200 payments land at 400 paid; a third would pass the 500 target
    assert_eq!(report.stop, StopReason::TargetWouldBeExceeded);
    assert_eq!(report.payments_made, 2);
    assert_eq!(report.amount_paid, dec!(400));
}

#[tokio::test]
async fn manual_entry_drives_the_same_loop() {
    let script: &[u8] = b"4111111111111111\n12/27\n123\n\
                          4222222222222222\n0324\n456\n\
                          done\n";
    let config = config(dec!(150), None, true);
    let mut cards = PromptCardSource::new(script, config.zip_code.clone());

    let portal = SandboxPortal::new(dec!(5000), dec!(0));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let report = orchestrator.run(&mut cards).await.unwrap();

    assert_eq!(report.stop, StopReason::OutOfCards);
    assert_eq!(report.payments_made, 2);
    assert_eq!(report.final_balance, dec!(4700));
}

#[tokio::test]
async fn non_headless_run_keeps_the_session_open() {
    let file = cards_file("number,expMonth,expYear,cvv\n4111111111111111,12,27,123\n");
    let config = config(dec!(200), None, false);
    let mut cards = CsvCardSource::load(file.path(), &config.zip_code).unwrap();

    let portal = SandboxPortal::new(dec!(10000), dec!(2.85));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    orchestrator.run(&mut cards).await.unwrap();

    assert!(!orchestrator.into_session().is_closed());
}

#[tokio::test]
async fn a_fee_quirk_aborts_the_run_after_one_attempt() {
    let file = cards_file(
        "number,expMonth,expYear,cvv\n\
         4111111111111111,12,27,123\n\
         4222222222222222,12,27,456\n",
    );
    let config = config(dec!(200), None, true);
    let mut cards = CsvCardSource::load(file.path(), &config.zip_code).unwrap();

    let portal = SandboxPortal::new(dec!(10000), dec!(2.85)).with_applied_fee_percent(dec!(3.5));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let err = orchestrator.run(&mut cards).await.unwrap_err();

    assert_eq!(err.category(), giftpay::ErrorCategory::Session);
    let session = orchestrator.into_session();
    assert!(session.payments().is_empty(), "nothing was charged");
    assert!(!session.is_closed(), "no cleanup on a failed financial action");
}

#[tokio::test]
async fn unreadable_batch_falls_back_to_manual_entry() {
    // The branch main takes: a recoverable load failure swaps the card
    // source, the orchestrator run itself is untouched.
    let config = config(dec!(100), None, true);
    let load = CsvCardSource::load(std::path::Path::new("no-such-batch.csv"), &config.zip_code);

    let err = load.unwrap_err();
    assert!(err.is_recoverable_load());

    let script: &[u8] = b"4111111111111111\n12/27\n123\ndone\n";
    let mut cards = PromptCardSource::new(script, config.zip_code.clone());

    let portal = SandboxPortal::new(dec!(1000), dec!(0));
    let session = portal.authenticate(&config.credentials()).await.unwrap();
    let mut orchestrator = PaymentOrchestrator::new(session, &config);

    let report = orchestrator.run(&mut cards).await.unwrap();
    assert_eq!(report.payments_made, 1);
    assert_eq!(report.final_balance, dec!(900));
}
