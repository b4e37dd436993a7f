//! End-to-end receipt printing against a scripted print service

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use nota_kiosk::{Config, LineItem, Receipt, ReceiptPrinter};
use nota_printer::{
    CancellationToken, CodePage, JobOutcome, JobStatus, PrintService, PrinterInfo, SubmissionError,
};

/// Replays a script of outcomes and keeps every job it accepted
struct ScriptedService {
    script: Mutex<VecDeque<JobOutcome>>,
    received: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedService {
    fn new(script: Vec<JobOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    fn received(&self) -> Vec<(String, Vec<u8>)> {
        self.received.lock().unwrap().clone()
    }
}

impl PrintService for ScriptedService {
    async fn list_printers(&self) -> Vec<PrinterInfo> {
        vec![
            PrinterInfo::new("usb-001", "POS58 Printer"),
            PrinterInfo::new("usb-002", "Kitchen"),
        ]
    }

    async fn submit_raw_job(&self, printer_id: &str, data: &[u8]) -> JobOutcome {
        self.received
            .lock()
            .unwrap()
            .push((printer_id.to_string(), data.to_vec()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(JobOutcome::Success)
    }
}

fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

fn florist_receipt() -> Receipt {
    Receipt::builder()
        .header_line("TOKO BUNGA ARDI")
        .item(LineItem::new("Bucket Roses", 1, 50000).unwrap())
        .item(LineItem::new("Lily White", 2, 35000).unwrap())
        .footer_line("Terima kasih")
        .build()
}

fn busy() -> JobOutcome {
    JobOutcome::TransientFailure("device busy".to_string())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test(start_paused = true)]
async fn test_escpos_receipt_survives_busy_device() {
    let service = ScriptedService::new(vec![busy(), busy()]);
    let printer = ReceiptPrinter::from_config(&config(&[])).unwrap();

    let report = printer
        .print(
            &florist_receipt(),
            "pos58 printer",
            &service,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.job.status, JobStatus::Submitted);
    assert_eq!(report.job.attempts, 3);
    assert_eq!(report.job.retries(), 2);
    assert_eq!(report.job.printer_id.as_deref(), Some("usb-001"));

    let received = service.received();
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|(id, bytes)| id == "usb-001" && bytes == &received[0].1));

    let bytes = &received[0].1;
    // ESC @, then ESC t 0 for CP437
    assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x00]);
    assert!(contains(bytes, b"TOKO BUNGA ARDI"));
    assert!(contains(bytes, b"Rp120k"));
    // Feed and cut once, at the end
    assert!(bytes.ends_with(&[0x1D, 0x56, 0x42, 0x03]));
    assert_eq!(
        bytes.windows(3).filter(|w| *w == [0x1D, 0x56, 0x42]).count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhausted() {
    let service = ScriptedService::new(vec![busy(), busy(), busy(), busy()]);
    let printer = ReceiptPrinter::from_config(&config(&[("MAX_RETRIES", "2")])).unwrap();

    let report = printer
        .print(&florist_receipt(), "usb-001", &service, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.job.status, JobStatus::RetriedThenFailed);
    assert_eq!(report.job.attempts, 3);
    assert_eq!(
        report.job.error,
        Some(SubmissionError::DeviceBusy("device busy".to_string()))
    );
    assert!(report.job.error_detail().is_some());
}

#[tokio::test]
async fn test_rejected_job_is_not_retried() {
    let service = ScriptedService::new(vec![JobOutcome::PermanentFailure("paper out".into())]);
    let printer = ReceiptPrinter::from_config(&config(&[])).unwrap();

    let report = printer
        .print(&florist_receipt(), "KITCHEN", &service, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.job.status, JobStatus::Failed);
    assert_eq!(report.job.attempts, 1);
    assert_eq!(service.received().len(), 1);
    assert_eq!(service.received()[0].0, "usb-002");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let service = ScriptedService::new(vec![busy(), busy()]);
    let printer =
        ReceiptPrinter::from_config(&config(&[("RETRY_BACKOFF_MS", "1000")])).unwrap();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let report = printer
        .print(&florist_receipt(), "usb-001", &service, &cancel)
        .await
        .unwrap();

    assert_eq!(report.job.status, JobStatus::Failed);
    assert_eq!(report.job.attempts, 1);
    assert_eq!(report.job.error, Some(SubmissionError::Cancelled));
}

#[tokio::test]
async fn test_plain_text_on_80mm_gbk() {
    let service = ScriptedService::new(vec![]);
    let printer = ReceiptPrinter::from_config(&config(&[
        ("PAPER_COLUMNS", "48"),
        ("CODE_PAGE", "gbk"),
        ("PRINT_PROTOCOL", "plain_text"),
        ("PRICE_FORMAT", "grouped"),
    ]))
    .unwrap();

    let receipt = Receipt::builder()
        .header_line("花店")
        .item(LineItem::new("红玫瑰", 1, 50000).unwrap())
        .footer_line("谢谢")
        .build();
    let report = printer
        .print(&receipt, "usb-001", &service, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.job.is_submitted());
    assert!(report.substitutions.is_empty());

    let text = CodePage::Gbk.decode(&service.received()[0].1).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // "花店" is 4 columns wide: (48 - 4) / 2 = 22
    assert_eq!(lines[0], format!("{}花店", " ".repeat(22)));
    assert!(lines.iter().any(|l| l.ends_with("Rp 50.000")));
    assert!(text.ends_with("谢谢\n\n\n\n"));
}
