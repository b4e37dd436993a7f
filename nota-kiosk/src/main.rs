use anyhow::Context;
use chrono::Local;
use nota_kiosk::{LineItem, Receipt, ReceiptPrinter, setup_environment};
use nota_printer::{CancellationToken, NetworkPrintService, NetworkPrinter, Printer, PrinterInfo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, config, logging)
    let config = setup_environment();
    tracing::info!(printer_id = %config.printer_id, addr = %config.printer_addr, "nota-kiosk starting");

    // 2. Printer behind the print service
    let printer = NetworkPrinter::from_addr(&config.printer_addr)
        .with_context(|| format!("invalid PRINTER_ADDR {}", config.printer_addr))?;
    if !printer.is_online().await {
        tracing::warn!("Printer not reachable yet, submission will retry");
    }
    let mut service = NetworkPrintService::new();
    service.register(
        PrinterInfo::new(config.printer_addr.clone(), config.printer_id.clone()),
        printer,
    );

    // 3. Pipeline
    let receipt_printer = ReceiptPrinter::from_config(&config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling print job");
            on_signal.cancel();
        }
    });

    // 4. Sample receipt
    let receipt = Receipt::builder()
        .header_line("TOKO BUNGA ARDI")
        .header_line("Jl. Melati No. 7")
        .order_id("123")
        .issued_at(Local::now().naive_local())
        .detail("Pemesan", "Budi")
        .detail("Penerima", "Sari")
        .detail("Bayar", "Tunai")
        .item(LineItem::new("Bucket Roses", 1, 50000)?)
        .item(LineItem::new("Lily White", 2, 35000)?)
        .currency_symbol(config.currency_symbol.clone())
        .notes("Selamat ulang tahun!")
        .footer_line("Terima kasih")
        .build();

    let report = receipt_printer
        .print(&receipt, &config.printer_id, &service, &cancel)
        .await?;

    tracing::info!(
        status = ?report.job.status,
        attempts = report.job.attempts,
        retries = report.job.retries(),
        elapsed = ?report.job.elapsed,
        substitutions = report.substitutions.len(),
        "Print finished"
    );

    if !report.job.is_submitted() {
        anyhow::bail!(
            "receipt not printed: {}",
            report.job.error_detail().unwrap_or_default()
        );
    }
    Ok(())
}
