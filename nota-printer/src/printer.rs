//! Printer adapters and the print-service contract
//!
//! - [`Printer`]: one physical device that accepts raw bytes
//! - [`PrintService`]: the collaborator the job submitter talks to; it
//!   enumerates printers and runs raw jobs to completion
//! - [`NetworkPrinter`] / [`NetworkPrintService`]: raw TCP (port 9100)

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// A printer as enumerated by a print service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub id: String,
    pub display_name: String,
}

impl PrinterInfo {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Completion signal of one raw job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Retry may succeed (device busy, unreachable)
    TransientFailure(String),
    /// Retry cannot succeed (unknown device, malformed job)
    PermanentFailure(String),
}

/// Platform print service
///
/// Implementations must run at most one job per physical device at a time
/// (or queue internally): the job submitter holds no lock of its own, so
/// concurrent submissions to the same printer rely on this.
#[allow(async_fn_in_trait)]
pub trait PrintService {
    /// Printers currently available
    async fn list_printers(&self) -> Vec<PrinterInfo>;

    /// Run one raw job and resolve when it completed or failed
    async fn submit_raw_job(&self, printer_id: &str, data: &[u8]) -> JobOutcome;
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        info!("Connected, sending {} bytes", data.len());

        tokio::time::timeout(self.timeout, stream.write_all(data))
            .await
            .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.addr)))?
            .map_err(|e| {
                PrintError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Write failed: {}", e),
                ))
            })?;

        stream.flush().await?;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

/// Print service over a fixed set of network printers
///
/// Jobs to the same printer are serialized with a per-device lock.
#[derive(Debug, Default)]
pub struct NetworkPrintService {
    printers: Vec<RegisteredPrinter>,
}

#[derive(Debug)]
struct RegisteredPrinter {
    info: PrinterInfo,
    printer: NetworkPrinter,
    busy: Mutex<()>,
}

impl NetworkPrintService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a printer under an id; a later registration with the same id
    /// replaces the earlier one
    pub fn register(&mut self, info: PrinterInfo, printer: NetworkPrinter) -> &mut Self {
        self.printers.retain(|p| p.info.id != info.id);
        self.printers.push(RegisteredPrinter {
            info,
            printer,
            busy: Mutex::new(()),
        });
        self
    }
}

impl PrintService for NetworkPrintService {
    async fn list_printers(&self) -> Vec<PrinterInfo> {
        self.printers.iter().map(|p| p.info.clone()).collect()
    }

    #[instrument(skip(self, data), fields(data_len = data.len()))]
    async fn submit_raw_job(&self, printer_id: &str, data: &[u8]) -> JobOutcome {
        let Some(registered) = self.printers.iter().find(|p| p.info.id == printer_id) else {
            return JobOutcome::PermanentFailure(format!("Unknown printer: {}", printer_id));
        };

        let _guard = registered.busy.lock().await;
        match registered.printer.print(data).await {
            Ok(()) => JobOutcome::Success,
            Err(e @ PrintError::InvalidConfig(_)) => JobOutcome::PermanentFailure(e.to_string()),
            Err(e) => JobOutcome::TransientFailure(e.to_string()),
        }
    }
}
