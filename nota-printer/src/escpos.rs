//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::CodePage;
use crate::error::EncodingResult;

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers. Text is encoded into
/// the builder's code page as it is written; characters the code page cannot
/// render are substituted and remembered (see [`EscPosBuilder::substituted`]).
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    code_page: CodePage,
    substituted: Vec<char>,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Fails if the code page has no mapping, before any byte is produced.
    pub fn new(width: usize, code_page: CodePage) -> EncodingResult<Self> {
        code_page.ensure_supported()?;

        let mut builder = Self {
            buf: Vec::with_capacity(4096),
            width,
            code_page,
            substituted: Vec::new(),
        };
        builder.reset();
        Ok(builder)
    }

    /// Get the configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn code_page(&self) -> CodePage {
        self.code_page
    }

    /// Characters replaced so far because the code page cannot render them
    pub fn substituted(&self) -> &[char] {
        &self.substituted
    }

    // === Text Output ===

    /// Write text in the builder's code page
    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = self.code_page.encode_supported(s);
        self.buf.extend_from_slice(&encoded.bytes);
        self.substituted.extend(encoded.substituted);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write multiple empty lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n - Print and feed n lines
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    /// Align text to right
    pub fn right(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x02]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Separators ===

    /// Print a full-width line of one character
    pub fn sep(&mut self, c: char) -> &mut Self {
        self.line(&c.to_string().repeat(self.width))
    }

    // === Paper Control ===

    /// Feed n lines, then full cut
    ///
    /// Uses GS V 66 n, which lets the printer manage cutter-to-head distance.
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        // GS V 66 n - Full cut after feeding n lines
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, lines]);
        self
    }

    // === Cash Drawer ===

    /// Open cash drawer (pin 2)
    pub fn open_drawer(&mut self) -> &mut Self {
        // ESC p m t1 t2 - Generate pulse on pin m
        self.buf.extend_from_slice(&[0x1B, 0x70, 0x00, 25, 250]);
        self
    }

    /// Reset printer to default state and reselect the code page
    pub fn reset(&mut self) -> &mut Self {
        // ESC @ - Initialize
        self.buf.extend_from_slice(&[0x1B, 0x40]);
        match self.code_page {
            // FS & - Enable Chinese mode, FS C 1 - Select GBK
            CodePage::Gbk => self.buf.extend_from_slice(&[0x1C, 0x26, 0x1C, 0x43, 0x01]),
            page => {
                if let Some(table) = page.escpos_table() {
                    // ESC t n - Select character code table
                    self.buf.extend_from_slice(&[0x1B, 0x74, table]);
                }
            }
        }
        self
    }

    // === Build ===

    /// Build the final byte buffer
    pub fn build(mut self) -> Vec<u8> {
        if self.code_page == CodePage::Gbk {
            // FS . - Exit Chinese mode
            self.buf.extend_from_slice(&[0x1C, 0x2E]);
        }
        self.buf
    }
}
