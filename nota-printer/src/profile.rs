//! Paper profile: character budget and code page of a printer

use serde::{Deserialize, Serialize};

use crate::encoding::CodePage;
use crate::error::{PrintError, PrintResult};

/// Paper width in characters and the character table the printer uses
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProfileFields")]
pub struct PaperProfile {
    columns: usize,
    encoding: CodePage,
}

#[derive(Deserialize)]
struct ProfileFields {
    columns: usize,
    encoding: CodePage,
}

impl TryFrom<ProfileFields> for PaperProfile {
    type Error = PrintError;

    fn try_from(fields: ProfileFields) -> PrintResult<Self> {
        Self::new(fields.columns, fields.encoding)
    }
}

impl PaperProfile {
    pub fn new(columns: usize, encoding: CodePage) -> PrintResult<Self> {
        if columns == 0 {
            return Err(PrintError::InvalidConfig(
                "Paper columns must be greater than zero".to_string(),
            ));
        }
        Ok(Self { columns, encoding })
    }

    /// 58mm roll, 32 columns, CP437
    pub fn mm58() -> Self {
        Self {
            columns: 32,
            encoding: CodePage::Cp437,
        }
    }

    /// 80mm roll, 48 columns, CP437
    pub fn mm80() -> Self {
        Self {
            columns: 48,
            encoding: CodePage::Cp437,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn encoding(&self) -> CodePage {
        self.encoding
    }

    /// Same paper, different code page
    pub fn with_encoding(mut self, encoding: CodePage) -> Self {
        self.encoding = encoding;
        self
    }
}

impl Default for PaperProfile {
    fn default() -> Self {
        Self::mm58()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_columns_rejected() {
        assert!(PaperProfile::new(0, CodePage::Ascii).is_err());
        assert_eq!(PaperProfile::new(42, CodePage::Gbk).unwrap().columns(), 42);
    }

    #[test]
    fn test_presets() {
        assert_eq!(PaperProfile::mm58().columns(), 32);
        assert_eq!(PaperProfile::mm80().columns(), 48);
        assert_eq!(
            PaperProfile::mm80().with_encoding(CodePage::Gbk).encoding(),
            CodePage::Gbk
        );
    }

    #[test]
    fn test_serde_labels() {
        let profile: PaperProfile =
            serde_json::from_str(r#"{"columns":32,"encoding":"utf8_fallback_ascii"}"#).unwrap();
        assert_eq!(profile.encoding(), CodePage::Utf8FallbackAscii);

        let zero = serde_json::from_str::<PaperProfile>(r#"{"columns":0,"encoding":"cp437"}"#);
        assert!(zero.is_err());
    }
}
