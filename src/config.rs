//! Configuration for symbolic sessions and circuit export.
//!
//! [`SessionConfig`] controls diagnostics volume, input naming and the optional
//! evaluation cross-check of a [`crate::SymbolicSession`]. [`ExportConfig`] selects the
//! AIGER encoding and which optional sections exported artifacts carry.

use bitflags::bitflags;

/// Encoding of exported AIGER files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AigerFormat {
    /// The textual `aag` format.
    #[default]
    Ascii,
    /// The binary `aig` format with delta-encoded AND gates.
    Binary,
}

bitflags! {
    /// Optional sections of exported artifacts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExportFlags: u32 {
        /// Emit AIGER input symbols (`i<n> <name>`) and DIMACS input comments
        const INPUT_SYMBOLS = 0x0001;
        /// Emit AIGER output symbols (`o<n> <name>`)
        const OUTPUT_SYMBOLS = 0x0002;
        /// Emit the AIGER comment section and the DIMACS header comment
        const HEADER_COMMENT = 0x0004;
    }
}

/// Configuration for AIGER and DIMACS export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// AIGER encoding (default: ASCII).
    pub aiger_format: AigerFormat,

    /// Optional sections (default: all).
    pub flags: ExportFlags,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            aiger_format: AigerFormat::Ascii,
            flags: ExportFlags::all(),
        }
    }
}

impl ExportConfig {
    /// Creates a new export configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration producing bare artifacts: no symbols, no comments.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            aiger_format: AigerFormat::Ascii,
            flags: ExportFlags::empty(),
        }
    }

    /// Sets the AIGER encoding.
    #[must_use]
    pub fn with_aiger_format(mut self, format: AigerFormat) -> Self {
        self.aiger_format = format;
        self
    }

    /// Sets the optional sections.
    #[must_use]
    pub fn with_flags(mut self, flags: ExportFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Configuration for a [`crate::SymbolicSession`].
///
/// # Example
///
/// ```rust
/// use symcircuit::{AigerFormat, ExportConfig, SessionConfig};
///
/// let config = SessionConfig::new()
///     .with_verbosity(0)
///     .with_input_prefix("in")
///     .with_export(ExportConfig::new().with_aiger_format(AigerFormat::Binary));
/// assert_eq!(config.input_prefix, "in");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Initial diagnostic verbosity (default: 1).
    ///
    /// 0 silences traces and dumps, 2 and above additionally logs fresh inputs and
    /// exports at `debug`, 3 and above logs every derived term at `trace`.
    pub verbosity: u32,

    /// Cross-check every evaluation against simulation of the bit-blasted circuit
    /// (default: false).
    pub cross_check_evaluation: bool,

    /// Prefix of generated input names (default: `"x"`).
    ///
    /// Unnamed fresh inputs are called `<prefix><n>`, where `n` counts inputs.
    pub input_prefix: String,

    /// Export settings.
    pub export: ExportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbosity: 1,
            cross_check_evaluation: false,
            input_prefix: "x".to_string(),
            export: ExportConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with default settings.
    ///
    /// # Returns
    ///
    /// A new `SessionConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for debugging the crate itself.
    ///
    /// This configuration uses:
    /// - Verbosity 3 (every derived term is logged)
    /// - Evaluation cross-checked against circuit simulation
    ///
    /// # Returns
    ///
    /// A new `SessionConfig` favoring checks over speed.
    #[must_use]
    pub fn debugging() -> Self {
        Self {
            verbosity: 3,
            cross_check_evaluation: true,
            ..Self::default()
        }
    }

    /// Sets the initial verbosity.
    ///
    /// # Arguments
    ///
    /// * `level` - The diagnostic verbosity.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = level;
        self
    }

    /// Enables or disables the evaluation cross-check.
    #[must_use]
    pub fn with_cross_check(mut self, enabled: bool) -> Self {
        self.cross_check_evaluation = enabled;
        self
    }

    /// Sets the prefix of generated input names.
    #[must_use]
    pub fn with_input_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.input_prefix = prefix.into();
        self
    }

    /// Sets the export configuration.
    #[must_use]
    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }
}
