//! QR codes for the terminal.
//!
//! Encodes text or binary payloads as QR Code Model 2 symbols and draws
//! them with Unicode block glyphs, optionally colored with ANSI escapes
//! and optionally animated chunk by chunk for payloads larger than one
//! code comfortably holds.
//!
//! # Example
//!
//! ```
//! use qrterm::matrix::ModuleMatrix;
//! use qrterm::qrcode::{QrCode, QrCodeEcc, Version};
//! use qrterm::render::{render, RenderOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = QrCode::encode_text(
//!     "https://example.com",
//!     QrCodeEcc::Medium,
//!     Version::MIN,
//!     Version::MAX,
//!     None,
//!     true,
//! )?;
//! let matrix = ModuleMatrix::from(&code);
//! let text = render(&matrix, &RenderOptions::default())?;
//! print!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod animate;
pub mod ansi;
pub mod error;
pub mod glyph;
pub mod matrix;
pub mod qrcode;
pub mod render;

pub use error::Error;
