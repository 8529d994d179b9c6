//! Cycle-stepped TL-UL host engine: latches queued transactions onto the request channel, tracks the valid/ready
//! handshakes and verifies read responses, replaying a read until its expected response matches.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]

mod config;
mod engine;
mod handshake;
mod queue;
mod sequence;
mod verifier;

pub use config::EngineConfig;
pub use engine::{EngineStats, Latch, SignalPort, StepReport, TransactionEngine};
pub use handshake::{ChannelState, HandshakeController, Handshakes};
pub use queue::{ExpectedResponse, TransactionQueue};
pub use sequence::{Sequence, SequenceError};
pub use verifier::{ResponseVerifier, Verdict};
