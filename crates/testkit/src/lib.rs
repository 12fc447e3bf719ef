//! NEL Collector - Test kit
//!
//! Helpers for constructing test cases that exercise a collector
//! pipeline: a controllable clock, a processor that stashes the batch it
//! sees, a cloneable in-memory writer, and a golden-file driver that runs
//! every payload under `testdata/reports/` through a pipeline twice (once
//! as an IPv4 client, once as IPv6) and compares the `TestResult`
//! annotation against golden files.
//!
//! # Golden files
//!
//! Inputs live in `<testdata>/reports/<payload>.json`; expected outputs
//! in `<testdata>/<TestName>/<payload>.<iptag><ext>`. Run the tests with
//! `UPDATE_GOLDEN=1` to rewrite the expected outputs from actual output
//! (libtest owns the CLI flag namespace, so the update switch is an
//! environment variable).

mod clock;
mod driver;
mod golden;
mod stash;
mod writer;

pub use clock::SimulatedClock;
pub use driver::PipelineTest;
pub use golden::{goldendata, testdata, update_golden};
pub use stash::StashReports;
pub use writer::SharedBuffer;
