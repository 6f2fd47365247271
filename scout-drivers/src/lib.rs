//! Driver layer for browser automation.
//!
//! Renders pages through a running WebDriver service so the extraction chain
//! can read JavaScript-built DOMs.
//!
//! - [`browser::driver::ScoutDriver`]: WebDriver client wrapper
//! - [`browser::page::ScoutPage`]: navigation, readiness and DOM reads
//! - [`browser::behavioral::BehavioralEngine`]: human-like pauses
//! - [`browser::stealth`]: stealth profiles, Chrome arguments and JS evasions
pub mod browser;
