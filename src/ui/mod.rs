//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`sensors`]: Grouped channel tables with limits, deviation, trend and status
//! - [`alerts`]: Live and retained critical channels plus backend diagnostics
//! - [`trends`]: RUL curve and the selected channel's recent history
//! - [`report`]: Batch RUL analysis of an uploaded test file
//! - [`detail`]: Modal overlay for a single channel
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! The main loop in `main.rs` calls into these modules based on the current view:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (sensors/alerts/trends/report)       │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod alerts;
pub mod common;
pub mod detail;
pub mod report;
pub mod sensors;
pub mod theme;
pub mod trends;

pub use theme::Theme;
