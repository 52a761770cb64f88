//! Utility functions and helpers.
//!
//! - [`logging`] - Diagnostic logging setup
//! - [`rotating`] - Size/count-bounded rotating log file
//! - [`time`] - API timestamp formatting and poll windows
//!
//! # Examples
//!
//! ## Building a poll window
//!
//! ```
//! use weka_event_logger::utils::time::PollWindow;
//!
//! let window = PollWindow::last(60);
//! assert_eq!(window.length_secs(), 60);
//! ```

pub mod logging;
pub mod rotating;
pub mod time;
