//! Worker Layer - Background Task Processing
//!
//! 实现 SessionReaper，回收空闲的编辑会话

mod session_reaper;

pub use session_reaper::{SessionReaper, SessionReaperConfig};
