//! Batch roster printing: find the newest roster spreadsheet, reshape its
//! columns, split it into per-session tables, and print (or preview) one
//! formatted PDF per session.

pub mod config;
pub mod dates;
pub mod dispatch;
pub mod error;
pub mod locate;
pub mod partition;
pub mod render;
pub mod table;
pub mod transform;

pub use config::{Config, MergeRule, Orientation};
pub use dispatch::{DispatchMode, Dispatcher, RunMode};
pub use error::{Error, Result};
pub use partition::SessionGroup;
pub use render::{footer_from_toggles, RenderMeta, Renderer};
pub use table::{Cell, Table};
