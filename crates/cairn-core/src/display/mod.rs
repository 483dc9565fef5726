//! Human-readable formatting of plans, enhancements, history and the queue.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]).
//! Collections are wrapped in newtypes ([`collections`]) so empty lists get a
//! sensible message, and operation outcomes such as batch results and queue
//! status live in [`results`].
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Newtype Wrappers│    │   Formatted     │
//! │ (Plan, Change,  │───▶│  & Outcomes     │───▶│    Output       │
//! │  HistoryEntry)  │    │                 │    │   (Terminal)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! All output is plain markdown so it reads well both raw and rendered.
//!
//! ```rust
//! use cairn_core::{display::PlanSummaries, models::{Plan, PlanSummary}};
//!
//! let plan = Plan::new("user-1", "Morning Routine");
//! let output = PlanSummaries(vec![PlanSummary::from(&plan)]).to_string();
//! assert!(output.contains("Morning Routine"));
//! assert!(output.contains("v1"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;

pub use collections::{Enhancements, History, PlanSummaries};
pub use datetime::LocalDateTime;
