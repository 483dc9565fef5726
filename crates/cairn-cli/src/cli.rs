//! Command-line argument definitions using clap
//!
//! Each command's arguments live in a clap-derived wrapper that converts
//! into the interface-agnostic parameter types of `cairn_core`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner / Reviewer
//! ```
//!
//! Help text and flag shapes stay here; input validation stays in the core
//! so every front end rejects malformed input the same way.

use std::path::PathBuf;

use cairn_core::{models::ItemPatch, CreatePlan, ItemKind, ItemStatus, NewItem, UpdatePlan};
use clap::{Args, Subcommand, ValueEnum};

// ============================================================================
// Plans
// ============================================================================

/// Create a new plan
#[derive(Args)]
pub struct CreatePlanArgs {
    /// Title of the plan
    pub title: String,
    /// Free-form body text
    #[arg(short, long)]
    pub content: Option<String>,
    /// Tags as a comma-separated list
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl CreatePlanArgs {
    pub fn into_params(self, owner_id: &str) -> CreatePlan {
        let mut params = CreatePlan::new(owner_id, self.title).tags(self.tags);
        if let Some(content) = self.content {
            params = params.content(content);
        }
        params
    }
}

/// Update a plan's fields; absent flags leave the stored value alone
#[derive(Args)]
pub struct UpdatePlanArgs {
    #[arg(help = "Identifier of the plan to update")]
    pub id: String,
    #[arg(short, long, help = "New title")]
    pub title: Option<String>,
    #[arg(short, long, help = "New body text")]
    pub content: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Replace the tags with this comma-separated list"
    )]
    pub tags: Option<Vec<String>>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Replace the goals with this comma-separated list"
    )]
    pub goals: Option<Vec<String>>,
    #[arg(
        long,
        help = "Only update if the stored plan is still at this version"
    )]
    pub expected_version: Option<u64>,
}

impl From<UpdatePlanArgs> for UpdatePlan {
    fn from(val: UpdatePlanArgs) -> Self {
        let mut params = UpdatePlan::new(val.id);
        params.title = val.title;
        params.content = val.content;
        if let Some(tags) = val.tags {
            params = params.tags(tags);
        }
        if let Some(goals) = val.goals {
            params = params.goals(goals);
        }
        params.expected_version = val.expected_version;
        params
    }
}

/// Identifies a single plan
#[derive(Args)]
pub struct PlanIdArgs {
    #[arg(help = "Identifier of the plan")]
    pub id: String,
}

/// Delete a plan permanently
#[derive(Args)]
pub struct DeletePlanArgs {
    #[arg(help = "Identifier of the plan to permanently delete")]
    pub id: String,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List your plans, most recently updated first
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a specific plan
    #[command(alias = "s")]
    Show(PlanIdArgs),
    /// Update a plan
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Delete a plan permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
}

// ============================================================================
// Items
// ============================================================================

/// Add an item to a plan
#[derive(Args)]
pub struct AddItemArgs {
    #[arg(help = "Identifier of the plan to add the item to")]
    pub plan_id: String,
    /// Text of the item
    pub text: String,
    #[arg(short, long, default_value = "task")]
    pub kind: ItemKindArg,
    #[arg(
        short,
        long,
        help = "0-based position to insert at; appends when absent or past the end"
    )]
    pub position: Option<usize>,
}

impl From<AddItemArgs> for NewItem {
    fn from(val: AddItemArgs) -> Self {
        let item = NewItem::new(val.text).kind(val.kind.into());
        match val.position {
            Some(position) => item.at(position),
            None => item,
        }
    }
}

/// Update an item's text, kind or status
#[derive(Args)]
pub struct UpdateItemArgs {
    pub plan_id: String,
    pub item_id: String,
    #[arg(short, long)]
    pub text: Option<String>,
    #[arg(short, long)]
    pub kind: Option<ItemKindArg>,
    #[arg(short, long)]
    pub status: Option<ItemStatusArg>,
}

impl From<&UpdateItemArgs> for ItemPatch {
    fn from(val: &UpdateItemArgs) -> Self {
        ItemPatch {
            text: val.text.clone(),
            kind: val.kind.map(Into::into),
            timing: None,
            status: val.status.map(Into::into),
        }
    }
}

/// Move an item to a new position
#[derive(Args)]
pub struct MoveItemArgs {
    pub plan_id: String,
    pub item_id: String,
    #[arg(help = "0-based target position; clamped to the last slot")]
    pub position: usize,
}

/// Identifies one item of a plan
#[derive(Args)]
pub struct ItemRefArgs {
    pub plan_id: String,
    pub item_id: String,
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a plan
    #[command(alias = "a")]
    Add(AddItemArgs),
    /// Update an item
    #[command(alias = "u")]
    Update(UpdateItemArgs),
    /// Mark an item completed
    Done(ItemRefArgs),
    /// Move an item within its plan
    #[command(alias = "mv")]
    Move(MoveItemArgs),
    /// Remove an item from its plan
    #[command(alias = "rm")]
    Remove(ItemRefArgs),
}

/// Command-line representation of item kinds
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ItemKindArg {
    Task,
    Event,
    Note,
    Reminder,
}

impl From<ItemKindArg> for ItemKind {
    fn from(val: ItemKindArg) -> Self {
        match val {
            ItemKindArg::Task => ItemKind::Task,
            ItemKindArg::Event => ItemKind::Event,
            ItemKindArg::Note => ItemKind::Note,
            ItemKindArg::Reminder => ItemKind::Reminder,
        }
    }
}

/// Command-line representation of item statuses
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ItemStatusArg {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl From<ItemStatusArg> for ItemStatus {
    fn from(val: ItemStatusArg) -> Self {
        match val {
            ItemStatusArg::Pending => ItemStatus::Pending,
            ItemStatusArg::InProgress => ItemStatus::InProgress,
            ItemStatusArg::Completed => ItemStatus::Completed,
            ItemStatusArg::Cancelled => ItemStatus::Cancelled,
        }
    }
}

// ============================================================================
// Enhancements
// ============================================================================

/// Import enhancements produced elsewhere
#[derive(Args)]
pub struct ImportArgs {
    #[arg(help = "JSON file holding one enhancement or an array of them; '-' reads stdin")]
    pub file: PathBuf,
}

/// Decide on some or all changes of an enhancement
#[derive(Args)]
pub struct DecideArgs {
    #[arg(help = "Identifier of the enhancement")]
    pub id: String,
    #[arg(
        short,
        long = "change",
        help = "Change to address (repeatable); all changes when omitted"
    )]
    pub changes: Vec<String>,
    #[arg(short, long, help = "Why the enhancement was rejected")]
    pub feedback: Option<String>,
}

impl DecideArgs {
    pub fn change_ids(&self) -> Option<&[String]> {
        (!self.changes.is_empty()).then_some(self.changes.as_slice())
    }
}

/// Replace the proposed value of one pending change
#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    pub change_id: String,
    #[arg(help = "New value as JSON; anything that is not valid JSON is taken as a string")]
    pub value: String,
}

/// Decide on several enhancements at once
#[derive(Args)]
pub struct BatchArgs {
    #[arg(required = true)]
    pub ids: Vec<String>,
    #[arg(short, long)]
    pub feedback: Option<String>,
}

/// Identifies one enhancement
#[derive(Args)]
pub struct EnhancementIdArgs {
    pub id: String,
}

#[derive(Subcommand)]
pub enum EnhancementCommands {
    /// Import proposed enhancements from JSON
    Import(ImportArgs),
    /// List a plan's enhancements
    #[command(aliases = ["l", "ls"])]
    List(PlanIdArgs),
    /// Show one enhancement with its changes
    #[command(alias = "s")]
    Show(EnhancementIdArgs),
    /// Apply some or all changes
    #[command(alias = "a")]
    Approve(DecideArgs),
    /// Reject an enhancement
    #[command(alias = "r")]
    Reject(DecideArgs),
    /// Edit a pending change before approving it
    Edit(EditArgs),
    /// Approve every change of several enhancements
    ApproveAll(BatchArgs),
    /// Reject several enhancements
    RejectAll(BatchArgs),
    /// Delete an enhancement; its history is kept
    #[command(alias = "rm")]
    Delete(EnhancementIdArgs),
}

// ============================================================================
// History
// ============================================================================

/// Prune old history entries
#[derive(Args)]
pub struct ClearHistoryArgs {
    pub plan_id: String,
    #[arg(long, help = "Delete entries older than this many days (default 30)")]
    pub older_than_days: Option<u32>,
}

/// Identifies one history entry
#[derive(Args)]
pub struct EntryIdArgs {
    pub entry_id: String,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// A plan's applied changes, most recent first
    #[command(aliases = ["l", "ls"])]
    List(PlanIdArgs),
    /// Entries produced by one enhancement
    Enhancement(EnhancementIdArgs),
    /// Undo one applied change
    Rollback(EntryIdArgs),
    /// Undo every applied change of an enhancement
    RollbackEnhancement(EnhancementIdArgs),
    /// Delete old entries of a plan
    Clear(ClearHistoryArgs),
}

// ============================================================================
// Sync
// ============================================================================

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show queued mutations
    Status,
    /// Replay queued mutations now
    Drain,
    /// Drop mutations that exhausted their retries
    Purge,
}
