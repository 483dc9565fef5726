//! Executes parsed commands against the planner and prints the outcome.

use std::io::Read;

use anyhow::{bail, Context, Result};
use cairn_core::{
    display::{Enhancements, History, PlanSummaries},
    models::ItemPatch,
    CairnError, Enhancement, ItemStatus, Planner, Reviewer, UpdatePlan,
};
use jiff::SignedDuration;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    cli::{
        ClearHistoryArgs, EditArgs, EnhancementCommands, HistoryCommands, ImportArgs,
        ItemCommands, PlanCommands, SyncCommands,
    },
    renderer::Renderer,
};

/// Either shape accepted by `enhancement import`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Many(Vec<Enhancement>),
    One(Box<Enhancement>),
}

impl ImportDocument {
    fn into_vec(self) -> Vec<Enhancement> {
        match self {
            ImportDocument::Many(enhancements) => enhancements,
            ImportDocument::One(enhancement) => vec![*enhancement],
        }
    }
}

/// Parses an edit value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub struct Cli {
    planner: Planner,
    reviewer: Reviewer,
    renderer: Renderer,
    user: String,
}

impl Cli {
    pub fn new(planner: Planner, renderer: Renderer, user: String) -> Self {
        let reviewer = planner.reviewer();
        Self {
            planner,
            reviewer,
            renderer,
            user,
        }
    }

    pub async fn list_plans(&self) -> Result<()> {
        let summaries = self.planner.list_plan_summaries(&self.user).await?;
        self.renderer.render(&PlanSummaries(summaries))
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self
                    .planner
                    .create_plan(&args.into_params(&self.user))
                    .await?;
                self.renderer.render(&plan)
            }
            PlanCommands::List => self.list_plans().await,
            PlanCommands::Show(args) => {
                let plan = self
                    .planner
                    .get_plan(&args.id)
                    .await?
                    .ok_or_else(|| CairnError::plan_not_found(&args.id))?;
                self.renderer.render(&plan)
            }
            PlanCommands::Update(args) => {
                let params = UpdatePlan::from(args);
                if params.is_empty() {
                    bail!("Nothing to update; pass at least one field");
                }
                let plan = self.planner.update_plan(params).await?;
                self.renderer.render(&plan)
            }
            PlanCommands::Delete(args) => {
                if !args.confirm {
                    bail!("Refusing to delete plan {} without --confirm", args.id);
                }
                self.planner.delete_plan(&args.id).await?;
                self.renderer
                    .notice(format!("Deleted plan {}", args.id), json!({ "deleted": args.id }))
            }
        }
    }

    pub async fn handle_item_command(&self, command: ItemCommands) -> Result<()> {
        let plan = match command {
            ItemCommands::Add(args) => {
                let plan_id = args.plan_id.clone();
                self.planner.add_item(&plan_id, args.into()).await?
            }
            ItemCommands::Update(args) => {
                let patch = ItemPatch::from(&args);
                if patch.is_empty() {
                    bail!("Nothing to update; pass at least one field");
                }
                self.planner
                    .update_item(&args.plan_id, &args.item_id, patch)
                    .await?
            }
            ItemCommands::Done(args) => {
                self.planner
                    .set_item_status(&args.plan_id, &args.item_id, ItemStatus::Completed)
                    .await?
            }
            ItemCommands::Move(args) => {
                self.planner
                    .move_item(&args.plan_id, &args.item_id, args.position)
                    .await?
            }
            ItemCommands::Remove(args) => {
                self.planner
                    .remove_item(&args.plan_id, &args.item_id)
                    .await?
            }
        };
        self.renderer.render(&plan)
    }

    pub async fn handle_enhancement_command(&self, command: EnhancementCommands) -> Result<()> {
        match command {
            EnhancementCommands::Import(args) => self.import(args).await,
            EnhancementCommands::List(args) => {
                let enhancements = self.reviewer.list_for_plan(&args.id).await?;
                self.renderer.render(&Enhancements(enhancements))
            }
            EnhancementCommands::Show(args) => {
                let enhancement = self
                    .reviewer
                    .get(&args.id)
                    .await?
                    .ok_or_else(|| CairnError::EnhancementNotFound { id: args.id.clone() })?;
                self.renderer.render(&enhancement)
            }
            EnhancementCommands::Approve(args) => {
                let result = self
                    .reviewer
                    .approve(&args.id, args.change_ids(), &self.user)
                    .await?;
                self.renderer.render(&result)
            }
            EnhancementCommands::Reject(args) => {
                let result = self
                    .reviewer
                    .reject(
                        &args.id,
                        args.change_ids(),
                        args.feedback.as_deref(),
                        &self.user,
                    )
                    .await?;
                self.renderer.render(&result)
            }
            EnhancementCommands::Edit(EditArgs {
                id,
                change_id,
                value,
            }) => {
                let enhancement = self
                    .reviewer
                    .edit(&id, &change_id, parse_value(&value), &self.user)
                    .await?;
                self.renderer.render(&enhancement)
            }
            EnhancementCommands::ApproveAll(args) => {
                let result = self.reviewer.batch_approve(&args.ids, &self.user).await;
                self.renderer.render(&result)
            }
            EnhancementCommands::RejectAll(args) => {
                let result = self
                    .reviewer
                    .batch_reject(&args.ids, args.feedback.as_deref(), &self.user)
                    .await;
                self.renderer.render(&result)
            }
            EnhancementCommands::Delete(args) => {
                self.reviewer.delete(&args.id).await?;
                self.renderer.notice(
                    format!("Deleted enhancement {}", args.id),
                    json!({ "deleted": args.id }),
                )
            }
        }
    }

    async fn import(&self, args: ImportArgs) -> Result<()> {
        let raw = if args.file.as_os_str() == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read enhancements from stdin")?;
            buffer
        } else {
            std::fs::read_to_string(&args.file)
                .with_context(|| format!("Failed to read {}", args.file.display()))?
        };
        let document: ImportDocument =
            serde_json::from_str(&raw).context("Failed to parse enhancement JSON")?;

        let mut saved = Vec::new();
        for enhancement in document.into_vec() {
            saved.push(self.reviewer.save(enhancement).await?);
        }
        debug!("Imported {} enhancements", saved.len());
        self.renderer.render(&Enhancements(saved))
    }

    pub async fn handle_history_command(&self, command: HistoryCommands) -> Result<()> {
        match command {
            HistoryCommands::List(args) => {
                let entries = self.reviewer.get_history(&args.id).await?;
                self.renderer.render(&History(entries))
            }
            HistoryCommands::Enhancement(args) => {
                let entries = self.reviewer.get_enhancement_history(&args.id).await?;
                self.renderer.render(&History(entries))
            }
            HistoryCommands::Rollback(args) => {
                let entry = self.reviewer.rollback(&args.entry_id, &self.user).await?;
                self.renderer.render(&History(vec![entry]))
            }
            HistoryCommands::RollbackEnhancement(args) => {
                let entries = self
                    .reviewer
                    .rollback_enhancement(&args.id, &self.user)
                    .await?;
                self.renderer.render(&History(entries))
            }
            HistoryCommands::Clear(ClearHistoryArgs {
                plan_id,
                older_than_days,
            }) => {
                let older_than =
                    older_than_days.map(|days| SignedDuration::from_hours(i64::from(days) * 24));
                let deleted = self.reviewer.clear_history(&plan_id, older_than).await?;
                self.renderer.notice(
                    format!("Deleted {deleted} history entries"),
                    json!({ "deleted": deleted }),
                )
            }
        }
    }

    pub async fn handle_sync_command(&self, command: SyncCommands) -> Result<()> {
        match command {
            SyncCommands::Status => {
                let status = self.planner.get_sync_queue_status().await?;
                self.renderer.render(&status)
            }
            SyncCommands::Drain => {
                let report = self.planner.drain_queue().await?;
                self.renderer.render(&report)
            }
            SyncCommands::Purge => {
                let purged = self.planner.purge_dead_letters().await?;
                self.renderer.notice(
                    format!("Purged {purged} dead-lettered mutation(s)"),
                    json!({ "purged": purged }),
                )
            }
        }
    }
}
