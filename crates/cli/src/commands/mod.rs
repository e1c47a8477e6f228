// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod admin;
mod consensus;
mod export;
mod research;
mod session;
mod tasks;
mod tools;
mod validate;

use crate::exit_error::ExitError;
use cleo_core::Clock;
use cleo_dispatch::Dispatcher;

#[derive(clap::Subcommand)]
pub enum Command {
    /// Create a task
    Add(tasks::AddArgs),
    /// List live tasks
    List(tasks::ListArgs),
    /// Show one task
    Show(tasks::ShowArgs),
    /// Complete a task
    Complete(tasks::CompleteArgs),
    /// Cancel/delete a task
    Delete(tasks::DeleteArgs),
    /// Archive a done task
    Archive(tasks::ArchiveArgs),
    /// Archive every eligible done task
    ArchiveAuto,
    /// Restore archived tasks back to the live set
    #[command(alias = "unarchive")]
    Restore(tasks::RestoreArgs),
    /// Aggregate the archive by phase, label, priority and cycle time
    ArchiveStats(tasks::ArchiveStatsArgs),
    /// Change a task's parent
    Reparent(tasks::ReparentArgs),
    /// Change a task's position among siblings
    Reorder(tasks::ReorderArgs),
    /// Claim or release focus on a task
    Focus(tasks::FocusArgs),
    /// Set verification gates
    Verify(tasks::VerifyArgs),

    /// Session lifecycle and context operations
    Session(session::SessionArgs),

    /// Run cross-entity validators, optionally auto-repairing
    Validate(validate::ValidateArgs),
    /// Diagnose project-root health (read-only)
    Doctor(admin::DoctorArgs),
    /// Initialise a project root
    Init,

    /// Research/manifest index operations
    Research(research::ResearchArgs),

    /// RCSD-IVTR protocol-stage and multi-agent consensus checks
    Consensus(consensus::ConsensusArgs),

    /// Find related tasks by label/phase/hierarchy
    Related(tools::RelatedArgs),
    /// Dependency-wave scheduling order
    Waves,

    /// Export the live task set for an external tool
    Export(export::ExportArgs),
}

pub fn run<C: Clock>(dispatcher: &Dispatcher<C>, command: Command) -> Result<i32, ExitError> {
    match command {
        Command::Add(args) => tasks::add(dispatcher, args),
        Command::List(args) => tasks::list(dispatcher, args),
        Command::Show(args) => tasks::show(dispatcher, args),
        Command::Complete(args) => tasks::complete(dispatcher, args),
        Command::Delete(args) => tasks::delete(dispatcher, args),
        Command::Archive(args) => tasks::archive(dispatcher, args),
        Command::ArchiveAuto => tasks::archive_auto(dispatcher),
        Command::Restore(args) => tasks::restore(dispatcher, args),
        Command::ArchiveStats(args) => tasks::archive_stats(dispatcher, args),
        Command::Reparent(args) => tasks::reparent(dispatcher, args),
        Command::Reorder(args) => tasks::reorder(dispatcher, args),
        Command::Focus(args) => tasks::focus(dispatcher, args),
        Command::Verify(args) => tasks::verify(dispatcher, args),
        Command::Session(args) => session::run(dispatcher, args),
        Command::Validate(args) => validate::validate(dispatcher, args),
        Command::Doctor(args) => admin::doctor(dispatcher, args),
        Command::Init => admin::init(dispatcher),
        Command::Research(args) => research::run(dispatcher, args),
        Command::Consensus(args) => consensus::run(dispatcher, args),
        Command::Related(args) => tools::related(dispatcher, args),
        Command::Waves => tools::waves(dispatcher),
        Command::Export(args) => export::export(dispatcher, args),
    }
}
