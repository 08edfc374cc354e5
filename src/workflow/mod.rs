//! Multiple taxonomy assignment workflow.
//!
//! Generates `assign_taxonomy.py`, `add_taxa.py` and `summarize_taxa.py`
//! command lines for every dataset, method and threshold, then hands them to a
//! [`CommandHandler`] that either runs or prints them.

mod assign;
mod commands;
mod handler;

pub use assign::{assign_taxonomy_multiple_times, AssignConfig};
pub use commands::{
    generate_blast_commands, generate_rdp_commands, generate_taxa_processing_commands,
    AssignmentMethod, Command, CommandGroups,
};
pub use handler::{CommandHandler, PrintCommands, SerialRunner, WorkflowLogger};
