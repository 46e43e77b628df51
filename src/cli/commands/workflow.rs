//! Workflow commands for a single repository

use crate::cli::args::WorkflowCommand;
use crate::cli::output::print_command_output;
use crate::error::GhmResult;
use crate::gh::{CommandExecutor, GhRunner};

/// Execute a workflow command
pub async fn execute<E: CommandExecutor>(
    command: WorkflowCommand,
    runner: &mut GhRunner<E>,
) -> GhmResult<()> {
    match command {
        WorkflowCommand::List { repo } => {
            let names = runner.workflow_list(&repo).await?;
            if names.is_empty() {
                println!("No workflows found.");
            }
            for name in names {
                println!("{}", name);
            }
        }
        WorkflowCommand::Run { repo, name } => {
            println!("Running {} -> {}", repo, name);
            let output = runner.workflow_run(&repo, &name).await?;
            print_command_output(&output);
        }
    }

    Ok(())
}
