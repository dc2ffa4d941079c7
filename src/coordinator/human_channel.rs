//! Pluggable human-intervention channels (SPEC_FULL §4.2). Grounded in
//! the teacher's CLI-prompt pattern (`cli/commands/task.rs` reads from
//! stdin for interactive confirmations) generalized to the structured
//! approval contract this domain needs.

use async_trait::async_trait;
use chrono::Utc;
use std::io::Write;
use tracing::info;

use crate::domain::models::{ApprovalOption, HumanApprovalDecision, HumanApprovalRequest};
use crate::domain::ports::HumanApprovalChannel;

/// Default production channel: prompts on the controlling terminal.
pub struct TerminalChannel;

#[async_trait]
impl HumanApprovalChannel for TerminalChannel {
    async fn request_approval(&self, request: HumanApprovalRequest) -> HumanApprovalDecision {
        println!("--- human approval requested ({:?}) ---", request.urgency);
        for conflict in &request.conflicts {
            println!("  - {}", conflict.describe());
        }
        print!("approve/defer/reject/modify> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        let option = if std::io::stdin().read_line(&mut line).is_ok() {
            match line.trim().to_lowercase().as_str() {
                "approve" | "a" => ApprovalOption::Approve,
                "reject" | "r" => ApprovalOption::Reject,
                "modify" | "m" => ApprovalOption::Modify,
                _ => ApprovalOption::Defer,
            }
        } else {
            ApprovalOption::Defer
        };

        info!(?option, request_id = %request.id, "human approval decision recorded");
        HumanApprovalDecision { option, approver: "terminal-operator".into(), notes: String::new(), timestamp: Utc::now() }
    }
}

/// Test/automation channel: always approves (SPEC_FULL §6
/// `COORDINATION_AUTO_APPROVE`).
pub struct AutoApproveChannel;

#[async_trait]
impl HumanApprovalChannel for AutoApproveChannel {
    async fn request_approval(&self, request: HumanApprovalRequest) -> HumanApprovalDecision {
        HumanApprovalDecision {
            option: ApprovalOption::Approve,
            approver: "auto-approve".into(),
            notes: format!("auto-approved {} conflicts", request.conflicts.len()),
            timestamp: Utc::now(),
        }
    }
}
