//! Terminal and JSON rendering of scenario reports

use governance::ProposalState;
use owo_colors::OwoColorize;

use crate::config::EngineConfig;
use crate::scenario::Report;

fn state_label(state: ProposalState) -> String {
    let label = state.to_string();
    match state {
        ProposalState::Executed | ProposalState::Succeeded => label.green().bold().to_string(),
        ProposalState::Queued | ProposalState::Active => label.cyan().to_string(),
        ProposalState::Pending => label.bright_black().to_string(),
        ProposalState::Defeated | ProposalState::Expired => label.yellow().to_string(),
        ProposalState::Canceled | ProposalState::Vetoed => label.red().to_string(),
    }
}

pub fn print_report(report: &Report) {
    println!("{}", "═══ Governance Scenario ═══".cyan().bold());
    println!(
        "  {:<16} {} / {}",
        "Contracts:".bright_black(),
        report.governor,
        report.timelock
    );
    println!(
        "  {:<16} tick {} time {}",
        "Clock:".bright_black(),
        report.clock.tick,
        report.clock.time
    );
    println!(
        "  {:<16} {}s",
        "Timelock delay:".bright_black(),
        report.timelock_delay
    );
    println!();

    println!("{}", "┌─ Steps".blue());
    for step in &report.steps {
        let marker = if step.ok {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        match step.error_kind {
            Some(kind) => println!(
                "│ {} {:>3} {:<10} {} {}",
                marker,
                step.index,
                step.action,
                format!("[{kind:?}]").yellow(),
                step.detail
            ),
            None => println!(
                "│ {} {:>3} {:<10} {}",
                marker, step.index, step.action, step.detail
            ),
        }
    }
    println!();

    println!("{}", "┌─ Proposals".blue());
    if report.proposals.is_empty() {
        println!("│ {}", "No proposals".bright_black());
    }
    for proposal in &report.proposals {
        println!(
            "│ #{} {} by {}{}",
            proposal.id,
            state_label(proposal.state),
            proposal.proposer,
            if proposal.high_risk {
                format!(" {}", "high-risk".magenta())
            } else {
                String::new()
            }
        );
        if !proposal.description.is_empty() {
            println!("│    {}", proposal.description.bright_black());
        }
        println!(
            "│    for {} against {} abstain {} (quorum {})",
            proposal.for_votes.to_string().green(),
            proposal.against_votes.to_string().red(),
            proposal.abstain_votes,
            proposal.quorum_votes
        );
        if let Some(eta) = &proposal.eta_utc {
            println!("│    eta {}", eta);
        }
    }
    println!();

    println!("{}", "┌─ Parameters".blue());
    if report.parameters.is_empty() {
        println!("│ {}", "None set".bright_black());
    }
    for (key, value) in &report.parameters {
        println!("│ {:<24} {}", key, value.to_string().bright_yellow());
    }
    println!();

    let failed = report.failed_steps();
    let summary = format!(
        "{} steps, {} rejected, {} events",
        report.steps.len(),
        failed,
        report.events
    );
    if failed == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}

pub fn print_config(config: &EngineConfig) -> Result<(), toml::ser::Error> {
    let text = toml::to_string_pretty(config)?;
    println!("{}", "# Effective configuration".bright_black());
    print!("{text}");
    Ok(())
}
