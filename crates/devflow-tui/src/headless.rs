//! One-shot analysis without the terminal UI.

use anyhow::{Result, bail};
use devflow_core::{AgentClient, InteractionState, Orchestrator, OutputView, SubmitRejected, Task};

const COLD_START_NOTE: &str =
    "\nBackend service is starting up (cold start). Please wait 10–15 seconds and retry.\n";

/// Submit once and wait for the outcome.
///
/// Returns the printable report and whether the run succeeded.
pub async fn run_once(
    client: AgentClient,
    task: Task,
    code: &str,
    error_text: &str,
) -> Result<(String, bool)> {
    let mut orchestrator = Orchestrator::new(client, task);
    orchestrator.set_code(code);
    orchestrator.set_error_text(error_text);

    match orchestrator.submit() {
        Ok(()) => {}
        Err(SubmitRejected::BlankCode) => {
            let notice = orchestrator
                .take_toast()
                .map(|t| t.description)
                .unwrap_or_else(|| "Code is required".to_string());
            bail!(notice);
        }
        Err(SubmitRejected::Busy) => bail!("A request is already in flight"),
    }

    orchestrator.wait().await;

    let state = orchestrator.state();
    Ok((render_report(state), state.last_failure.is_none()))
}

pub fn render_report(state: &InteractionState) -> String {
    let mut out = String::new();

    match state.output_view() {
        OutputView::Loading => out.push_str("AI is analyzing your code...\n"),
        OutputView::Failure(view) => {
            out.push_str(&format!(
                "{}\n{}\nError: {}\n",
                view.headline, view.message, view.diagnostic
            ));
            if state.show_degraded_notice {
                out.push_str(COLD_START_NOTE);
            }
        }
        OutputView::Sections(sections) => {
            out.push_str(&format!("# {}\n", state.panel_title()));
            for section in sections {
                let heading = section.heading(state.task);
                out.push_str(&format!("\n## {}\n\n{}\n", heading, section.content));
            }
        }
        OutputView::Empty => {
            out.push_str("The agent returned no analysis for this input.\n");
        }
    }

    out
}
