//! Line-oriented question loop for terminals.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::{domain::QuestionOutcome, AppHandles};

const BANNER: &str = "AdTargeting Assistant - Audience Segmentation\nType 'exit' or 'quit' to exit\n";
const PROMPT: &str = "\nEnter your question: ";

fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Reads questions from `input` until `exit`, `quit` or end of input and
/// writes each answer to `output`. Failed questions do not end the loop.
pub async fn run_console<R, W>(
    handles: Arc<AppHandles>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit(&line) {
            break;
        }

        let supervisor = Arc::clone(&handles.supervisor);
        let outcome = tokio::task::spawn_blocking(move || supervisor.process_question(&line))
            .await
            .map_err(std::io::Error::other)?;

        let text = match outcome {
            Ok(QuestionOutcome::ClarificationNeeded { message }) => format!("\n{message}\n"),
            Ok(QuestionOutcome::Answered(report)) => {
                debug!(kind = %report.kind, audience = %report.audience, "question answered");
                format!("\n{}\n", report.formatted_output)
            }
            Err(err) => format!("Error processing question: {err}\n"),
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.flush().await
}

/// Runs the loop on the process's stdin and stdout.
pub async fn run_stdio(handles: Arc<AppHandles>) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_console(handles, stdin, tokio::io::stdout()).await
}
