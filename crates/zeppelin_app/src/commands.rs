use std::time::Duration;

use anyhow::Context;
use serde_json::to_string_pretty;
use zeppelin_client::{ClientConfig, ExecutionClient, Parameters, ParagraphResult, RunMode, Status};
use zeppelin_logging::{zeppelin_info, zeppelin_warn};

use crate::cli::{Command, ConnectionArgs};

pub async fn run(config: ClientConfig, connection: &ConnectionArgs, command: Command) -> anyhow::Result<()> {
    let client = ExecutionClient::new(config).context("failed to build client")?;

    if let Some(user) = &connection.user {
        let password = connection.password.as_deref().unwrap_or_default();
        client.login(user, password).await.context("login failed")?;
    }

    match command {
        Command::Version => println!("{}", client.get_version().await?),
        Command::CreateNote { path, group } => {
            println!("{}", client.create_note(&path, group.as_deref()).await?)
        }
        Command::DeleteNote { note } => client.delete_note(&note).await?,
        Command::RunParagraph {
            note,
            paragraph,
            text,
            title,
            session,
            params,
            no_wait,
            timeout_ms,
        } => {
            let paragraph_id = match (paragraph, text) {
                (Some(id), Some(text)) => {
                    client.update_paragraph(&note, &id, &title, &text).await?;
                    id
                }
                (Some(id), None) => id,
                (None, Some(text)) => client.add_paragraph(&note, &title, &text).await?,
                (None, None) => anyhow::bail!("run-paragraph needs --paragraph or --text"),
            };
            let parameters: Parameters = params.into_iter().collect();

            let result = match (no_wait, timeout_ms) {
                (true, _) => {
                    client
                        .run_paragraph(&note, &paragraph_id, &session, &parameters, RunMode::Submit)
                        .await?
                }
                (false, None) => {
                    client
                        .run_paragraph(&note, &paragraph_id, &session, &parameters, RunMode::WaitForCompletion)
                        .await?
                }
                (false, Some(timeout_ms)) => {
                    client
                        .run_paragraph(&note, &paragraph_id, &session, &parameters, RunMode::Submit)
                        .await?;
                    client
                        .wait_until_paragraph_finished(&note, &paragraph_id, Some(Duration::from_millis(timeout_ms)))
                        .await?
                }
            };
            report_paragraph(&result)?;
        }
        Command::RunNote { note, params, no_wait } => {
            let mode = if no_wait {
                RunMode::Submit
            } else {
                RunMode::WaitForCompletion
            };
            let parameters: Parameters = params.into_iter().collect();
            let result = client.run_note(&note, mode, &parameters).await?;
            println!("{}", to_string_pretty(&result)?);
        }
        Command::QueryNote { note } => {
            println!("{}", to_string_pretty(&client.query_note_result(&note).await?)?)
        }
        Command::QueryParagraph { note, paragraph } => {
            let result = client.query_paragraph_result(&note, &paragraph).await?;
            println!("{}", to_string_pretty(&result)?);
        }
        Command::Cancel { note, paragraph } => client.cancel_paragraph(&note, &paragraph).await?,
        Command::NewSession { interpreter } => println!("{}", client.new_session(&interpreter).await?),
        Command::StopSession { interpreter, session } => {
            client.stop_session(&interpreter, &session).await?
        }
    }
    Ok(())
}

/// Print the paragraph's status line and output. A paragraph that ended in
/// `ERROR` or `ABORT` fails the command.
fn report_paragraph(result: &ParagraphResult) -> anyhow::Result<()> {
    zeppelin_info!("paragraph {} reported {}", result.paragraph_id, result.status);
    println!(
        "paragraph {}: {} ({}%)",
        result.paragraph_id, result.status, result.progress
    );
    for url in &result.job_urls {
        println!("job url: {url}");
    }
    print!("{}", result.message());

    if matches!(result.status, Status::Error | Status::Abort) {
        zeppelin_warn!("paragraph {} ended with {}", result.paragraph_id, result.status);
        anyhow::bail!("paragraph {} ended with {}", result.paragraph_id, result.status);
    }
    Ok(())
}
