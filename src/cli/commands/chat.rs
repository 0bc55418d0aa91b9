//! Interactive chat command.

use crate::agent::{ChatSession, OpenAiChatModel};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, api_key: Option<&str>, settings: Settings) -> Result<()> {
    let session = match start_session(model, api_key, settings) {
        Ok(session) => session,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'skylark doctor' for detailed diagnostics.");
            return Err(e);
        }
    };
    repl(session).await
}

/// Build a session for the chat and ask commands.
pub(super) fn start_session(
    model: Option<String>,
    api_key: Option<&str>,
    settings: Settings,
) -> Result<ChatSession> {
    let key = preflight::check(Operation::Chat, &settings, api_key)?
        .ok_or_else(|| anyhow::anyhow!("No API key resolved"))?;

    let mut chat_model = OpenAiChatModel::new(key, &settings.agent);
    if let Some(model) = model {
        chat_model = chat_model.with_model(&model);
    }

    let coordinator = Coordinator::new(settings)?;
    Ok(coordinator.session_with_model(Box::new(chat_model)))
}

async fn repl(mut chat: ChatSession) -> Result<()> {
    println!("\n{}", style("Skylark Flight Coordinator").bold().cyan());
    println!(
        "{}\n",
        style("Type a command, or 'exit' to quit. Use 'reset' to start over.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("reset") || input.eq_ignore_ascii_case("clear") {
            chat.reset();
            Output::info("Session reset.");
            continue;
        }

        let spinner = Output::spinner("Coordinating...");
        let result = chat.send(input).await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                for record in &outcome.tool_calls {
                    Output::tool_call(record);
                }
                Output::reply(&outcome.reply);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
