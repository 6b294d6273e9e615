use anyhow::Result;
use clap::Args;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use ghiras::advisor::{Advisor, ChatHistory, ChatMessage, Language, Role};
use ghiras::config::Config;

#[derive(Args)]
pub struct ChatArgs {
    /// UI language for the greeting and fallback replies (overrides config)
    #[arg(short, long, value_enum)]
    pub lang: Option<Language>,
}

enum Command {
    Quit,
    Help,
    New,
    History,
    Lang(Language),
    Unknown(String),
}

fn parse_command(input: &str) -> Option<Command> {
    let rest = input.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();

    Some(match name {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "new" => Command::New,
        "history" => Command::History,
        "lang" => match parts.next() {
            Some("ar") => Command::Lang(Language::Ar),
            Some("en") => Command::Lang(Language::En),
            other => Command::Unknown(format!("lang {}", other.unwrap_or_default())),
        },
        other => Command::Unknown(other.to_string()),
    })
}

fn speaker(role: Role, language: Language) -> &'static str {
    match role {
        Role::User => language.pick("أنت", "You"),
        Role::Assistant => language.pick("المساعد", "Assistant"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /new          start a new conversation");
    println!("  /history      show this conversation");
    println!("  /lang ar|en   switch the UI language");
    println!("  /quit         leave (or Ctrl+D)");
}

pub async fn run(args: ChatArgs, config: &Config) -> Result<()> {
    let mut language = args.lang.unwrap_or(config.chat.language);
    let advisor = Advisor::from_config(config)?;

    if !advisor.capability().is_available() {
        eprintln!(
            "{}",
            language.pick(
                "وضع تجريبي: لم يتم ضبط مفتاح API.",
                "Offline mode: no API key configured."
            )
        );
    }

    let mut session = advisor.sessions().create_session();
    let mut history = ChatHistory::greeted(language);
    println!("{}: {}\n", speaker(Role::Assistant, language), language.greeting());

    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("{}: ", speaker(Role::User, language));
        let input = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break; // Ctrl+D
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        if let Some(command) = parse_command(input) {
            match command {
                Command::Quit => break,
                Command::Help => print_help(),
                Command::New => {
                    session = advisor.sessions().create_session();
                    history = ChatHistory::greeted(language);
                    println!("{}: {}\n", speaker(Role::Assistant, language), language.greeting());
                }
                Command::History => {
                    for message in history.messages() {
                        println!("{}: {}", speaker(message.role, language), message.text);
                    }
                    println!();
                }
                Command::Lang(next) => {
                    language = next;
                    println!("Language: {}\n", language);
                }
                Command::Unknown(name) => {
                    eprintln!("Unknown command: /{} (try /help)", name);
                }
            }
            continue;
        }

        history.push(ChatMessage::user(input));
        let reply = advisor
            .exchange()
            .send(session.as_mut(), input, language)
            .await;
        println!("\n{}: {}\n", speaker(Role::Assistant, language), reply);
        history.push(ChatMessage::assistant(reply));
    }

    Ok(())
}
