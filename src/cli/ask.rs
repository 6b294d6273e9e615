use anyhow::Result;
use clap::Args;

use ghiras::advisor::{Advisor, Language};
use ghiras::config::Config;

#[derive(Args)]
pub struct AskArgs {
    /// The question for the assistant
    pub question: String,

    /// UI language for fallback replies (overrides config)
    #[arg(short, long, value_enum)]
    pub lang: Option<Language>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: AskArgs, config: &Config) -> Result<()> {
    let language = args.lang.unwrap_or(config.chat.language);
    let advisor = Advisor::from_config(config)?;

    let mut session = advisor.sessions().create_session();
    let reply = advisor
        .exchange()
        .send(session.as_mut(), &args.question, language)
        .await;

    match args.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "question": args.question,
                "reply": reply,
                "language": language,
                "live": advisor.capability().is_available(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => println!("{}", reply),
    }

    Ok(())
}
