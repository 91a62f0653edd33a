use pokedex_lib::commands::{self, Command, Reply, HELP_TEXT};
use pokedex_lib::logger::init_logging;
use pokedex_lib::{ClientConfig, ClientConfigBuilder, PokedexResult, Session};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_CONFIG_PATH: &str = "pokedex.json";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("pokedex: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> PokedexResult<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ClientConfig::load(&config_path)?.with_env_overrides();
    let config = ClientConfigBuilder::from_config(config).build()?;

    init_logging(config.log_level);
    tracing::info!(
        api = %config.api_base_url,
        backend = ?config.backend,
        "starting pokedex client"
    );

    let session = Session::from_config(&config)?;
    session.start().await?;
    println!("{}", commands::render_catalog(&session)?);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}\n{}", e, HELP_TEXT);
                continue;
            }
        };

        match commands::execute(&session, command).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) if text.is_empty() => {}
            Ok(Reply::Text(text)) => println!("{}", text),
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
