use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

use beacon_translate::languages::{self, LANGUAGES};
use beacon_translate::{
    ApiServerBuilder, Config, ControllerBuilder, Notice, Severity, TranslationClient,
};

/// Beacon Translate - Voice translation front end and DeepL proxy
#[derive(Parser)]
#[command(name = "beacon-translate", version, about)]
struct Cli {
    /// Port for the translation proxy
    #[arg(long, env = "BEACON_TRANSLATE_PORT")]
    port: Option<u16>,

    /// Config file (defaults to ~/.config/omni/beacon-translate/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the translation proxy (default)
    Serve,
    /// Translate text once through the proxy
    Translate {
        /// Text to translate
        text: String,
        /// Target language code (e.g. ES)
        #[arg(short, long)]
        to: String,
        /// Proxy base URL
        #[arg(long, env = "BEACON_TRANSLATE_PROXY_URL")]
        proxy: Option<String>,
    },
    /// List supported languages
    Languages,
    /// Interactive translation session
    Session {
        /// Source language code
        #[arg(long)]
        from: Option<String>,
        /// Target language code
        #[arg(long)]
        to: Option<String>,
        /// Proxy base URL
        #[arg(long, env = "BEACON_TRANSLATE_PROXY_URL")]
        proxy: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,beacon_translate=info",
        1 => "info,beacon_translate=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Translate { text, to, proxy } => {
            let proxy = proxy.unwrap_or_else(|| config.client.proxy_url.clone());
            translate_once(&proxy, &text, &to).await
        }
        Command::Languages => {
            list_languages();
            Ok(())
        }
        Command::Session { from, to, proxy } => {
            let from = from.unwrap_or_else(|| config.client.source_language.clone());
            let to = to.unwrap_or_else(|| config.client.target_language.clone());
            let proxy = proxy.unwrap_or_else(|| config.client.proxy_url.clone());
            session(&proxy, &from, &to).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.api_server.port,
        host = %config.api_server.host,
        "starting beacon translate proxy"
    );

    let server = ApiServerBuilder::new(config.deepl, config.api_server.port)
        .server_config(&config.api_server)
        .build();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

async fn translate_once(proxy: &str, text: &str, to: &str) -> anyhow::Result<()> {
    let code = to.to_uppercase();
    if !languages::is_supported(&code) {
        anyhow::bail!("unsupported language code: {to}");
    }

    let client = TranslationClient::new(proxy);
    let translated = client.translate(text, &code).await?;
    println!("{translated}");

    Ok(())
}

fn list_languages() {
    for lang in LANGUAGES {
        println!("{:<4} {:<12} {}", lang.code, lang.name, lang.speech_locale());
    }
}

#[allow(clippy::future_not_send)]
async fn session(proxy: &str, from: &str, to: &str) -> anyhow::Result<()> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    for code in [&from, &to] {
        if !languages::is_supported(code) {
            anyhow::bail!("unsupported language code: {code}");
        }
    }

    // A terminal has no speech engines; the adapters report that once
    let client = TranslationClient::new(proxy);
    let (mut controller, mut notices) = ControllerBuilder::new(Arc::new(client))
        .languages(from.as_str(), to.as_str())
        .build();

    println!(
        "Translating {} -> {}. Type text to translate, or :help for commands.",
        languages::lookup(&from).name,
        languages::lookup(&to).name,
    );
    print_notices(&mut notices);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim().to_uppercase();

        match command {
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":listen" => controller.toggle_listening(),
            ":speak" => {
                // Already surfaced as a notice
                let _ = controller.speak();
            }
            ":clear" => controller.clear_source(),
            ":reset" => controller.reset(),
            ":from" if languages::is_supported(&arg) => controller.set_source_language(&arg),
            ":to" if languages::is_supported(&arg) => controller.set_target_language(&arg),
            ":from" | ":to" => println!("unsupported language code: {arg}"),
            ":state" => println!("{:#?}", controller.state()),
            "" => {}
            _ => {
                controller.set_source_text(line);
                if let Ok(translated) = controller.translate().await {
                    println!("{translated}");
                }
            }
        }

        print_notices(&mut notices);
    }

    controller.reset();
    Ok(())
}

fn print_notices(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        let marker = match notice.severity {
            Severity::Info => "i",
            Severity::Error => "!",
        };
        eprintln!("[{marker}] {}: {}", notice.title, notice.description);
    }
}

fn print_help() {
    println!("  <text>      translate text");
    println!("  :from CODE  set source language");
    println!("  :to CODE    set target language");
    println!("  :listen     start/stop speech capture");
    println!("  :speak      speak the translation");
    println!("  :clear      clear the source text");
    println!("  :reset      clear everything");
    println!("  :state      show session state");
    println!("  :quit       exit");
}
