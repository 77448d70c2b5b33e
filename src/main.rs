//! wme-shortcuts - offline driver for the demo shortcuts
//!
//! Runs the four demo shortcuts against an in-process host and the
//! file-backed local storage, so persistence can be exercised from a shell.
//!
//! # Usage
//!
//! ```bash
//! wme-shortcuts commands
//! wme-shortcuts run --seconds 5 --rebind wme-demo-auto=2,88
//! wme-shortcuts invoke default-override-save
//! wme-shortcuts show
//! wme-shortcuts logs
//! wme-shortcuts decode 4,56
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use wme_shortcuts::config::{self, KitConfig};
use wme_shortcuts::demo::{self, DemoKit};
use wme_shortcuts::host::{InMemoryHost, Notifier, ShortcutHost, TracingNotifier};
use wme_shortcuts::logging;
use wme_shortcuts::shortcuts::{PersistedShortcutConfig, SchemeName};
use wme_shortcuts::storage::{JsonFileStore, KeyValueStore};

#[derive(Parser)]
#[command(name = "wme-shortcuts")]
#[command(about = "Persisted keyboard shortcuts for the map editor, driven offline", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file (default: ~/.wme-shortcuts/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the save/reset commands
    Commands,

    /// Start the demo shortcuts and keep auto-save running for a while
    Run {
        /// How long to keep running
        #[arg(long, default_value = "10")]
        seconds: u64,

        /// Simulate a user rebind after startup: <shortcut-id>=<mask>,<keycode>
        #[arg(long, value_name = "ID=CHORD")]
        rebind: Vec<String>,
    },

    /// Start the demo shortcuts, then run the named commands in order
    Invoke {
        /// Command names, e.g. manual-save default-auto-reset
        #[arg(required = true)]
        names: Vec<String>,

        /// Simulate a user rebind before the commands run: <shortcut-id>=<mask>,<keycode>
        #[arg(long, value_name = "ID=CHORD")]
        rebind: Vec<String>,
    },

    /// Print the persisted record of every demo shortcut
    Show,

    /// Start the demo shortcuts and print the startup trace, oldest first
    Logs,

    /// Decode a numeric chord such as 4,56
    Decode {
        numeric: String,

        /// Modifier bit mapping (defaults to the configured one)
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SchemeArg {
    DemoScript,
    Guide,
}

impl From<SchemeArg> for SchemeName {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::DemoScript => SchemeName::DemoScript,
            SchemeArg::Guide => SchemeName::Guide,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    match cli.command {
        Commands::Commands => {
            let (kit, _host) = bootstrap(&config)?;
            for name in kit.commands().names() {
                println!("{}", name);
            }
            kit.shutdown();
        }
        Commands::Run { seconds, rebind } => {
            let (kit, host) = bootstrap(&config)?;
            apply_rebinds(&host, &rebind)?;
            info!(seconds, "Running auto-save");
            std::thread::sleep(Duration::from_secs(seconds));
            kit.shutdown();
            print_records(&config)?;
        }
        Commands::Invoke { names, rebind } => {
            let (kit, host) = bootstrap(&config)?;
            apply_rebinds(&host, &rebind)?;
            for name in &names {
                kit.commands()
                    .invoke(name)
                    .with_context(|| format!("Failed to invoke '{}'", name))?;
            }
            kit.shutdown();
            print_records(&config)?;
        }
        Commands::Show => print_records(&config)?,
        Commands::Logs => {
            let (kit, _host) = bootstrap(&config)?;
            kit.shutdown();
            for line in logging::get_recent_logs() {
                println!("{}", line);
            }
            return Ok(());
        }
        Commands::Decode { numeric, scheme } => {
            let scheme = scheme.map(SchemeName::from).unwrap_or(config.modifier_scheme);
            match scheme.scheme().decode(Some(&numeric)) {
                Some(chord) => println!("{}", chord),
                None => bail!("'{}' is not a <mask>,<keycode> chord", numeric),
            }
        }
    }

    for line in logging::get_last_logs(5).into_iter().rev() {
        eprintln!("{}", line);
    }
    Ok(())
}

fn bootstrap(config: &KitConfig) -> Result<(DemoKit, Arc<InMemoryHost>)> {
    let host = Arc::new(InMemoryHost::with_scheme(config.modifier_scheme.scheme()));
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(config.storage_path()));
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    let (kit, _reports) = DemoKit::bootstrap(host.clone(), store, Some(notifier), config)
        .map_err(|e| {
            if demo::is_not_ready(&e) {
                anyhow::anyhow!("host SDK never became ready: {}", e)
            } else {
                anyhow::Error::new(e)
            }
        })?;
    Ok((kit, host))
}

fn apply_rebinds(host: &InMemoryHost, rebinds: &[String]) -> Result<()> {
    for rebind in rebinds {
        let (id, numeric) = rebind
            .split_once('=')
            .with_context(|| format!("Expected <shortcut-id>=<mask>,<keycode>, got '{}'", rebind))?;
        if host.find_shortcut(id).is_none() {
            bail!("No shortcut registered with id '{}'", id);
        }
        host.set_chord_numeric(id, numeric)
            .with_context(|| format!("'{}' is not a <mask>,<keycode> chord", numeric))?;
        logging::log("REBIND", &format!("{} -> {}", id, numeric));
    }
    Ok(())
}

fn print_records(config: &KitConfig) -> Result<()> {
    let store = JsonFileStore::new(config.storage_path());
    let scheme = config.modifier_scheme.scheme();
    for action in demo::demo_actions(config) {
        let key = &action.spec.storage_key;
        let record = PersistedShortcutConfig::load(&store, key)?;
        match record.and_then(|r| r.shortcut_keys) {
            Some(numeric) => println!(
                "{:<18} {:<8} {}",
                action.prefix,
                numeric,
                scheme.decode(Some(&numeric)).unwrap_or_else(|| "?".to_string())
            ),
            None => println!("{:<18} (not saved)", action.prefix),
        }
    }
    Ok(())
}
