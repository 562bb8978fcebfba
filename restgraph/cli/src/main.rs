//! Restgraph CLI - browse and drive a self-describing REST service

mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use restgraph_lib::{
    ChildProxy, ClientBuilder, Proxy, RestError, DEFAULT_API_ROOT, DEFAULT_PORT, DEFAULT_SCHEME,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Browse and drive a self-describing REST service.
///
/// The service schema is fetched from the host (or read from --schema) and
/// compiled into a tree of resources. Resource paths are written with `/`
/// separators, using object names for singletons and keys for collection
/// entries.
///
/// Examples:
///   restgraph --host nsc tree nsc/trunk
///   restgraph --host nsc call nsc/trunk list '{"status": "active"}'
///   restgraph --host nsc get nsc/trunk/T1 enabled
///   restgraph --host nsc set nsc/configuration interface eth0
#[derive(Debug, Parser)]
#[command(name = "restgraph")]
#[command(version)]
#[command(about = "Browse and drive a self-describing REST service")]
struct Cli {
    /// Host name of the service.
    #[arg(long, env = "RESTGRAPH_HOST")]
    host: String,

    /// Port of the service.
    #[arg(long, env = "RESTGRAPH_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// URL scheme (http or https).
    #[arg(long, env = "RESTGRAPH_SCHEME", default_value = DEFAULT_SCHEME)]
    scheme: String,

    /// REST root path on the service.
    #[arg(long, env = "RESTGRAPH_API_ROOT", default_value = DEFAULT_API_ROOT)]
    api_root: String,

    /// API key sent in the X-API-KEY header.
    #[arg(long, env = "RESTGRAPH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds (0 disables the timeout).
    #[arg(long, env = "RESTGRAPH_TIMEOUT", value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Read the schema from a file instead of fetching it.
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the raw schema to a file (sorted keys, 4-space indent)
    DumpDocs {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the members of a resource
    Tree {
        /// Resource path, e.g. nsc/trunk/T1 (default: the root)
        #[arg(value_name = "PATH", default_value = "")]
        path: String,
    },

    /// Show a resource as returned by retrieve (or list, for collections)
    Show {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Call a method on a resource
    Call {
        #[arg(value_name = "PATH")]
        path: String,

        #[arg(value_name = "METHOD")]
        method: String,

        /// Arguments, parsed as JSON when possible and as strings otherwise
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Read a property of a resource
    Get {
        #[arg(value_name = "PATH")]
        path: String,

        #[arg(value_name = "PROPERTY")]
        property: String,
    },

    /// Write a property of a resource
    Set {
        #[arg(value_name = "PATH")]
        path: String,

        #[arg(value_name = "PROPERTY")]
        property: String,

        /// New value, parsed as JSON when possible and as a string otherwise
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Rest(#[from] RestError),

    #[error("'{0}' is a collection; index it with a key first")]
    NotAResource(String),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,restgraph_lib=info".to_string(),
            2 => "info,restgraph_lib=debug".to_string(),
            _ => "debug,restgraph_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn client_builder(cli: &Cli) -> ClientBuilder {
    let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));

    let mut builder = ClientBuilder::new(&cli.host)
        .port(cli.port)
        .scheme(&cli.scheme)
        .api_root(&cli.api_root)
        .timeout(timeout);

    if let Some(api_key) = &cli.api_key {
        builder = builder.api_key(api_key);
    }
    if let Some(schema) = &cli.schema {
        builder = builder.schema_file(schema);
    }
    builder
}

/// Splits `nsc/trunk/T1` into segments; an empty path is the root.
fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Parses a command line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn resolve(root: &ChildProxy, path: &str) -> Result<Proxy, CliError> {
    Ok(root.walk(&split_path(path))?)
}

fn resource(root: &ChildProxy, path: &str) -> Result<ChildProxy, CliError> {
    match resolve(root, path)? {
        Proxy::Child(child) => Ok(child),
        Proxy::Collection(_) => Err(CliError::NotAResource(path.to_string())),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let client = client_builder(&cli).build()?;

    if let Commands::DumpDocs { file } = &cli.command {
        client.dump_docs(file)?;
        println!("{}", file.display());
        return Ok(());
    }

    let root = client.connect()?;
    debug!(root = root.type_name(), "Compiled resource tree");

    match &cli.command {
        Commands::DumpDocs { .. } => {}
        Commands::Tree { path } => {
            let node = resolve(&root, path)?;
            print!("{}", output::render_tree(&node));
        }
        Commands::Show { path } => {
            println!("{}", resolve(&root, path)?.repr()?);
        }
        Commands::Call { path, method, args } => {
            let args: Vec<Value> = args.iter().map(|a| parse_value(a)).collect();
            let result = resolve(&root, path)?.invoke(method, &args)?;
            if let Some(rendered) = output::render_call(result)? {
                println!("{rendered}");
            }
        }
        Commands::Get { path, property } => {
            let value = resource(&root, path)?.get_property(property)?;
            println!("{}", output::render_value(&value)?);
        }
        Commands::Set {
            path,
            property,
            value,
        } => {
            resource(&root, path)?.set_property(property, parse_value(value))?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let CliError::Rest(rest) = &err {
                for reason in rest.reasons() {
                    eprintln!("  - {}: {}", reason.module, reason);
                }
            }
            ExitCode::FAILURE
        }
    }
}
