use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use souq_client::{
    telemetry, ApiClient, AuthScheme, ClientOptions, HealthCheckPolicy, ProfileDraft,
    ProfileStorage, ProfileStore, RequestOptions, Resource, TokenStore,
};

#[derive(Parser)]
#[command(
    name = "souq",
    version,
    about = "Manage Souq backend profiles and issue API requests"
)]
struct Cli {
    /// Storage directory for profile documents (defaults to the platform
    /// config dir).
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all profiles.
    List,
    /// Show one profile as JSON.
    Show { id: String },
    /// Show the profile requests currently go to.
    Active,
    /// Add a profile.
    Add(AddArgs),
    /// Remove a profile.
    Remove { id: String },
    /// Select the active profile.
    Use { id: String },
    /// Probe a profile's health endpoint (the active one when omitted).
    Test { id: Option<String> },
    /// Print the whole collection as JSON.
    Export,
    /// Import profiles from a JSON file.
    Import { file: PathBuf },
    /// Replace the collection with the seeded local profile.
    Reset,
    /// Issue a raw request through the active profile.
    Request {
        method: String,
        path: String,
        /// JSON request body.
        #[arg(long)]
        data: Option<String>,
        /// Attach the profile's authentication header.
        #[arg(long)]
        auth: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    name: String,
    base_url: String,
    /// Make this profile the default.
    #[arg(long)]
    default: bool,
    /// Create the profile unselectable.
    #[arg(long)]
    inactive: bool,
    /// Per-resource path override, e.g. `stores=/v2/stores`. Repeatable.
    #[arg(long = "endpoint", value_name = "RESOURCE=PATH")]
    endpoints: Vec<String>,
    /// Static header sent on every request, e.g. `x-tenant=alpha`. Repeatable.
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,
    /// Authentication: `none`, `bearer`, `apikey:HEADER=VALUE` or
    /// `basic:USER:PASS`.
    #[arg(long, default_value = "none")]
    auth: String,
    /// Request timeout in milliseconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// Transport retry attempts.
    #[arg(long)]
    retries: Option<u32>,
    /// Health-check path (default `/health`).
    #[arg(long)]
    health_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let storage = match &cli.storage_dir {
        Some(dir) => ProfileStorage::new(dir.clone()),
        None => ProfileStorage::new(ProfileStorage::default_dir()),
    };
    let profiles = ProfileStore::open(storage);
    let tokens = TokenStore::new();
    if let Ok(token) = std::env::var("SOUQ_TOKEN") {
        tokens.set(token);
    }
    let client = ApiClient::new(profiles.clone(), tokens, ClientOptions::default());

    match cli.command {
        Command::List => {
            let active_id = profiles.get_active().map(|p| p.id);
            for profile in profiles.list_all() {
                let default = if profile.is_default { "*" } else { " " };
                let active = if Some(&profile.id) == active_id.as_ref() {
                    ">"
                } else {
                    " "
                };
                println!(
                    "{active}{default} {}  {}  {}",
                    profile.id, profile.name, profile.base_url
                );
            }
        }
        Command::Show { id } => {
            let profile = profiles.get(&id).context("no such profile")?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Active => match profiles.get_active() {
            Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
            None => println!("no active profile"),
        },
        Command::Add(args) => {
            let draft = build_draft(args)?;
            let id = profiles.add(draft)?;
            println!("{id}");
        }
        Command::Remove { id } => {
            if !profiles.delete(&id)? {
                bail!("profile not removed (unknown id, or it is the last default profile)");
            }
        }
        Command::Use { id } => {
            if !profiles.set_active(&id)? {
                bail!("profile not selectable (unknown id or not active)");
            }
        }
        Command::Test { id } => {
            let profile = match id {
                Some(id) => profiles.get(&id).context("no such profile")?,
                None => profiles.get_active().context("no active profile")?,
            };
            let report = client.test_profile(&profile).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Command::Export => println!("{}", profiles.export_all()?),
        Command::Import { file } => {
            let payload = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let report = profiles.import_all(&payload)?;
            println!(
                "imported {} profile(s), skipped {}",
                report.accepted, report.rejected
            );
        }
        Command::Reset => profiles.reset_to_defaults()?,
        Command::Request {
            method,
            path,
            data,
            auth,
        } => {
            let method = method
                .to_uppercase()
                .parse::<reqwest::Method>()
                .context("invalid HTTP method")?;
            let body = data
                .map(|d| serde_json::from_str(&d).context("request body is not valid JSON"))
                .transpose()?;
            let opts = RequestOptions {
                auth,
                headers: Vec::new(),
            };
            let value = client.request(method, &path, body, opts).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn build_draft(args: AddArgs) -> Result<ProfileDraft> {
    let mut draft = ProfileDraft::new(args.name, args.base_url);
    draft.is_default = args.default;
    draft.is_active = !args.inactive;
    draft.timeout = args.timeout;
    draft.retries = args.retries;
    draft.authentication = parse_auth(&args.auth)?;
    if let Some(path) = args.health_path {
        draft.health_check = Some(HealthCheckPolicy {
            path,
            ..HealthCheckPolicy::default()
        });
    }

    for entry in &args.endpoints {
        let (resource, path) = split_pair(entry, '=')
            .with_context(|| format!("invalid --endpoint '{entry}', expected RESOURCE=PATH"))?;
        let resource =
            Resource::parse(resource).with_context(|| format!("unknown resource '{resource}'"))?;
        draft.endpoints.insert(resource, path.to_string());
    }

    for entry in &args.headers {
        let (name, value) = split_pair(entry, '=')
            .with_context(|| format!("invalid --header '{entry}', expected NAME=VALUE"))?;
        draft.headers.insert(name.to_string(), value.to_string());
    }

    Ok(draft)
}

fn parse_auth(arg: &str) -> Result<AuthScheme> {
    if arg == "none" {
        return Ok(AuthScheme::None);
    }
    if arg == "bearer" {
        return Ok(AuthScheme::Bearer);
    }
    if let Some(rest) = arg.strip_prefix("apikey:") {
        let (header, value) =
            split_pair(rest, '=').context("apikey auth expects apikey:HEADER=VALUE")?;
        return Ok(AuthScheme::ApiKey {
            header: header.to_string(),
            value: value.to_string(),
        });
    }
    if let Some(rest) = arg.strip_prefix("basic:") {
        let (username, password) =
            split_pair(rest, ':').context("basic auth expects basic:USER:PASS")?;
        return Ok(AuthScheme::Basic {
            username: username.to_string(),
            password: password.to_string(),
        });
    }
    bail!("unknown auth scheme '{arg}'");
}

fn split_pair(s: &str, sep: char) -> Option<(&str, &str)> {
    let idx = s.find(sep)?;
    Some((&s[..idx], &s[idx + 1..]))
}
