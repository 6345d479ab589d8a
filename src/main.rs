//! Prints a Google-issued id_token for an audience.
//!
//! With a desktop OAuth client:
//! ```text
//! google-id-token --audience=1071284184436-xxxx.apps.googleusercontent.com \
//!     --credential-file=creds.json --client-secrets-file=client_secret.json
//! ```
//! creds.json must already hold a refresh token from the browser login.
//!
//! With application default credentials:
//! ```text
//! google-id-token --audience=... --adc-file=$HOME/.config/gcloud/application_default_credentials.json
//! ```
//! Set RUST_LOG=debug to see cache decisions on stderr.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use google_id_token::{
    cache::CredentialCache,
    credentials::{AuthorizedUser, ClientSecrets},
    provider::IdTokenProvider,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "google-id-token")]
#[command(about = "Acquire a Google-issued OIDC id_token for an audience")]
#[command(version)]
struct Args {
    /// Audience for the token (the relying party's OAuth client id)
    #[arg(long, env = "GOOGLE_ID_TOKEN_AUDIENCE")]
    audience: String,

    /// Credential file caching access_token, id_token and refresh_token
    #[arg(long, default_value = "creds.json", env = "GOOGLE_ID_TOKEN_CREDENTIAL_FILE")]
    credential_file: PathBuf,

    /// client_secret.json of a desktop OAuth client
    #[arg(long, env = "GOOGLE_ID_TOKEN_CLIENT_SECRETS_FILE", conflicts_with = "adc_file")]
    client_secrets_file: Option<PathBuf>,

    /// Application default credentials file of type authorized_user
    #[arg(long, env = "GOOGLE_ID_TOKEN_ADC_FILE")]
    adc_file: Option<PathBuf>,

    /// Ignore a cached id_token and always exchange for a new one
    #[arg(long)]
    force_refresh: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(id_token) => println!("{}", id_token),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<String> {
    let cache = CredentialCache::new(&args.credential_file);

    let (builder, seed) = match (&args.adc_file, &args.client_secrets_file) {
        (Some(path), _) => {
            let adc = AuthorizedUser::from_file(path).context("read config")?;
            (adc.config_builder(&args.audience), Some(adc.refresh_token))
        }
        (None, Some(path)) => {
            let secrets = ClientSecrets::from_file(path).context("read config")?;
            (secrets.config_builder(&args.audience), None)
        }
        (None, None) => {
            anyhow::bail!("read config: --client-secrets-file or --adc-file must be set")
        }
    };
    let config = builder.build().context("read config")?;

    let mut provider = IdTokenProvider::new(cache).force_refresh(args.force_refresh);
    if let Some(seed) = seed {
        provider = provider.seed(seed);
    }

    let id_token = provider.id_token(&config).await.context(
        "acquire id_token; verify the client_id and the audience belong to the same GCP project",
    )?;
    Ok(id_token.value_as_str().to_string())
}
