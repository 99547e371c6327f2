//! Command-line front end
//!
//! Every subcommand except `register` starts a fresh cookie session with
//! the configured credentials, builds the view it needs, and ends the
//! session again. Nothing is persisted between invocations.

use crate::http::ApiClient;
use crate::library::{NewMusic, Upload};
use crate::resource::{BlobHandle, BlobStore};
use crate::session;
use crate::views::{AuthView, LibraryView, PlayerView};
use anyhow::{Context, Result};
use bw_common::api::{MetadataUpdate, MusicId, RegisterRequest};
use bw_common::config::{ClientConfig, ConfigOverrides, ENV_CONFIG_PATH};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Command-line arguments for bw-client
#[derive(Parser, Debug)]
#[command(name = "bw-client")]
#[command(about = "Command-line client for the Blue Waves music library")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    /// REST base URL, e.g. http://localhost:8080/api/v1
    #[arg(long)]
    pub api_url: Option<String>,

    /// Account email
    #[arg(long, env = "BLUEWAVES_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "BLUEWAVES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// List the library
    List,
    /// Upload a track
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        /// Audio file to upload
        file: PathBuf,
    },
    /// Change title/artist and/or replace the cover art
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        /// Image file to use as the new cover art
        #[arg(long)]
        cover_art: Option<PathBuf>,
    },
    /// Remove a track
    Delete { id: String },
    /// Save a track's cover art
    CoverArt {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Save a track's audio (and optionally its poster)
    Download {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        poster: Option<PathBuf>,
    },
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            api_base_url: self.api_url.clone(),
            email: self.email.clone(),
        }
    }
}

/// Run one subcommand against the configured server
pub async fn run(args: Args, config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(config)?;
    let email = config
        .email
        .clone()
        .context("No email given (use --email, BLUEWAVES_EMAIL or the config file)")?;
    let password = args
        .password
        .clone()
        .context("No password given (use --password or BLUEWAVES_PASSWORD)")?;

    if let Command::Register {
        first_name,
        last_name,
    } = args.command
    {
        let request = RegisterRequest {
            email,
            password,
            first_name,
            last_name,
        };
        let next = AuthView::new(api).register(&request).await?;
        println!("Account created, continue at {}", next);
        return Ok(());
    }

    AuthView::new(api.clone()).login(&email, &password).await?;

    let blobs = BlobStore::new();
    let result = execute(&api, &blobs, args.command).await;

    if let Err(err) = session::logout(&api, None).await {
        warn!(error = %err, "Logout failed");
    }
    result
}

async fn execute(api: &ApiClient, blobs: &BlobStore, command: Command) -> Result<()> {
    match command {
        Command::Register { .. } => anyhow::bail!("register runs without a session"),
        Command::List => {
            let view = LibraryView::new(api.clone(), blobs.clone());
            for entry in view.load().await? {
                println!("{}\t{}\t{}", entry.music_id, entry.title, entry.artist);
            }
        }
        Command::Add {
            title,
            artist,
            file,
        } => {
            let view = LibraryView::new(api.clone(), blobs.clone());
            let upload = Upload::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let created = view
                .add(NewMusic {
                    title,
                    artist,
                    file: upload,
                })
                .await?;
            println!("Added {}", created.music_id);
        }
        Command::Update {
            id,
            title,
            artist,
            cover_art,
        } => {
            let id = MusicId::new(id);
            let view = LibraryView::new(api.clone(), blobs.clone());

            let metadata = if title.is_some() || artist.is_some() {
                let entries = view.load().await?;
                let current = entries
                    .iter()
                    .find(|entry| entry.music_id == id)
                    .with_context(|| format!("No library entry with id {}", id))?;
                Some(MetadataUpdate {
                    title: title.unwrap_or_else(|| current.title.clone()),
                    artist: artist.unwrap_or_else(|| current.artist.clone()),
                })
            } else {
                None
            };

            let art = match cover_art {
                Some(path) => Some(
                    Upload::from_path(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };

            let outcome = view
                .submit_edit(&id, metadata, art, || println!("Saved {}", id))
                .await?;
            if let Some(change) = outcome.metadata {
                println!("{}\t{}\t{}", change.music_id, change.title, change.artist);
            }
            if outcome.cover_art_replaced {
                println!("Cover art replaced");
            }
        }
        Command::Delete { id } => {
            let id = MusicId::new(id);
            let view = LibraryView::new(api.clone(), blobs.clone());
            view.delete(&id).await?;
            println!("Deleted {}", id);
        }
        Command::CoverArt { id, output } => {
            let view = LibraryView::new(api.clone(), blobs.clone());
            let art = view.cover_art(&MusicId::new(id)).await?;
            save_blob(&art, &output).await?;
        }
        Command::Download { id, output, poster } => {
            let view = PlayerView::new(api.clone(), blobs.clone());
            let media = view.load(&MusicId::new(id)).await?;
            save_blob(&media.audio, &output).await?;

            match (poster, media.poster) {
                (Some(path), Some(handle)) => save_blob(&handle, &path).await?,
                (Some(_), None) => warn!("No cover art to save"),
                _ => {}
            }
        }
    }
    Ok(())
}

async fn save_blob(handle: &BlobHandle, path: &Path) -> Result<()> {
    let blob = handle
        .read()
        .with_context(|| format!("Blob {} was released before it was saved", handle.url()))?;
    tokio::fs::write(path, &blob.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {} bytes to {}", blob.bytes.len(), path.display());
    Ok(())
}
