//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use tracing::info;

use digger_core::config::Config;
use digger_core::generator::{TrackOutcome, VideoGenerator};
use digger_core::publisher::{PostOutcome, PublishRunner};
use digger_core::selector::{self, ReleaseFolder};
use digger_core::{
    ensure_discogs, ensure_instagram, ensure_storage, exporter, DiscogsClient, FfmpegTranscoder,
    GcsMediaStore, GraphApi, GraphClient, ReleaseRef, SanitizedConfig, YtDlpFetcher,
};

/// `digger generate <release>`: fetch metadata, export the text file and
/// render the per-track clips.
pub async fn cmd_generate(config: &Config, release_ref: &str, txt_only: bool) -> Result<()> {
    ensure_discogs(config)?;

    let release_ref = ReleaseRef::parse(release_ref)?;
    let client = DiscogsClient::new(config.discogs.clone())?;

    info!("fetching release metadata");
    let release = client.fetch_release(release_ref).await?;
    println!(
        "{} — {} ({} tracks)",
        release.artist_line(),
        release.title,
        release.tracks.len()
    );

    if txt_only {
        let folder = config.output.root.join(release.folder_name());
        let path = exporter::write_release_text(&folder, &release).await?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let generator = VideoGenerator::new(
        config.generator.clone(),
        FfmpegTranscoder::new(config.transcoder.clone()),
        YtDlpFetcher::new(config.fetcher.clone()),
        &config.discogs.user_agent,
    )?;

    let report = generator.run(&release, &config.output.root).await?;

    println!(
        "{}: {} generated, {} already present, {} failed",
        report.folder.display(),
        report.generated(),
        report.already_present(),
        report.failed()
    );
    if let Some(reason) = &report.cover_error {
        println!("Videos skipped: {}", reason);
    }
    for record in report.failures() {
        if let TrackOutcome::Failed { failure } = &record.outcome {
            println!("  track {:02} \"{}\": {}", record.position, record.title, failure);
        }
    }
    Ok(())
}

/// `digger list`: show folders the selector considers ready.
pub async fn cmd_list(config: &Config) -> Result<()> {
    let folders = selector::scan(&config.output.root)
        .await
        .context("Failed to scan output root")?;

    if folders.is_empty() {
        println!("No eligible folders under {}", config.output.root.display());
        return Ok(());
    }
    for folder in &folders {
        println!("{}  ({} videos)", folder.name, folder.videos.len());
    }
    Ok(())
}

/// `digger publish [name | --all]`: stage and post eligible folders.
pub async fn cmd_publish(config: &Config, name: Option<String>, all: bool) -> Result<()> {
    ensure_storage(config)?;
    ensure_instagram(config)?;

    let folders = selector::scan(&config.output.root)
        .await
        .context("Failed to scan output root")?;

    let targets: Vec<ReleaseFolder> = match (name, all) {
        (Some(name), _) => {
            let folder = folders
                .into_iter()
                .find(|f| f.name == name)
                .with_context(|| format!("No eligible folder named {:?}", name))?;
            vec![folder]
        }
        (None, true) => folders,
        (None, false) => bail!("Pass a folder name or --all"),
    };

    if targets.is_empty() {
        println!("Nothing to publish");
        return Ok(());
    }

    let store = GcsMediaStore::new(config.storage.clone())?;
    let graph = GraphClient::new(config.instagram.clone())?;
    let runner = PublishRunner::new(config.publisher.clone(), store, graph);

    for folder in &targets {
        let report = runner.publish_folder(folder).await;
        match &report.outcome {
            PostOutcome::Published(post) => {
                println!(
                    "{}: published as {} ({} items)",
                    report.folder_name,
                    post.media_id,
                    report.uploaded()
                );
            }
            PostOutcome::Aborted(reason) => {
                println!("{}: NOT published: {}", report.folder_name, reason);
            }
        }
    }
    Ok(())
}

/// `digger account`: one-time lookup of the business account id to put
/// into the configuration.
pub async fn cmd_account(config: &Config) -> Result<()> {
    let graph = GraphClient::new(config.instagram.clone())?;
    let accounts = graph.lookup_business_accounts().await?;

    if accounts.is_empty() {
        println!("No pages reachable with this token (needs pages_show_list)");
        return Ok(());
    }
    for account in &accounts {
        match (&account.ig_user_id, &account.ig_username) {
            (Some(id), Some(username)) => {
                println!(
                    "page {} ({}) -> IG_USER_ID={} username={}",
                    account.page_name, account.page_id, id, username
                );
            }
            (Some(id), None) => {
                println!(
                    "page {} ({}) -> IG_USER_ID={}",
                    account.page_name, account.page_id, id
                );
            }
            _ => {
                println!(
                    "page {} ({}) has no linked Instagram business account",
                    account.page_name, account.page_id
                );
            }
        }
    }
    Ok(())
}

/// `digger config`: print the effective configuration, secrets redacted.
pub fn cmd_config(config: &Config) -> Result<()> {
    let sanitized = SanitizedConfig::from(config);
    let rendered = toml::to_string_pretty(&sanitized).context("Failed to render config")?;
    println!("{}", rendered);
    Ok(())
}
