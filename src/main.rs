mod cli;

use memories::{
    auth::{self, AuthService},
    config::{self, Config},
    ingest::{AssetOutcome, BatchReport, IngestionService},
    storage::AssetBucket,
    store::LocalContentStore,
};
use memories_common::{Asset, Collection, RowId, SiteContentUpdate};
use memories_db::pool::{init_pool, DbPool};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ContentCommand, ContentFields, GalleryCommand, SliderCommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs: config, database and the ingestion service.
struct App {
    config: Config,
    pool: DbPool,
    service: IngestionService,
}

impl App {
    fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = config::load_config_or_default(config_path)?;

        std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {:?}",
                config.storage.data_dir
            )
        })?;

        let db_path = config.storage.db_path();
        let db_path_str = db_path.to_string_lossy();
        tracing::debug!("Opening database at {}", db_path_str);
        let pool = init_pool(&db_path_str)?;

        let bucket = AssetBucket::new(
            config.storage.bucket_root(),
            config.storage.public_base_url.clone(),
        );
        let mut store = LocalContentStore::new(pool.clone(), bucket);
        if let Some(token) = auth::load_session_token(&config.storage.session_file())? {
            store = store.with_session_token(token);
        }

        let service = IngestionService::new(
            Arc::new(store),
            config.storage.bucket.clone(),
            config.ingest.clone(),
        );

        Ok(Self {
            config,
            pool,
            service,
        })
    }

    fn auth(&self) -> AuthService {
        AuthService::new(self.pool.clone(), self.config.auth.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "memories=debug,memories_db=debug,memories_common=debug".to_string()
        } else {
            "memories=info,memories_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or_else(|| cli.config.clone());
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("memories {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Signup { email, password } => {
            let app = App::open(config_path)?;
            let user = app.auth().sign_up(&email, &password)?;
            println!("Created account {} ({})", user.email, user.id);
            Ok(())
        }
        Commands::Login { email, password } => login(config_path, &email, &password),
        Commands::Logout => logout(config_path),
        command => {
            let app = App::open(config_path)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_content_command(&app, command))
        }
    }
}

fn login(config_path: Option<&Path>, email: &str, password: &str) -> Result<()> {
    let app = App::open(config_path)?;
    let session = app.auth().login(email, password)?;
    auth::save_session_token(&app.config.storage.session_file(), &session.token)
        .context("Failed to save session token")?;
    println!("Signed in until {}", session.expires_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

fn logout(config_path: Option<&Path>) -> Result<()> {
    let app = App::open(config_path)?;
    let session_file = app.config.storage.session_file();
    match auth::load_session_token(&session_file)? {
        Some(token) => {
            app.auth().logout(&token)?;
            auth::clear_session_token(&session_file)?;
            println!("Signed out");
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

async fn run_content_command(app: &App, command: Commands) -> Result<()> {
    let service = &app.service;
    match command {
        Commands::Content { action } => match action {
            ContentCommand::Show { json } => {
                let content = service.site_content().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&content)?);
                } else {
                    println!("Couple: {}", content.couple_name);
                    println!("Since: {}", content.start_date);
                    println!("Subtitle: {}", content.hero_subtitle);
                    println!(
                        "Hero: {} ({}%)",
                        content.hero_image_url, content.hero_image_position
                    );
                    println!("Updated: {}", content.updated_at.to_rfc3339());
                }
            }
            ContentCommand::Update(fields) => {
                let content = service.update_site_content(fields.into_update()).await?;
                println!("Site content updated at {}", content.updated_at.to_rfc3339());
            }
            ContentCommand::Hero { file } => {
                let content = service.replace_hero_image(read_asset(&file)?).await?;
                println!("Hero image: {}", content.hero_image_url);
            }
        },
        Commands::Slider { action } => match action {
            SliderCommand::List { json } => {
                let items = service.slider_items().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&items)?);
                } else {
                    for item in &items {
                        println!(
                            "{:>3}  {}  {}  {}",
                            item.position, item.id, item.caption, item.image_url
                        );
                    }
                }
            }
            SliderCommand::Add { files } => {
                let report = service.ingest(read_assets(&files)?, Collection::Slider).await?;
                print_report(&report)?;
            }
            SliderCommand::Replace { position, file } => {
                let stored = service
                    .replace_slider_image(position, read_asset(&file)?)
                    .await?;
                println!("Slide {} now shows {}", position, stored.public_url);
            }
            SliderCommand::Caption { id, caption } => {
                service.update_slider_caption(id, &caption).await?;
                println!("Caption updated");
            }
            SliderCommand::Delete { ids } => delete(service, Collection::Slider, &ids).await?,
        },
        Commands::Gallery { action } => match action {
            GalleryCommand::List { json } => {
                let items = service.gallery_items().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&items)?);
                } else {
                    for item in &items {
                        println!("{:>3}  {}  {}", item.order, item.id, item.image_url);
                    }
                }
            }
            GalleryCommand::Add { files } => {
                let report = service
                    .ingest(read_assets(&files)?, Collection::Gallery)
                    .await?;
                print_report(&report)?;
            }
            GalleryCommand::Delete { ids } => delete(service, Collection::Gallery, &ids).await?,
        },
        Commands::Repair { collection } => {
            let rewritten = service.repair_order(collection).await?;
            println!("Renumbered {} {}", rewritten, collection.noun(rewritten));
        }
        _ => anyhow::bail!("command does not operate on site content"),
    }
    Ok(())
}

async fn delete(service: &IngestionService, collection: Collection, ids: &[RowId]) -> Result<()> {
    let deleted = service.delete_items(collection, ids).await?;
    println!("Deleted {} {}", deleted, collection.noun(deleted));
    Ok(())
}

fn print_report(report: &BatchReport) -> Result<()> {
    for outcome in &report.outcomes {
        match outcome {
            AssetOutcome::Added { filename, key, .. } => println!("  ✓ {} -> {}", filename, key),
            AssetOutcome::Failed {
                filename, failure, ..
            } => println!("  ✗ {}: {}", filename, failure),
        }
    }

    if report.success_count == 0 && report.fail_count > 0 {
        anyhow::bail!("{}", report.summary());
    }
    println!("{}", report.summary());
    Ok(())
}

fn read_asset(path: &Path) -> Result<Asset> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Asset::new(filename, bytes))
}

fn read_assets(paths: &[PathBuf]) -> Result<Vec<Asset>> {
    paths.iter().map(|p| read_asset(p)).collect()
}

impl ContentFields {
    fn into_update(self) -> SiteContentUpdate {
        SiteContentUpdate {
            couple_name: self.couple_name,
            start_date: self.start_date,
            about_text: self.about,
            letter_text: self.letter,
            hero_subtitle: self.subtitle,
            hero_image_url: None,
            hero_image_position: self.hero_position,
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("  Data dir: {}", config.storage.data_dir.display());
    println!("  Bucket: {}", config.storage.bucket);
    println!("  Public URL: {}", config.storage.public_base_url);
    println!(
        "  Inter-asset delay: {}ms",
        config.ingest.inter_asset_delay_ms
    );
    println!("  Asset timeout: {}s", config.ingest.asset_timeout_secs);
    println!("  Auto repair: {}", config.ingest.auto_repair);
    println!("  Session timeout: {}h", config.auth.session_timeout_hours);
}
