use anyhow::Result;
use clap::{Parser, Subcommand};
use faceport_cli::config::AppConfig;
use faceport_cli::notice::{Notice, NoticeKind};
use faceport_cli::workflow::{CameraSettings, Controller};
use faceport_client::ApiClient;
use faceport_media::{Camera, PhotoLibrary};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "faceport", about = "Face registration and detection client")]
struct Cli {
    /// Path to a TOML config file (FACEPORT_CONFIG is also honored)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a name with a photo from the library
    Register {
        /// Name to register
        #[arg(short, long)]
        name: String,
        /// Photo to upload, absolute or relative to the library
        /// directory; omitting it cancels the pick
        #[arg(short, long)]
        photo: Option<PathBuf>,
    },
    /// Open the camera and run one detection round
    Detect,
    /// List registered users
    Users,
    /// Remove a registered user
    Remove {
        /// User id to remove
        id: String,
    },
    /// Show backend health and camera diagnostics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());
    let gateway = ApiClient::new(config.client_config())?;

    match cli.command {
        Commands::Register { name, photo } => {
            let mut controller = controller_for(gateway, &config);
            controller.set_name(name);
            if let Some(notice) = controller.pick_photo(photo.as_deref()) {
                finish(&notice);
            }
            finish(&controller.submit_registration().await);
        }
        Commands::Detect => {
            let mut controller = controller_for(gateway, &config);
            if let Some(denied) = controller.start_detection() {
                finish(&denied);
            }
            finish(&controller.run_detection().await);
        }
        Commands::Users => {
            let listing = gateway.list_users().await?;
            if listing.users.is_empty() {
                println!("No users registered");
            }
            for user in &listing.users {
                match &user.created_at {
                    Some(created) => println!("{}  {}  (registered {created})", user.id, user.name),
                    None => println!("{}  {}", user.id, user.name),
                }
            }
            println!("{} user(s) total", listing.total_count);
        }
        Commands::Remove { id } => {
            let message = gateway.remove_user(&id).await?;
            println!("{message}");
        }
        Commands::Status => {
            match gateway.health().await {
                Ok(health) => println!(
                    "backend: {} ({})",
                    health.status,
                    health.message.unwrap_or_default()
                ),
                Err(e) => println!("backend: unreachable ({e})"),
            }
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("cameras: none found");
            }
            for device in devices {
                println!("camera: {}  {} [{}]", device.path, device.name, device.driver);
            }
        }
    }

    Ok(())
}

fn controller_for(gateway: ApiClient, config: &AppConfig) -> Controller {
    let library = PhotoLibrary::open(
        config.library_dir.clone(),
        config.staging_dir.clone(),
        config.jpeg_quality,
        config.square_crop,
    );
    Controller::new(
        gateway,
        library,
        CameraSettings {
            device: config.camera_device.clone(),
            staging_dir: config.staging_dir.clone(),
            jpeg_quality: config.jpeg_quality,
            warmup_frames: config.warmup_frames,
        },
    )
}

/// Print a notice and exit non-zero for errors. Notices are terminal:
/// every command ends in exactly one.
fn finish(notice: &Notice) -> ! {
    println!("{notice}");
    if notice.kind == NoticeKind::Error {
        std::process::exit(1);
    }
    std::process::exit(0);
}
