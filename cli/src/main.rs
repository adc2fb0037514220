use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use gallery_session::config::{DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, default_state_dir};
use gallery_session::gallery::Gallery;
use gallery_session::validate::{self, FieldError};
use gallery_session::{
    ApiError, ClientConfig, ClientError, ConfigError, DenyReason, FailureClass, GalleryClient, ImageUpload, Level,
    Navigator, Notice, Notifier, SignupForm, Verdict, View,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("invalid input: {}", join_fields(.0))]
    Invalid(Vec<FieldError>),
    #[error("access to {view} denied ({reason:?}); run `gallery login` first")]
    AccessDenied { view: View, reason: DenyReason },
    #[error("cannot read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("no image at position {0}")]
    NoSuchPosition(usize),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl CliError {
    /// Failed HTTP calls were already shown by the console notifier.
    fn already_notified(&self) -> bool {
        match self {
            CliError::Api(e) => {
                !matches!(e.class(), FailureClass::Rejected | FailureClass::Decode | FailureClass::Internal)
            }
            _ => false,
        }
    }
}

impl From<Vec<FieldError>> for CliError {
    fn from(errors: Vec<FieldError>) -> Self {
        CliError::Invalid(errors)
    }
}

#[derive(Parser, Debug)]
#[command(name = "gallery", about = "Image gallery client")]
struct Cli {
    #[arg(long, env = "GALLERY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "GALLERY_STATE_DIR", help = "Where the token and session are kept")]
    state_dir: Option<PathBuf>,

    #[arg(long, env = "GALLERY_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GALLERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, env = "GALLERY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Print the stored session.
    Whoami,
    ResetPassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Images(ImagesCommand),
}

#[derive(Args, Debug)]
struct ImagesCommand {
    #[command(subcommand)]
    command: ImagesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ImagesSubcommand {
    List,
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// One per file, in order.
        #[arg(long = "title")]
        titles: Vec<String>,
    },
    Delete {
        image_id: String,
    },
    Edit {
        image_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Swap two images by display position and save the new order.
    Swap {
        from: usize,
        to: usize,
    },
    Rearrange {
        #[arg(required = true)]
        order: Vec<String>,
    },
}

impl Command {
    /// The view a command stands in for; protected views pass the guard first.
    fn view(&self) -> View {
        match self {
            Command::Login { .. } | Command::Logout | Command::Whoami => View::Login,
            Command::Signup { .. } => View::Signup,
            Command::ResetPassword { .. } => View::ResetPassword,
            Command::Images(images) => match images.command {
                ImagesSubcommand::Upload { .. } => View::AddImage,
                _ => View::Home,
            },
        }
    }
}

/// Prints notices to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            Level::Success => eprintln!("{}", notice.message),
            Level::Error => eprintln!("error: {}", notice.message),
        }
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect(&self, view: View) {
        tracing::debug!(%view, "redirect");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.already_notified() {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::new(
        &cli.base_url,
        cli.state_dir.unwrap_or_else(default_state_dir),
        cli.connect_timeout_secs,
    )?;
    let client = GalleryClient::open(config, Arc::new(ConsoleNotifier), Arc::new(ConsoleNavigator))?;

    let view = cli.command.view();
    if let Verdict::Deny(reason) = client.enter(view) {
        return Err(CliError::AccessDenied { view, reason });
    }

    match cli.command {
        Command::Login { email, password } => {
            validate::credentials(&email, &password)?;
            let user = client.api().login(&email, &password).await?;
            print_json(&user)
        }
        Command::Signup { email, phone, password } => {
            validate::credentials(&email, &password)?;
            client.api().signup(&SignupForm { email, phone, password }).await?;
            Ok(())
        }
        Command::Logout => {
            client.api().logout()?;
            Ok(())
        }
        Command::Whoami => print_json(&client.session().current()),
        Command::ResetPassword { current, new, confirm } => {
            validate::password_reset(&current, &new, &confirm)?;
            client.api().reset_password(&current, &new).await?;
            Ok(())
        }
        Command::Images(images) => run_images(&client, images.command).await,
    }
}

async fn run_images(client: &GalleryClient, command: ImagesSubcommand) -> Result<(), CliError> {
    let api = client.api();
    match command {
        ImagesSubcommand::List => print_json(&api.list_images().await?),
        ImagesSubcommand::Upload { files, titles } => {
            let uploads = files
                .iter()
                .enumerate()
                .map(|(i, path)| read_upload(path, titles.get(i).cloned().unwrap_or_default()))
                .collect::<Result<Vec<_>, _>>()?;
            validate::uploads(&uploads)?;
            api.upload_images(&uploads).await?;
            Ok(())
        }
        ImagesSubcommand::Delete { image_id } => {
            api.delete_image(&image_id).await?;
            Ok(())
        }
        ImagesSubcommand::Edit { image_id, title, file } => {
            let replacement = file.as_deref().map(|p| read_upload(p, title.clone())).transpose()?;
            let edited = api.edit_image(&image_id, &title, replacement.as_ref()).await?;
            print_json(&serde_json::json!({ "title": edited.title, "path": edited.path }))
        }
        ImagesSubcommand::Swap { from, to } => {
            let mut gallery = Gallery::new(api.list_images().await?);
            let bad = [from, to].into_iter().find(|&p| p >= gallery.len());
            if let Some(position) = bad {
                return Err(CliError::NoSuchPosition(position));
            }
            if gallery.swap(from, to) {
                api.rearrange_images(&gallery.order()).await?;
            }
            print_json(&gallery.order())
        }
        ImagesSubcommand::Rearrange { order } => {
            api.rearrange_images(&order).await?;
            Ok(())
        }
    }
}

fn read_upload(path: &std::path::Path, title: String) -> Result<ImageUpload, CliError> {
    ImageUpload::from_path(path, title).map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
