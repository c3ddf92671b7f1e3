use clap::{Args, Parser, Subcommand};
use memories_common::{Collection, RowId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memories")]
#[command(author, version, about = "Admin tool for the memories site")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an admin account
    Signup {
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign in and remember the session for later commands
    Login {
        email: String,

        #[arg(long)]
        password: String,
    },

    /// End the saved session
    Logout,

    /// Show or edit the landing page text and hero image
    Content {
        #[command(subcommand)]
        action: ContentCommand,
    },

    /// Manage the captioned slider
    Slider {
        #[command(subcommand)]
        action: SliderCommand,
    },

    /// Manage the photo gallery
    Gallery {
        #[command(subcommand)]
        action: GalleryCommand,
    },

    /// Renumber a collection to dense order keys
    Repair {
        /// slider or gallery
        collection: Collection,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum ContentCommand {
    /// Print the site content
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more site content fields
    Update(ContentFields),

    /// Upload a new hero image
    Hero {
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ContentFields {
    #[arg(long)]
    pub couple_name: Option<String>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub about: Option<String>,

    #[arg(long)]
    pub letter: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    /// Vertical focal point of the hero image in percent
    #[arg(long)]
    pub hero_position: Option<u8>,
}

#[derive(Subcommand)]
pub enum SliderCommand {
    /// List slides by position
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload images as new slides, in the given order
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Replace the image of the slide at a position
    Replace { position: u32, file: PathBuf },

    /// Change a slide's caption
    Caption { id: RowId, caption: String },

    /// Delete slides
    Delete {
        #[arg(required = true)]
        ids: Vec<RowId>,
    },
}

#[derive(Subcommand)]
pub enum GalleryCommand {
    /// List photos by order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload images as new photos, in the given order
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete photos
    Delete {
        #[arg(required = true)]
        ids: Vec<RowId>,
    },
}
