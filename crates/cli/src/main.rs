//! CLI tool for exporting repaired slide decks.

mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use manifest::Manifest;
use slidefix_core::{SlideDocument, Viewport};
use slidefix_export::{
    base_name, Artifact, DeckOptions, EditorSession, ExportRequest, PresentationMode,
};
use slidefix_render::{Compositor, FontBook};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Export slides with repaired text as a deck, an image archive or one long image.
#[derive(Parser, Debug)]
#[command(name = "slide-fix")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the session described by a manifest
    Export {
        /// Session manifest (JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Artifact to produce
        #[arg(short, long, value_enum, default_value = "pptx")]
        format: Format,

        /// How slide text is carried into a deck
        #[arg(long, value_enum, default_value = "editable")]
        mode: Mode,

        /// Output directory (default: same as manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Font file used to redraw text (default: system fonts)
        #[arg(long)]
        font: Option<PathBuf>,

        /// Typeface named in deck text boxes
        #[arg(long, default_value = "Pretendard")]
        font_face: String,

        /// Language tag on deck text runs
        #[arg(long, default_value = "ko-KR")]
        language: String,
    },

    /// Print the slides and elements a manifest describes
    Inspect {
        /// Session manifest (JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Print the document as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Pptx,
    Zip,
    LongImage,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Editable,
    Image,
}

impl From<Mode> for PresentationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Editable => PresentationMode::Editable,
            Mode::Image => PresentationMode::Image,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Export {
            manifest,
            format,
            mode,
            output,
            font,
            font_face,
            language,
        } => {
            let request = match format {
                Format::Pptx => ExportRequest::Presentation { mode: mode.into() },
                Format::Zip => ExportRequest::Archive,
                Format::LongImage => ExportRequest::LongImage,
            };
            let options = DeckOptions {
                font_face,
                language,
                ..DeckOptions::default()
            };
            run_export(&manifest, request, options, output.as_deref(), font.as_deref())
        }
        Command::Inspect { manifest, json } => run_inspect(&manifest, json),
    }
}

/// Load a manifest into a document.
fn load(manifest_path: &Path) -> Result<(SlideDocument, String)> {
    let manifest = Manifest::load(manifest_path)?;
    let base = base_name(manifest.source.as_deref().unwrap_or(""));
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let document = manifest.into_document(base_dir)?;
    log::info!("Loaded {} slides", document.len());
    Ok((document, base))
}

fn run_export(
    manifest_path: &Path,
    request: ExportRequest,
    options: DeckOptions,
    output_dir: Option<&Path>,
    font: Option<&Path>,
) -> Result<()> {
    let (document, base) = load(manifest_path)?;

    let fonts = match font {
        Some(path) => FontBook::from_file(path)
            .with_context(|| format!("Failed to load font {}", path.display()))?,
        None => FontBook::system(),
    };
    let viewport = document
        .slides()
        .first()
        .map(|s| Viewport::new(f64::from(s.width), f64::from(s.height)))
        .unwrap_or(Viewport::new(960.0, 540.0));

    let mut session = EditorSession::new(document, Compositor::new(fonts), viewport)
        .with_base_name(&base)
        .with_deck_options(options);

    let artifact = session.export(request)?;
    let output_path = get_output_path(manifest_path, output_dir, &artifact)?;
    write_output(&output_path, &artifact)?;
    eprintln!("Written to: {}", output_path.display());

    Ok(())
}

fn run_inspect(manifest_path: &Path, json: bool) -> Result<()> {
    let (document, base) = load(manifest_path)?;

    if json {
        let elements: Vec<_> = document.slides().iter().map(|s| &s.elements).collect();
        println!("{}", serde_json::to_string_pretty(&elements)?);
        return Ok(());
    }

    println!("{} ({} slides)", base, document.len());
    for slide in document.slides() {
        println!(
            "Slide {}: {}x{}, {} elements",
            slide.page_number,
            slide.width,
            slide.height,
            slide.elements.len()
        );
        if let Some(error) = &slide.error {
            println!("  error: {}", error);
        }
        if let Some(warning) = &slide.warning {
            println!("  warning: {}", warning);
        }
        for line in slide.transcript().lines() {
            println!("  | {}", line);
        }
    }

    Ok(())
}

/// Determine the output path for an artifact.
fn get_output_path(
    manifest_path: &Path,
    output_dir: Option<&Path>,
    artifact: &Artifact,
) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(&artifact.filename)
        }
        None => match manifest_path.parent() {
            Some(parent) => parent.join(&artifact.filename),
            None => PathBuf::from(&artifact.filename),
        },
    };

    Ok(output_path)
}

/// Write an artifact to a file.
fn write_output(path: &Path, artifact: &Artifact) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(&artifact.bytes)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
