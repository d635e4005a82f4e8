use anyhow::{Context, Result, bail};
use blockmark_config::Config;
use blockmark_engine::{
    Block, BlockKind, DocumentRef, DocumentStore, EditingSession, FsStore, ResetOptions,
    blocks_to_markdown, parse_markdown_to_blocks,
};
use clap::{Parser, Subcommand};
use std::{fs, path::Path, path::PathBuf, process};

/// Inspect and normalize block markdown documents
#[derive(Parser, Debug)]
#[command(name = "blockmark", version)]
#[command(about = "Inspect and normalize block markdown documents")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a config file pointing at a notes directory
    Init {
        notes_path: PathBuf,
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the blocks a markdown file parses into
    Blocks {
        file: PathBuf,
        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a markdown file in canonical block form
    Fmt {
        file: PathBuf,
        /// Overwrite the file instead of printing
        #[arg(long, conflicts_with = "check")]
        write: bool,
        /// Exit with status 1 if the file is not canonical
        #[arg(long)]
        check: bool,
    },
    /// List the documents in the notes directory
    List {
        /// Notes directory, defaults to the one in the config file
        #[arg(long)]
        notes: Option<PathBuf>,
    },
    /// Copy an image into the attachments directory and add it to a document
    Attach {
        /// Document path relative to the notes directory
        document: String,
        image: PathBuf,
        /// Alt text, defaults to the image file name without extension
        #[arg(long)]
        alt: Option<String>,
        /// Insert after this block (0-based) instead of the focused one
        #[arg(long)]
        after: Option<usize>,
        /// Notes directory, defaults to the one in the config file
        #[arg(long)]
        notes: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Init { notes_path, force } => {
            let config_path = Config::config_path();
            if config_path.exists() && !force {
                bail!(
                    "{} already exists, use --force to replace it",
                    config_path.display()
                );
            }
            Config::new(notes_path).save()?;
            log::info!("wrote {}", config_path.display());
        }
        Command::Blocks { file, json } => {
            let blocks = parse_markdown_to_blocks(&read_markdown(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                for (index, block) in blocks.iter().enumerate() {
                    println!("{}", describe_block(index, block));
                }
            }
        }
        Command::Fmt { file, write, check } => {
            let original = read_markdown(&file)?;
            let canonical = canonicalize(&original);
            if check {
                if canonical != original {
                    eprintln!("{} is not in canonical form", file.display());
                    process::exit(1);
                }
            } else if write {
                if canonical == original {
                    log::info!("{} already canonical", file.display());
                } else {
                    fs::write(&file, &canonical)
                        .with_context(|| format!("writing {}", file.display()))?;
                    log::info!("rewrote {}", file.display());
                }
            } else {
                println!("{canonical}");
            }
        }
        Command::List { notes } => {
            let config = resolve_config(notes, load_config()?)?;
            for document in store_for(&config)?.list()? {
                println!("{}", document.relative_path());
            }
        }
        Command::Attach {
            document,
            image,
            alt,
            after,
            notes,
        } => {
            let config = resolve_config(notes, load_config()?)?;
            let bytes =
                fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
            let alt = alt.unwrap_or_else(|| default_alt_text(&image));
            attach_image(&config, &document, &bytes, mime_for_path(&image), &alt, after)?;
        }
    }
    Ok(())
}

fn read_markdown(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn load_config() -> Result<Option<Config>> {
    log::info!("Config path: {}", Config::config_path().display());
    Ok(Config::load()?)
}

/// Settings for this run: the loaded config with `--notes` taking precedence
fn resolve_config(notes: Option<PathBuf>, loaded: Option<Config>) -> Result<Config> {
    match (notes, loaded) {
        (Some(notes_path), Some(config)) => Ok(Config {
            notes_path,
            ..config
        }),
        (Some(notes_path), None) => Ok(Config::new(notes_path)),
        (None, Some(config)) => Ok(config),
        (None, None) => bail!(
            "no notes directory given and no config at {}",
            Config::config_path().display()
        ),
    }
}

fn store_for(config: &Config) -> Result<FsStore> {
    let store = FsStore::new(&config.notes_path)
        .with_attachments_dir(config.attachments_dir.clone());
    store.validate()?;
    Ok(store)
}

/// Upload `bytes` and insert an image block into `document`, then save it
fn attach_image(
    config: &Config,
    document: &str,
    bytes: &[u8],
    mime: &str,
    alt: &str,
    after: Option<usize>,
) -> Result<()> {
    let mut session = EditingSession::open(
        store_for(config)?,
        DocumentRef::from(document),
        ResetOptions {
            focus_last: config.focus_last_on_open,
        },
    )?;

    if let Some(index) = after {
        let Some(block) = session.editor().blocks().get(index) else {
            bail!("{document} has no block {index}");
        };
        let id = block.id;
        session.editor_mut().set_active_block(Some(id));
    }

    let id = session.insert_image(bytes, mime, alt)?;
    session.save()?;
    if let Some(BlockKind::Image { src }) = session.editor().block(id).map(|block| &block.kind) {
        log::info!("added {src} to {document}");
    }
    Ok(())
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn default_alt_text(image: &Path) -> String {
    image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The file as the editor would save it
fn canonicalize(markdown: &str) -> String {
    blocks_to_markdown(&parse_markdown_to_blocks(markdown))
}

/// One line per block: position, type, metadata, first line of content
fn describe_block(index: usize, block: &Block) -> String {
    let metadata = match &block.kind {
        BlockKind::Checkbox { status } => format!(" {}", status.marker()),
        BlockKind::Code {
            language: Some(language),
        } => format!(" ({language})"),
        BlockKind::Image { src } => format!(" <{src}>"),
        _ => String::new(),
    };
    let first_line = block.content.lines().next().unwrap_or_default();
    let more = if block.content.contains('\n') { " …" } else { "" };
    format!(
        "{index:>3} {}{metadata} {first_line}{more}",
        block.block_type()
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmark_engine::{BlockType, CheckStatus};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn notes_dir_with(document: &str, markdown: &str) -> TempDir {
        let notes_dir = TempDir::new().unwrap();
        fs::write(notes_dir.path().join(document), markdown).unwrap();
        notes_dir
    }

    fn saved_blocks(notes_dir: &TempDir, document: &str) -> Vec<Block> {
        parse_markdown_to_blocks(&fs::read_to_string(notes_dir.path().join(document)).unwrap())
    }

    #[test]
    fn test_describe_block() {
        let checkbox = Block::new(
            BlockKind::Checkbox {
                status: CheckStatus::Done,
            },
            "ship it",
        );
        assert_eq!(describe_block(0, &checkbox), "  0 checkbox [x] ship it");

        let code = Block::new(
            BlockKind::Code {
                language: Some("rust".to_string()),
            },
            "fn a() {}\nfn b() {}",
        );
        assert_eq!(describe_block(12, &code), " 12 code (rust) fn a() {} …");

        let rule = Block::new(BlockKind::HorizontalRule, "");
        assert_eq!(describe_block(3, &rule), "  3 hr");
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("* a\n* b\n\n\n\nText"), "- a\n- b\n\nText");
        assert_eq!(canonicalize("- a\n- b\n\nText"), "- a\n- b\n\nText");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["blockmark", "fmt", "notes.md", "--check"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Fmt {
                check: true,
                write: false,
                ..
            }
        ));
        assert!(
            Args::try_parse_from(["blockmark", "fmt", "notes.md", "--check", "--write"]).is_err()
        );
    }

    #[test]
    fn test_notes_flag_overrides_config_but_keeps_other_settings() {
        let loaded = Config {
            notes_path: PathBuf::from("/from/config"),
            attachments_dir: "media".to_string(),
            focus_last_on_open: false,
        };

        let config = resolve_config(Some(PathBuf::from("/from/flag")), Some(loaded)).unwrap();

        assert_eq!(config.notes_path, PathBuf::from("/from/flag"));
        assert_eq!(config.attachments_dir, "media");
        assert!(!config.focus_last_on_open);
    }

    #[test]
    fn test_notes_flag_without_config_uses_defaults() {
        let config = resolve_config(Some(PathBuf::from("/notes")), None).unwrap();
        assert_eq!(config, Config::new("/notes"));
        assert!(resolve_config(None, None).is_err());
    }

    #[test]
    fn test_attach_uses_configured_attachments_dir() {
        let notes_dir = notes_dir_with("trip.md", "# Trip\n\nDay one");
        let config = Config {
            attachments_dir: "my media".to_string(),
            ..Config::new(notes_dir.path())
        };

        attach_image(&config, "trip.md", b"GIF89a", "image/gif", "Beach", None).unwrap();

        let blocks = saved_blocks(&notes_dir, "trip.md");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].content, "Beach");
        let BlockKind::Image { src } = &blocks[2].kind else {
            panic!("expected an image block, got {:?}", blocks[2].kind);
        };
        assert!(src.starts_with("my media/") && src.ends_with(".gif"));
        assert_eq!(fs::read(notes_dir.path().join(src)).unwrap(), b"GIF89a");
    }

    #[test]
    fn test_attach_after_a_given_block() {
        let notes_dir = notes_dir_with("trip.md", "# Trip\n\nDay one");
        let config = Config::new(notes_dir.path());

        attach_image(&config, "trip.md", b"png", "image/png", "Map", Some(0)).unwrap();

        let types: Vec<_> = saved_blocks(&notes_dir, "trip.md")
            .iter()
            .map(Block::block_type)
            .collect();
        assert_eq!(
            types,
            vec![BlockType::Heading1, BlockType::Image, BlockType::Paragraph]
        );
    }

    #[test]
    fn test_attach_to_missing_block_fails_without_writing() {
        let notes_dir = notes_dir_with("trip.md", "Day one");
        let config = Config::new(notes_dir.path());

        assert!(attach_image(&config, "trip.md", b"png", "image/png", "Map", Some(5)).is_err());
        assert_eq!(
            fs::read_to_string(notes_dir.path().join("trip.md")).unwrap(),
            "Day one"
        );
    }

    #[test]
    fn test_mime_and_alt_from_file_name() {
        assert_eq!(mime_for_path(Path::new("shots/Beach.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(default_alt_text(Path::new("shots/Beach.JPG")), "Beach");
    }
}
