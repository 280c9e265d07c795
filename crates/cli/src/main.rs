//! CLI tool for assembling slide decks.

mod content;

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck_core::{build, Deck, DeckDescription, DeckRenderer, RecordingCodec};
use deck_pptx::{PptxCodec, PptxReader};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Assemble a slide deck and write it as a .pptx file.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file (overwritten if it exists)
    #[arg(short, long, default_value = "project_overview.pptx")]
    output: PathBuf,

    /// JSON deck description to render instead of the built-in deck
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// Print the description as JSON and exit without rendering
    #[arg(long)]
    dump: bool,

    /// Record codec operations and print them instead of writing a file
    #[arg(long, conflicts_with = "dump")]
    dry_run: bool,

    /// Read the written file back and check it against the deck
    #[arg(long, conflicts_with_all = ["dump", "dry_run"])]
    verify: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    run(&args)
}

/// Execute one invocation.
fn run(args: &Args) -> Result<()> {
    let description = load_description(args.deck.as_deref())?;

    if args.dump {
        println!("{}", description.to_json()?);
        return Ok(());
    }

    let deck = build(&description).context("Invalid deck description")?;
    let renderer = DeckRenderer::new();

    if args.dry_run {
        let codec = RecordingCodec::new();
        renderer
            .render(deck, &codec, &args.output)
            .context("Dry run failed")?;
        print!("{}", codec.transcript());
        return Ok(());
    }

    let titles = if args.verify {
        slide_titles(&deck)
    } else {
        Vec::new()
    };

    if args.verbose {
        eprintln!("Rendering {} slides to: {}", deck.len(), args.output.display());
    }

    let artifact = renderer
        .render(deck, &PptxCodec::new(), &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if args.verbose {
        eprintln!(
            "Written {} slides ({} bytes) to: {}",
            artifact.slide_count,
            artifact.bytes_written,
            artifact.path.display()
        );
    }

    if args.verify {
        verify(&artifact.path, &titles)?;
        if args.verbose {
            eprintln!("  Verified {} slides", titles.len());
        }
    }

    Ok(())
}

/// Load a description from JSON, or fall back to the built-in deck.
fn load_description(path: Option<&Path>) -> Result<DeckDescription> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            DeckDescription::from_json(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
        None => content::project_overview().context("Built-in deck is invalid"),
    }
}

fn slide_titles(deck: &Deck) -> Vec<String> {
    deck.slides().iter().map(|s| s.title.text.clone()).collect()
}

/// Check that a written file holds the expected slides in order.
fn verify(path: &Path, expected_titles: &[String]) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let presentation = PptxReader::new()
        .read(BufReader::new(file))
        .with_context(|| format!("Failed to read back {}", path.display()))?;

    if presentation.slides.len() != expected_titles.len() {
        bail!(
            "{} has {} slides, expected {}",
            path.display(),
            presentation.slides.len(),
            expected_titles.len()
        );
    }

    for (slide, expected) in presentation.slides.iter().zip(expected_titles) {
        let actual = slide.title().unwrap_or_default();
        if &actual != expected {
            bail!(
                "Slide {} title is '{}', expected '{}'",
                slide.number,
                actual,
                expected
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{ContentNode, SlideDescription};

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("deckgen").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        assert_eq!(args.output, PathBuf::from("project_overview.pptx"));
        assert!(args.deck.is_none());
        assert!(!args.dry_run && !args.verify && !args.dump);
    }

    #[test]
    fn test_dry_run_conflicts_with_verify() {
        assert!(Args::try_parse_from(["deckgen", "--dry-run", "--verify"]).is_err());
    }

    #[test]
    fn test_render_and_verify_builtin_deck() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("overview.pptx");
        let output_arg = output.to_str().unwrap();

        run(&args(&["--output", output_arg, "--verify"])).unwrap();

        let file = File::open(&output).unwrap();
        let presentation = PptxReader::new().read(file).unwrap();
        assert_eq!(presentation.slides.len(), 13);
        assert_eq!(
            presentation.slides[0].title().as_deref(),
            Some("3D Barracks Simulation")
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dry.pptx");

        run(&args(&["--output", output.to_str().unwrap(), "--dry-run"])).unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn test_deck_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let deck_path = dir.path().join("deck.json");
        let output = dir.path().join("custom.pptx");

        let mut description = DeckDescription::new();
        description.add_slide(SlideDescription::title_slide("X", "Y"));
        let mut slide = SlideDescription::content("Z");
        slide
            .extend([
                ContentNode::new("A", 0),
                ContentNode::new("B", 1),
                ContentNode::spacer(1),
                ContentNode::new("C", 1),
            ])
            .unwrap();
        description.add_slide(slide);
        std::fs::write(&deck_path, description.to_json().unwrap()).unwrap();

        run(&args(&[
            "--deck",
            deck_path.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--verify",
        ]))
        .unwrap();

        let presentation = PptxReader::new().read(File::open(&output).unwrap()).unwrap();
        assert_eq!(presentation.slides.len(), 2);
        assert_eq!(presentation.slides[1].title().as_deref(), Some("Z"));
    }

    #[test]
    fn test_invalid_levels_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let deck_path = dir.path().join("bad.json");
        let output = dir.path().join("bad.pptx");
        std::fs::write(
            &deck_path,
            r#"{"slides":[{"kind":"content","title":"T","body":[{"text":"A","level":0},{"text":"deep","level":2}]}]}"#,
        )
        .unwrap();

        let result = run(&args(&[
            "--deck",
            deck_path.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]));
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_verify_detects_wrong_title() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");

        let mut description = DeckDescription::new();
        description.add_slide(SlideDescription::content("Real"));
        let deck = build(&description).unwrap();
        DeckRenderer::new()
            .render(deck, &PptxCodec::new(), &output)
            .unwrap();

        assert!(verify(&output, &["Real".to_string()]).is_ok());
        assert!(verify(&output, &["Other".to_string()]).is_err());
        assert!(verify(&output, &[]).is_err());
    }

    #[test]
    fn test_missing_deck_file() {
        let err = load_description(Some(Path::new("/nonexistent/deck.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
