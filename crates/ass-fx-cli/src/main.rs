//! Command-line karaoke effect generator
//!
//! Reads a karaoke-timed ASS script, decomposes every dialogue at the chosen
//! granularity and writes one positioned event per unit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ass_fx::{
    metrics::{FontMetrics, MonospaceMetrics, SystemFonts},
    Document, Emit, FxConfig, FxScript,
};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};

/// Unit granularity to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Line,
    Syllable,
    Char,
}

#[derive(Parser, Debug)]
#[command(name = "ass-fx", version, about = "Generate positioned karaoke events from an ASS script")]
struct Cli {
    /// Karaoke-timed input script
    input: PathBuf,

    /// Output path (defaults to <input>.fx.ass)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Granularity of the emitted events
    #[arg(long, value_enum, default_value_t = Mode::Syllable)]
    mode: Mode,

    /// Milliseconds added to every emitted time
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    shift: i32,

    /// Horizontal drift correction per unit, in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x_fix: f64,

    /// Measure text at this multiple of the style font size
    #[arg(long, default_value_t = 1)]
    supersampling: u32,

    /// Extra font directories searched before system fonts
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not copy the source karaoke into the output as comments
    #[arg(long)]
    no_original: bool,

    /// Measure with a fixed advance per character instead of real fonts
    #[arg(long, value_name = "ADVANCE")]
    monospace: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> FxConfig {
        FxConfig {
            shift_ms: self.shift,
            x_fix: self.x_fix,
            supersampling: self.supersampling,
            keep_original: !self.no_original,
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("fx.ass"))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let written = match cli.monospace {
        Some(advance) => run(&cli, &source, MonospaceMetrics::new(advance))?,
        None => {
            let mut fonts = SystemFonts::new();
            for dir in &cli.font_dirs {
                fonts.load_fonts_dir(dir);
            }
            run(&cli, &source, fonts)?
        }
    };

    info!("wrote {written} events to {}", cli.output_path().display());
    Ok(())
}

/// Generate the effect and save it, returning the number of emitted units
fn run<M>(cli: &Cli, source: &str, metrics: M) -> Result<usize>
where
    M: FontMetrics + Sync,
    M::Face: Sync,
{
    let document = Document::parse(source)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    let mut fx = FxScript::new(&document, metrics, cli.config())
        .context("failed to prepare karaoke effect")?;

    let lines = fx.lines_par().context("failed to build lines")?;
    let mut emitted = 0;
    for line in &lines {
        if !line.has_karaoke() {
            warn!("line {} has no karaoke tags", line.index + 1);
        }
        match cli.mode {
            Mode::Line => emitted += emit(&mut fx, std::slice::from_ref(line)),
            Mode::Syllable => {
                let syllables = fx.syllables(line)?;
                emitted += emit(&mut fx, &syllables);
            }
            Mode::Char => {
                let chars = fx.chars(line)?;
                emitted += emit(&mut fx, &chars);
            }
        }
    }
    debug!("emitted {emitted} units from {} lines", lines.len());

    save(&mut fx, &cli.output_path())?;
    Ok(emitted)
}

fn emit<M: FontMetrics, U: Emit + Clone>(fx: &mut FxScript<M>, units: &[U]) -> usize {
    for unit in units {
        let mut unit = unit.clone();
        let tags = unit.unit().pos_tag();
        unit.unit_mut().tags = tags;
        fx.add(&unit);
    }
    units.len()
}

fn save<M: FontMetrics>(fx: &mut FxScript<M>, path: &Path) -> Result<()> {
    fx.save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "[Script Info]\nPlayResX: 640\nPlayResY: 360\n\n[V4+ Styles]\n\
        Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1\n\n\
        [Events]\n\
        Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,{\\k50}ka{\\k50}ra\n\
        Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,{\\k100}to\n";

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let input = dir.join("song.ass");
        fs::write(&input, SCRIPT).unwrap();
        let input = input.display().to_string();
        let mut argv = vec!["ass-fx", input.as_str(), "--monospace", "10"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn generate(cli: &Cli) -> (usize, String) {
        let source = fs::read_to_string(&cli.input).unwrap();
        let metrics = MonospaceMetrics::new(cli.monospace.unwrap());
        let emitted = run(cli, &source, metrics).unwrap();
        (emitted, fs::read_to_string(cli.output_path()).unwrap())
    }

    #[test]
    fn syllable_mode_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(dir.path(), &[]);
        assert_eq!(cli.mode, Mode::Syllable);
        assert_eq!(cli.output_path(), dir.path().join("song.fx.ass"));

        let (emitted, output) = generate(&cli);
        assert_eq!(emitted, 3);
        assert!(output.contains("Dialogue: 0,0:00:01.00,0:00:01.50,Default,,0,0,0,,{\\an2\\pos(310,350)}ka"));
        assert!(output.contains("Comment: 0,0:00:00.00,0:00:05.00,Default,,0,0,0,,### Original Karaoke ###"));
    }

    #[test]
    fn char_mode_with_shift() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chars.ass");
        let out_arg = out.display().to_string();
        let cli = cli(
            dir.path(),
            &["--mode", "char", "--shift", "-500", "--no-original", "-o", &out_arg],
        );

        let (emitted, output) = generate(&cli);
        assert_eq!(emitted, 6);
        assert!(!output.contains("Comment:"));
        assert!(output.contains("Dialogue: 0,0:00:00.50,0:00:00.75,Default,,0,0,0,,{\\an2\\pos(305,350)}k"));
    }

    #[test]
    fn line_mode_emits_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(dir.path(), &["--mode", "line", "--no-original"]);

        let (emitted, output) = generate(&cli);
        assert_eq!(emitted, 2);
        assert!(output.contains("{\\an2\\pos(320,350)}kara"));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["ass-fx", "in.ass", "--mode", "word"]).is_err());
    }
}
