use std::io::{IsTerminal as _, Read as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error};

use qrgenerator::{to_str, Bitmap, ECLevel, Generator, ModuleGrid, ScaleMode};

const DEFAULT_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    L,
    M,
    Q,
    H,
}

impl From<Level> for ECLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::L => ECLevel::L,
            Level::M => ECLevel::M,
            Level::Q => ECLevel::Q,
            Level::H => ECLevel::H,
        }
    }
}

#[derive(Parser)]
#[command(name = "qrgenerator")]
#[command(about = "Generate a QR code image from text", long_about = None)]
struct Cli {
    /// Text to encode, read from stdin when omitted
    text: Option<String>,

    /// Output file, format picked from the extension
    #[arg(long, short = 'o', default_value = "qr.png")]
    output: PathBuf,

    /// Width and height of the square image in pixels
    #[arg(long, short = 's', conflicts_with_all = ["width", "height"])]
    size: Option<u32>,

    /// Image width in pixels
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Error correction level
    #[arg(long, short = 'e', value_enum, default_value_t = Level::L)]
    ec_level: Level,

    /// Quiet zone around the symbol in modules
    #[arg(long, default_value_t = qrgenerator::QUIET_ZONE)]
    quiet_zone: u32,

    /// Stretch the symbol to fill non-square images instead of centring it
    #[arg(long)]
    stretch: bool,

    /// Also draw the symbol on the terminal
    #[arg(long, short = 'p')]
    print: bool,
}

impl Cli {
    fn dimensions(&self) -> (u32, u32) {
        match (self.size, self.width, self.height) {
            (_, Some(w), Some(h)) => (w, h),
            (Some(sz), _, _) => (sz, sz),
            _ => (DEFAULT_SIZE, DEFAULT_SIZE),
        }
    }

    fn text(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            bail!("no text given, pass it as an argument or pipe it through stdin");
        }
        let mut text = String::new();
        stdin.read_to_string(&mut text).context("Failed to read text from stdin")?;
        Ok(text.trim_end_matches(['\r', '\n']).to_string())
    }
}

// Same grid as the saved image, one module per terminal cell
fn preview(grid: &ModuleGrid, quiet_zone: u32) -> String {
    to_str(grid, quiet_zone, 1)
}

fn run(cli: &Cli) -> Result<Bitmap> {
    let text = cli.text()?;
    let (width, height) = cli.dimensions();
    let ecl = ECLevel::from(cli.ec_level);
    let mode = if cli.stretch { ScaleMode::Stretch } else { ScaleMode::Fit };
    debug!("Encoding {} bytes into {width}x{height} at level {ecl:?}", text.len());

    let gen = Generator::new().ec_level(ecl).quiet_zone(cli.quiet_zone).scale_mode(mode).clone();
    let grid = gen.symbol(&text)?;
    let bitmap = gen.render(&grid, width, height)?;

    if cli.print {
        print!("{}", preview(&grid, cli.quiet_zone));
    }

    bitmap
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    Ok(bitmap)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(bitmap) => {
            eprintln!(
                "Saved! {}x{} QR code written to {}",
                bitmap.width(),
                bitmap.height(),
                cli.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:?}");
            eprintln!("Save error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod cli_tests {
    use clap::{CommandFactory as _, Parser as _};

    use qrgenerator::Generator;

    use super::{preview, Cli, DEFAULT_SIZE};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dimensions() {
        let cli = Cli::parse_from(["qrgenerator", "HELLO"]);
        assert_eq!(cli.dimensions(), (DEFAULT_SIZE, DEFAULT_SIZE));
        let cli = Cli::parse_from(["qrgenerator", "HELLO", "--size", "300"]);
        assert_eq!(cli.dimensions(), (300, 300));
        let cli = Cli::parse_from(["qrgenerator", "HELLO", "--width", "300", "--height", "200"]);
        assert_eq!(cli.dimensions(), (300, 200));
    }

    #[test]
    fn test_size_conflicts() {
        let args = ["qrgenerator", "A", "--size", "3", "--width", "4", "--height", "5"];
        assert!(Cli::try_parse_from(args).is_err());
        assert!(Cli::try_parse_from(["qrgenerator", "A", "--width", "4"]).is_err());
    }

    #[test]
    fn test_text_argument() {
        let cli = Cli::parse_from(["qrgenerator", "HELLO", "-e", "h", "--stretch"]);
        assert_eq!(cli.text().unwrap(), "HELLO");
        assert!(cli.stretch);
    }

    #[test]
    fn test_preview_honours_quiet_zone() {
        let cli = Cli::parse_from(["qrgenerator", "HELLO", "--quiet-zone", "1", "-p"]);
        let grid = Generator::new().symbol(&cli.text().unwrap()).unwrap();
        let s = preview(&grid, cli.quiet_zone);
        // 21 modules + 1 * 2 quiet zone
        assert_eq!(s.lines().count(), 23);
        assert!(s.lines().all(|l| l.chars().count() == 46));
        // Top left finder corner sits right after the one module margin
        let row = s.lines().nth(1).unwrap();
        assert!(row.starts_with("  ██"));
    }
}
