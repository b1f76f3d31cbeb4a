use crate::input::ClickConfig;
use crate::routine::RoutineConfig;
use crate::template_matching::MatchConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub pic_dir: PathBuf,
    pub threshold: f32,
    pub max_retries: u32,
    pub dry_run: bool,
    pub fail_safe: bool,
    pub debug_mode: bool,
}

impl Default for Args {
    fn default() -> Self {
        let matching = MatchConfig::default();
        Self {
            pic_dir: RoutineConfig::default().pic_dir,
            threshold: matching.confidence_threshold,
            max_retries: matching.max_retries,
            dry_run: false,
            fail_safe: ClickConfig::default().fail_safe,
            debug_mode: false,
        }
    }
}

impl Args {
    /// Parse flags (program name already skipped)
    ///
    /// Returns `Ok(None)` after printing help or version, `Err` with a message
    /// for an unknown or malformed flag.
    pub fn parse_from<I>(args: I) -> Result<Option<Self>, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return Ok(None);
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Screen Auto Run v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return Ok(None);
            } else if arg == "--debug" {
                parsed.debug_mode = true;
            } else if arg == "--dry-run" {
                parsed.dry_run = true;
            } else if arg == "--no-fail-safe" {
                parsed.fail_safe = false;
            } else if let Some(dir) = arg.strip_prefix("--pic-dir=") {
                if dir.is_empty() {
                    return Err("Empty picture directory".to_string());
                }
                parsed.pic_dir = PathBuf::from(dir);
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => parsed.threshold = t,
                    _ => return Err(format!("Invalid threshold value: {}", val)),
                }
            } else if let Some(val) = arg.strip_prefix("--retries=") {
                parsed.max_retries = val
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid retries value: {}", val))?;
            } else {
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        Ok(Some(parsed))
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            confidence_threshold: self.threshold,
            max_retries: self.max_retries,
            ..MatchConfig::default()
        }
    }

    pub fn click_config(&self) -> ClickConfig {
        ClickConfig {
            fail_safe: self.fail_safe,
            ..ClickConfig::default()
        }
    }

    pub fn routine_config(&self) -> RoutineConfig {
        RoutineConfig {
            pic_dir: self.pic_dir.clone(),
            ..RoutineConfig::default()
        }
    }
}

pub fn print_help() {
    println!("🤖 Screen Auto Run");
    println!();
    println!("USAGE:");
    println!("    screen-auto-run [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --pic-dir=DIR       Directory holding the pic/ templates (default: .)");
    println!("    --threshold=F       Match confidence threshold, 0.0-1.0 (default: 0.8)");
    println!("    --retries=N         Capture attempts per step before giving up (default: 10)");
    println!("    --dry-run           Locate templates but only log the clicks");
    println!("    --no-fail-safe      Do not abort when the pointer is parked in a screen corner");
    println!("    --debug             Enable debug output");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("Move the pointer into any screen corner to stop a running routine.");
    println!();
    println!("EXAMPLES:");
    println!("    screen-auto-run");
    println!("    screen-auto-run --pic-dir=assets --threshold=0.9");
    println!("    screen-auto-run --dry-run --debug");
}
