use std::path::Path;

use {anyhow::Result, clap::Subcommand};

use jarvis_config::{
    Diagnostic,
    validate::{self, Severity},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the settings file and the models registry.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective settings directory.
    Path,
}

pub fn handle_config(
    action: ConfigAction,
    config_path: Option<&Path>,
    models_path: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(verbose, config_path, models_path),
        ConfigAction::Path => {
            match jarvis_config::config_dir() {
                Some(dir) => println!("{}", dir.display()),
                None => eprintln!("no home directory; only ./jarvis.toml is searched"),
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(verbose: bool, config_path: Option<&Path>, models_path: Option<&Path>) -> Result<()> {
    let result = validate::validate(config_path);

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No settings file found; checking defaults.\n");
    }
    let mut shown = print_diagnostics(&result.diagnostics, verbose);

    // The registry path comes from the settings, so load them the way startup does.
    let models_path = match models_path {
        Some(p) => p.to_path_buf(),
        None => match config_path {
            Some(p) => jarvis_config::load_config(p)
                .unwrap_or_default()
                .router
                .models_config_path,
            None => jarvis_config::discover_and_load().router.models_config_path,
        },
    };
    let models = jarvis_config::load_models(&models_path);
    if models.from_file() {
        eprintln!("Checking {}\n", models_path.display());
    } else {
        eprintln!(
            "No usable models registry at {}; using built-in registry.\n",
            models_path.display()
        );
    }
    shown += print_diagnostics(&models.diagnostics, verbose);

    let all = result.diagnostics.iter().chain(&models.diagnostics);
    let (errors, warnings) = all.fold((0, 0), |(e, w), d| match d.severity {
        Severity::Error => (e + 1, w),
        Severity::Warning => (e, w + 1),
        Severity::Info => (e, w),
    });

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic], verbose: bool) -> usize {
    let mut shown = 0;
    for d in diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }
    shown
}
