use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;

use scan_split_rs::{Config, PhotoSplitter, SplitReport, VerticalLineDetector};

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let interactive = config.input_dir.is_none();
    let input_dir = match config.input_dir.clone() {
        Some(dir) => {
            ensure!(
                dir.is_dir(),
                "Input directory does not exist: {}",
                dir.display()
            );
            dir
        }
        None => prompt_for_folder()?,
    };

    let detector = VerticalLineDetector::new(config.detector_params());
    let output_dir = input_dir.join(&config.output_dir_name);
    let splitter = PhotoSplitter::new(detector, config);

    println!("\nStarting image splitting process...");
    let report = splitter.process_directory(&input_dir)?;
    print_summary(&report, &output_dir);

    if interactive {
        wait_for_enter()?;
    }
    Ok(())
}

/// Asks for a folder name until an existing one is given.
///
/// Names are resolved against the executable's directory, so the tool can be
/// dropped next to a photos folder and run without arguments; absolute paths
/// are accepted as-is.
fn prompt_for_folder() -> Result<PathBuf> {
    println!("-------------------------------------------------------------------");
    println!("  JPEG Photo Splitter");
    println!("  This tool splits JPEG photos in half, looking for a dividing line.");
    println!("-------------------------------------------------------------------");

    let base_dir = base_directory()?;
    loop {
        print!("\nEnter the name of the folder containing your photos (e.g. 'MyPhotos'):\n> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        ensure!(read > 0, "Input ended before a folder name was given");

        let name = line.trim();
        if name.is_empty() {
            println!("Folder name cannot be empty. Please try again.");
            continue;
        }

        let candidate = base_dir.join(name);
        if candidate.is_dir() {
            println!("\nFound folder: {}", candidate.display());
            return Ok(candidate);
        }
        println!(
            "Error: Folder '{}' not found inside {}.",
            name,
            base_dir.display()
        );
        println!("Please make sure the photos folder is in the same location as this application.");
    }
}

fn base_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to resolve the current directory"),
    }
}

fn print_summary(report: &SplitReport, output_dir: &Path) {
    println!("\n--- Processing Complete ---");
    println!("Successfully split {} images.", report.processed);
    if report.fallback_splits > 0 {
        println!(
            "{} of them had no clear divider and were split at the geometric center.",
            report.fallback_splits
        );
    }
    if report.skipped > 0 {
        println!("Skipped {} images due to errors.", report.skipped);
    }
    println!(
        "All split images are saved in the '{}' folder.",
        output_dir.display()
    );
}

fn wait_for_enter() -> Result<()> {
    print!("Press Enter to exit.");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}
