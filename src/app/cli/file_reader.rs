//! File reader command implementation.

use std::path::PathBuf;

use crate::app::api::{self, FileEntry, FileReaderOptions};
use crate::app::commands::file_reader::format_size;
use crate::app::render;
use crate::domain::AppError;

pub fn run_file_reader(path: PathBuf, pattern: String, verbose: bool) -> Result<(), AppError> {
    let options = FileReaderOptions { path, pattern, verbose };
    let files = api::read_files(&options)?;

    if files.is_empty() {
        println!(
            "ℹ️  No files matching '{}' in {}",
            options.pattern,
            options.path.display()
        );
        return Ok(());
    }

    println!("📁 {} file(s) matching '{}' in {}", files.len(), options.pattern, options.path.display());
    if verbose {
        for file in &files {
            print_contents(file);
        }
    } else {
        let rows: Vec<Vec<String>> = files
            .iter()
            .map(|file| {
                vec![file.name(), format_size(file.size), file.extension(), file.parent()]
            })
            .collect();
        println!("{}", render::table(&["NAME", "SIZE", "EXT", "DIRECTORY"], &rows));
    }
    Ok(())
}

fn print_contents(file: &FileEntry) {
    println!();
    match &file.content {
        Some(Ok(text)) => {
            println!("📄 {} ({} lines, {})", file.path.display(), text.lines().count(), format_size(file.size));
            for (number, line) in text.lines().enumerate() {
                println!("{:>5} | {}", number + 1, line);
            }
        }
        Some(Err(reason)) => {
            println!("📄 {} ({})", file.path.display(), format_size(file.size));
            println!("⚠️  {}", reason);
        }
        None => println!("📄 {} ({})", file.path.display(), format_size(file.size)),
    }
}
