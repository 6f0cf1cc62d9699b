//! Sql command - pull the query out of a model response and vet it.

use std::io::Read;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tabforge::assistant::SqlGuard;

pub fn run(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let response = read_response(file.as_deref())?;

    match SqlGuard::new().vet_response(&response)? {
        Some(sql) => println!("{}", sql),
        None => eprintln!("{} no ```sql block in response", "Note:".yellow()),
    }

    Ok(())
}

/// Read the response from `file`, or from stdin when none is given.
fn read_response(file: Option<&Path>) -> Result<String, Box<dyn std::error::Error>> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
