//! Detect command implementation
//!
//! Runs the format heuristics against a file without decoding or
//! committing anything.

use crate::core::dispatch::classify;
use crate::logging::payload;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input file to classify
    pub file: PathBuf,
}

impl DetectArgs {
    /// Execute the detect command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let raw = match std::fs::read(&self.file) {
            Ok(raw) => raw,
            Err(e) => {
                println!("❌ Cannot read {}", self.file.display());
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("🔍 Classifying {} ({} bytes)", self.file.display(), raw.len());
        println!();

        match classify(&raw) {
            Some(classification) => {
                println!("✅ {classification}");
                Ok(0)
            }
            None => {
                println!("❌ Unidentified input format");
                println!("   SHA-256: {}", payload::digest(&raw));
                println!("   Preview: {}", payload::preview(&raw));
                println!("   Use `parse --format <FORMAT>` for dispill, mts or oasis input");
                Ok(3)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_detect_tagged_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<Record><Table>Store</Table></Record>").unwrap();
        let args = DetectArgs {
            file: file.path().to_path_buf(),
        };
        assert_eq!(args.execute().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_detect_unidentified_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "P1001,DOE,JANE").unwrap();
        let args = DetectArgs {
            file: file.path().to_path_buf(),
        };
        assert_eq!(args.execute().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_detect_missing_file() {
        let args = DetectArgs {
            file: PathBuf::from("/nonexistent/input.dat"),
        };
        assert_eq!(args.execute().await.unwrap(), 5);
    }
}
