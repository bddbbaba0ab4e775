use crate::output;
use crate::policies;
use anyhow::{anyhow, Result};

pub fn handle_validate_command(files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(anyhow!("no policy files given"));
    }

    let mut failures = 0;
    for file in files {
        match policies::load_policies(file) {
            Ok(documents) => {
                output::print_success(&format!(
                    "{}: {} policy document(s) valid",
                    file,
                    documents.len()
                ));
            }
            Err(err) => {
                failures += 1;
                output::print_error(&format!("{}: {:#}", file, err));
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} file(s) failed validation", failures, files.len()));
    }
    Ok(())
}
