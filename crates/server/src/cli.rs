//! Terminal adapter: one fixed request, progress dots, banner-framed report.

use canopy_core::swarm::{RunEvent, Runner};
use canopy_core::Environment;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Request the CLI submits on every run
pub const CLI_REQUEST: &str = "Generate the sustainability report.";

const RULE: &str = "========================================";

/// Run the pipeline once and print the report to `out`.
///
/// Pipeline failures are logged and swallowed; only write errors on `out`
/// are returned.
pub async fn run_cli<W: Write + Send>(
    env: &Environment,
    runner: &Runner,
    out: &mut W,
) -> anyhow::Result<()> {
    let credential = match env.require_credential() {
        Ok(credential) => credential,
        Err(e) => {
            let var = env.model.provider.credential_vars()[0];
            writeln!(out, "\n❌ Error: {}", e)?;
            writeln!(
                out,
                "👉 Double check that your file is named exactly '.env' (no .txt extension!)"
            )?;
            writeln!(out, "👉 Check that the content inside is: {}=<your key>", var)?;
            return Ok(());
        }
    };

    writeln!(out, "✅ API Key found. Starting Agent...")?;
    out.flush()?;

    let shared = Mutex::new(&mut *out);
    let write_error: Mutex<Option<io::Error>> = Mutex::new(None);
    let progress = |_: &RunEvent| {
        let mut out = shared.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = write!(out, ".").and_then(|_| out.flush()) {
            write_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert(e);
        }
    };

    let outcome = runner.run(credential, CLI_REQUEST, progress).await;
    if let Some(e) = write_error.into_inner().unwrap_or_else(PoisonError::into_inner) {
        return Err(e.into());
    }
    let out = shared.into_inner().unwrap_or_else(PoisonError::into_inner);

    match outcome {
        Ok(report) => {
            writeln!(out, "\n{}", RULE)?;
            writeln!(out, "FINAL REPORT")?;
            writeln!(out, "{}\n", RULE)?;
            writeln!(out, "{}", report)?;
        }
        Err(e) => {
            tracing::error!("Workflow failed: {}", e);
        }
    }
    Ok(())
}
