//! Analyse a frame model document and print the result document
//!
//! Usage: `frame-analyze <model.json> [output.json]`
//!
//! Options come from `FRAME_FEA_*` environment variables, log verbosity from
//! `RUST_LOG`.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use frame_fea::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: frame-analyze <model.json> [output.json]");
    };
    let output = args.next().map(PathBuf::from);

    let json = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let model = FrameModel::from_json(&json)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let options = AnalysisOptions::from_env();
    let mut solver = LinearStaticSolver::new();
    let result = run_analysis(&model, &mut solver, &options).context("analysis failed")?;

    let document = result.to_json()?;
    match output {
        Some(path) => fs::write(&path, document)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", document),
    }
    Ok(())
}
