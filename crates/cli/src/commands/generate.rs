use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use resgen_core::emit::{SourceFile, render_sources};
use tracing::info;

use super::common::{GeneratorArgs, run_generator};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Output root; sources land under <OUT>/<package path>/
    #[arg(long, short = 'o', value_name = "DIR", default_value = "generated")]
    pub out: PathBuf,
}

pub fn run(args: GenerateArgs) -> i32 {
    match execute(&args) {
        Ok(written) => {
            println!("Wrote {written} files to {}", args.out.display());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn execute(args: &GenerateArgs) -> Result<usize, String> {
    let (config, generated) = run_generator(&args.generator)?;
    let per_profile_dirs = generated.len() > 1;

    // Render everything before touching the disk.
    let mut outputs: Vec<(PathBuf, SourceFile)> = Vec::new();
    for (kind, api) in &generated {
        let root = if per_profile_dirs {
            args.out.join(kind.as_str())
        } else {
            args.out.clone()
        };
        outputs.extend(
            render_sources(api, &config.package)
                .into_iter()
                .map(|file| (root.clone(), file)),
        );
    }

    for (root, file) in &outputs {
        write_source(root, file)?;
    }
    info!(files = outputs.len(), out = %args.out.display(), "Wrote sources.");
    Ok(outputs.len())
}

fn write_source(root: &Path, file: &SourceFile) -> Result<(), String> {
    let path = root.join(&file.relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    fs::write(&path, &file.contents).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}
