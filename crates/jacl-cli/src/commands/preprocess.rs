use std::path::{Path, PathBuf};

use jacl_dsl::PreprocessConfig;
use jacl_engine::EngineError;

use super::CliError;

pub fn run(
    input: &Path,
    output: Option<&Path>,
    include_dir: Option<PathBuf>,
    mut config: PreprocessConfig,
) -> Result<(), CliError> {
    if let Some(dir) = include_dir {
        config = config.with_include_dir(dir);
    }
    let output = output.map_or_else(|| input.with_extension("processed"), Path::to_path_buf);
    if output == input {
        return Err(CliError::Usage(format!(
            "output would overwrite {}",
            input.display()
        )));
    }

    jacl_dsl::preprocess(input, &output, &config).map_err(EngineError::Preprocess)?;
    println!("  Wrote {}", output.display());

    Ok(())
}
