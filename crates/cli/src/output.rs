use std::env;

use eyre::{eyre, Result};

/// build a standardized output path for the given parameters. follows the following cases:
/// - if `output` is the default value (`output`), return
///   `{cwd}/output/{network}/{target}/{filename}`
/// - if `output` is specified, return `{output}/{filename}`
pub fn build_output_path(
    output: &str,
    network: &str,
    target: &str,
    filename: &str,
) -> Result<String> {
    // if output is the default value, build a path based on the target
    if output == "output" {
        let cwd = env::current_dir()?
            .into_os_string()
            .into_string()
            .map_err(|_| eyre!("Unable to get current working directory"))?;

        return Ok(format!("{}/output/{}/{}/{}", cwd, network, target.to_lowercase(), filename));
    }

    // output is specified, return the path
    Ok(format!("{}/{}", output.trim_end_matches('/'), filename))
}
