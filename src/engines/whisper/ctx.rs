use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use whisper_rs::{WhisperContext, WhisperContextParameters};

use crate::opts::Device;

use super::logging::init_whisper_logging;

/// Map a model identifier to a ggml weights file.
///
/// An identifier that names an existing file is used as-is. Anything else is treated as a
/// model name (`small`, `large-v3`, ...) and looked up as `<models_dir>/ggml-<name>.bin`.
pub fn resolve_model_path(model: &str, models_dir: &Path) -> PathBuf {
    let as_path = Path::new(model);
    if as_path.is_file() {
        return as_path.to_path_buf();
    }
    models_dir.join(format!("ggml-{model}.bin"))
}

/// Load a whisper.cpp model and return an initialized `WhisperContext`.
pub fn load_context(model_path: &Path, device: Device) -> Result<WhisperContext> {
    init_whisper_logging();

    ensure!(
        model_path.is_file(),
        "model not found at '{}'",
        model_path.display()
    );
    let model = model_path
        .to_str()
        .with_context(|| format!("model path is not valid UTF-8: {}", model_path.display()))?;

    let mut ctx_params = WhisperContextParameters::default();
    ctx_params.use_gpu(device == Device::Gpu);

    let ctx = WhisperContext::new_with_params(model, ctx_params)
        .with_context(|| format!("failed to load model from path: {model}"))?;

    Ok(ctx)
}
