//! WGSL sources and compiled shader modules.
//!
//! Every shader ships embedded in the binary. A shader directory, when set,
//! replaces all of them: each file is then read from disk, and a missing
//! file is an error rather than a silent fallback to the embedded copy.

use log::{debug, info};
use std::{borrow::Cow, collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read shader {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// wgpu rejected the shader module or a pipeline built from it.
    #[error("shader '{name}' failed validation: {message}")]
    Compile { name: String, message: String },
}

/// Run `build` inside a validation error scope.
///
/// Errors raised by the wgpu calls in `build` come back as
/// [`ShaderError::Compile`] instead of reaching the device's uncaptured
/// error handler, which panics by default.
pub fn capture_validation<T>(
    device: &wgpu::Device,
    name: &str,
    build: impl FnOnce() -> T,
) -> Result<T, ShaderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let built = build();
    match pollster::block_on(scope.pop()) {
        None => Ok(built),
        Some(err) => Err(ShaderError::Compile {
            name: name.to_owned(),
            message: err.to_string(),
        }),
    }
}

/// Shader modules compiled on one device, cached by name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every shader from `dir` instead of the embedded sources.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// WGSL text for `filename`, `embedded` unless a shader directory is set.
    pub fn source(
        &self,
        filename: &str,
        embedded: &'static str,
    ) -> Result<Cow<'static, str>, ShaderError> {
        let Some(dir) = &self.shader_dir else {
            return Ok(Cow::Borrowed(embedded));
        };
        let path = dir.join(filename);
        if !path.is_file() {
            return Err(ShaderError::FileNotFound { path });
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Read shader {}", path.display());
                Ok(Cow::Owned(text))
            }
            Err(source) => Err(ShaderError::Read { path, source }),
        }
    }

    /// Compile `source` and cache it as `name`, replacing any earlier module.
    /// A module that fails validation is not cached.
    pub fn compile(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let module = capture_validation(device, name, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        let module = Arc::new(module);
        let replaced = self.modules.insert(name.to_owned(), module.clone()).is_some();
        info!(
            "{} shader '{name}'",
            if replaced { "Recompiled" } else { "Compiled" }
        );
        Ok(module)
    }

    /// Cached module `name`, or compile it from [`source`](Self::source).
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
        embedded: &'static str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(module.clone());
        }
        let source = self.source(filename, embedded)?;
        self.compile(device, name, &source)
    }
}
