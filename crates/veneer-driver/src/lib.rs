//! Run orchestration: collect headers, extract, emit, write.

mod config;
mod error;

pub use config::{ExtractConfig, ExtractionStrategy, OutputConfig, VeneerConfig, CONFIG_FILE_NAME};
pub use error::{DriverError, Result as DriverResult};

use miette::{Result, WrapErr};
use std::fmt;
use std::path::{Path, PathBuf};
use veneer_clang::{AstExtractor, ClangParser};
use veneer_codegen::{reflow, GeneratedFile, TsEmitter};
use veneer_common::SourceUnit;
use veneer_model::{ClassModel, ClassSet, Extractor, MethodModel};
use veneer_objc::{parse_method, TextExtractor};
use walkdir::WalkDir;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub classes: usize,
    pub files: usize,
    pub warnings: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extracted {} classes, wrote {} files, {} warnings",
            self.classes, self.files, self.warnings
        )
    }
}

/// A single declaration and the members generated for it.
#[derive(Debug, Clone)]
pub struct MethodBinding {
    pub method: MethodModel,
    pub typescript: String,
}

/// Binding generator driver.
pub struct Driver {
    config: VeneerConfig,
}

impl Driver {
    pub fn new(config: VeneerConfig) -> Self {
        Self { config }
    }

    /// Build the extractor selected by the configuration.
    pub fn extractor(&self) -> Result<Box<dyn Extractor>> {
        let extract = &self.config.extract;
        match extract.strategy {
            ExtractionStrategy::Text => Ok(Box::new(TextExtractor::new())),
            ExtractionStrategy::Clang => {
                let mut parser = ClangParser::new(extract.libclang_path.as_deref())
                    .map_err(DriverError::from)?;
                if let Some(sdk_root) = &extract.sdk_root {
                    parser = parser.with_sdk_root(sdk_root);
                }
                parser = parser.with_args(extract.clang_args.iter().cloned());
                Ok(Box::new(AstExtractor::new(parser)))
            }
        }
    }

    /// Expand directories into the `.h` files below them, sorted by file
    /// name. Files named explicitly are kept whatever their extension.
    pub fn collect_inputs(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut headers = Vec::new();
        for input in inputs {
            let metadata = std::fs::metadata(input).map_err(|source| DriverError::UnreadableInput {
                path: input.clone(),
                source,
            })?;
            if !metadata.is_dir() {
                headers.push(input.clone());
                continue;
            }

            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(|err| DriverError::UnreadableInput {
                    path: err.path().map_or_else(|| input.clone(), Path::to_path_buf),
                    source: err.into(),
                })?;
                let is_header = entry.path().extension().is_some_and(|ext| ext == "h");
                if entry.file_type().is_file() && is_header {
                    headers.push(entry.into_path());
                }
            }
        }
        Ok(headers)
    }

    /// Read one header.
    pub fn read_unit(&self, path: &Path) -> Result<SourceUnit> {
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceUnit::new(path, content))
    }

    /// Extract every header under `inputs`, then `inline` if given, into one
    /// class set.
    pub fn extract(&self, inputs: &[PathBuf], inline: Option<&str>) -> Result<ClassSet> {
        let extractor = self.extractor()?;
        tracing::debug!(strategy = extractor.name(), "extracting");

        let mut units = Vec::new();
        for path in self.collect_inputs(inputs)? {
            units.push(self.read_unit(&path)?);
        }
        if let Some(source) = inline {
            units.push(SourceUnit::inline(source));
        }

        let mut classes = ClassSet::new();
        for unit in &units {
            tracing::debug!(path = %unit.path.display(), "reading header");
            classes = extractor
                .extract(unit, classes)
                .wrap_err_with(|| format!("failed to extract `{}`", unit.path.display()))?;
        }
        Ok(classes)
    }

    /// Emit one reflowed module per class.
    pub fn emit(&self, classes: &ClassSet) -> Vec<GeneratedFile> {
        let emitter = TsEmitter::new(self.config.output.bridge_module.as_str());
        classes
            .iter()
            .map(|class| {
                let mut file = emitter.emit_class(class, classes);
                file.source = reflow(&file.source);
                file
            })
            .collect()
    }

    /// Write generated modules to the output directory.
    pub fn write(&self, files: &[GeneratedFile]) -> Result<()> {
        let dir = &self.config.output.dir;
        std::fs::create_dir_all(dir).map_err(|source| DriverError::UnwritableOutput {
            path: dir.clone(),
            source,
        })?;
        for file in files {
            let path = dir.join(&file.file_name);
            std::fs::write(&path, &file.source)
                .map_err(|source| DriverError::UnwritableOutput { path: path.clone(), source })?;
            tracing::debug!(path = %path.display(), "wrote module");
        }
        Ok(())
    }

    /// Extract, emit and write.
    pub fn run(&self, inputs: &[PathBuf], inline: Option<&str>) -> Result<RunSummary> {
        let classes = self.extract(inputs, inline)?;
        let files = self.emit(&classes);
        self.write(&files)?;

        let summary = RunSummary {
            classes: classes.len(),
            files: files.len(),
            warnings: classes.warning_count()
                + files.iter().map(|f| f.diagnostics.len()).sum::<usize>(),
        };
        tracing::info!("{}", summary);
        Ok(summary)
    }
}

/// Single-method mode: parse one declaration and emit its member.
pub fn bind_method(decl: &str) -> Result<MethodBinding> {
    let method = parse_method(decl)?;
    let mut class = ClassModel::new("Inline");
    class.methods.push(method.clone());
    let typescript = TsEmitter::default().emit_members(&class);
    Ok(MethodBinding { method, typescript })
}
