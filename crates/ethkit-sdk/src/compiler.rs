//! Solidity compiler boundary
//!
//! The SDK never compiles anything itself. A [`Compiler`] turns sources into
//! bytecode plus ABI; [`SolcCompiler`] drives a `solc` binary through its
//! standard-JSON interface.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::abi::AbiParser;
use crate::SdkError;

/// Import lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// No file at this path
    #[error("import not found: {0}")]
    NotFound(String),
}

/// Supplies the contents of imported files
pub trait ImportResolver: Send + Sync {
    /// Contents of `path`
    fn resolve(&self, path: &str) -> Result<String, ImportError>;
}

impl<F> ImportResolver for F
where
    F: Fn(&str) -> Result<String, ImportError> + Send + Sync,
{
    fn resolve(&self, path: &str) -> Result<String, ImportError> {
        self(path)
    }
}

/// In-memory file table
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: HashMap<String, String>,
}

impl MemoryResolver {
    /// Empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl ImportResolver for MemoryResolver {
    fn resolve(&self, path: &str) -> Result<String, ImportError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::NotFound(path.to_string()))
    }
}

/// Optimizer and target settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    /// Run the optimizer
    pub optimizer: bool,
    /// Optimizer runs
    pub runs: u32,
    /// Target EVM version, compiler default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            optimizer: false,
            runs: 200,
            evm_version: None,
        }
    }
}

/// Sources plus settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerInput {
    /// Path → source text
    pub sources: IndexMap<String, String>,
    /// Settings
    pub settings: CompilerSettings,
}

impl CompilerInput {
    /// Single-file input
    pub fn single(path: impl Into<String>, source: impl Into<String>) -> Self {
        let mut sources = IndexMap::new();
        sources.insert(path.into(), source.into());
        Self {
            sources,
            settings: CompilerSettings::default(),
        }
    }

    /// Pull every transitively imported file into `sources`
    pub fn resolve_imports(&mut self, resolver: &dyn ImportResolver) -> Result<(), ImportError> {
        let mut pending: Vec<(String, String)> = self
            .sources
            .iter()
            .map(|(path, source)| (path.clone(), source.clone()))
            .collect();

        while let Some((path, source)) = pending.pop() {
            for import in import_paths(&source) {
                let target = join_import(&path, &import);
                if self.sources.contains_key(&target) {
                    continue;
                }
                let content = resolver.resolve(&target)?;
                debug!(from = %path, import = %target, "resolved import");
                self.sources.insert(target.clone(), content.clone());
                pending.push((target, content));
            }
        }
        Ok(())
    }

    /// solc standard-JSON input document
    pub fn to_standard_json(&self) -> serde_json::Value {
        let sources: serde_json::Map<String, serde_json::Value> = self
            .sources
            .iter()
            .map(|(path, content)| (path.clone(), serde_json::json!({ "content": content })))
            .collect();

        let mut settings = serde_json::json!({
            "optimizer": { "enabled": self.settings.optimizer, "runs": self.settings.runs },
            "outputSelection": { "*": { "*": ["abi", "evm.bytecode.object"] } },
        });
        if let Some(version) = &self.settings.evm_version {
            settings["evmVersion"] = serde_json::Value::String(version.clone());
        }

        serde_json::json!({
            "language": "Solidity",
            "sources": sources,
            "settings": settings,
        })
    }
}

/// Paths named by `import` directives
fn import_paths(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("import"))
        .filter_map(|line| {
            let quote = line.find(['"', '\''])?;
            let delimiter = line[quote..].chars().next()?;
            let rest = &line[quote + 1..];
            let end = rest.find(delimiter)?;
            Some(rest[..end].to_string())
        })
        .collect()
}

/// Resolve `./` and `../` imports against the importing file's directory
fn join_import(from: &str, import: &str) -> String {
    if !(import.starts_with("./") || import.starts_with("../")) {
        return import.to_string();
    }
    let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
    let mut out = PathBuf::new();
    for component in base.join(import).components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().replace('\\', "/")
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks deployment
    Error,
    /// Informational
    Warning,
    /// Informational
    Info,
}

/// One compiler message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerDiagnostic {
    /// Severity
    pub severity: Severity,
    /// Short message
    pub message: String,
    /// Message with source context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
}

/// One compiled contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    /// Source file the contract is defined in
    pub source: String,
    /// Contract ABI
    pub abi: AbiParser,
    /// Init bytecode, hex without `0x`
    pub bytecode: String,
}

/// Compilation result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    /// Contract name → artifact
    pub contracts: IndexMap<String, CompiledContract>,
    /// Diagnostics
    pub errors: Vec<CompilerDiagnostic>,
}

#[derive(Deserialize)]
struct StandardOutput {
    #[serde(default)]
    errors: Vec<CompilerDiagnostic>,
    #[serde(default)]
    contracts: IndexMap<String, IndexMap<String, StandardContract>>,
}

#[derive(Deserialize)]
struct StandardContract {
    #[serde(default)]
    abi: serde_json::Value,
    #[serde(default)]
    evm: Option<StandardEvm>,
}

#[derive(Deserialize)]
struct StandardEvm {
    bytecode: StandardBytecode,
}

#[derive(Deserialize)]
struct StandardBytecode {
    object: String,
}

impl CompilerOutput {
    /// Parse solc standard-JSON output
    pub fn from_standard_json(json: &str) -> Result<Self, SdkError> {
        let raw: StandardOutput =
            serde_json::from_str(json).map_err(|e| SdkError::Compiler(format!("invalid compiler output: {}", e)))?;

        let mut contracts = IndexMap::new();
        for (source, by_name) in raw.contracts {
            for (name, contract) in by_name {
                let abi = if contract.abi.is_null() {
                    AbiParser::default()
                } else {
                    AbiParser::from_json_str(&contract.abi.to_string())?
                };
                let bytecode = contract.evm.map(|evm| evm.bytecode.object).unwrap_or_default();
                contracts.insert(
                    name,
                    CompiledContract {
                        source: source.clone(),
                        abi,
                        bytecode,
                    },
                );
            }
        }

        Ok(Self {
            contracts,
            errors: raw.errors,
        })
    }

    /// Diagnostics with severity `error`
    pub fn error_diagnostics(&self) -> Vec<&CompilerDiagnostic> {
        self.errors
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    /// Whether any diagnostic blocks deployment
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|d| d.severity == Severity::Error)
    }

    /// Contract by name
    pub fn contract(&self, name: &str) -> Option<&CompiledContract> {
        self.contracts.get(name)
    }
}

/// Compiles Solidity sources
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `input`, resolving imports through `resolver` when given
    async fn compile(
        &self,
        input: &CompilerInput,
        resolver: Option<&dyn ImportResolver>,
    ) -> Result<CompilerOutput, SdkError>;
}

/// `solc --standard-json` subprocess
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    binary: PathBuf,
}

impl SolcCompiler {
    /// Use the `solc` on `PATH`
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("solc"),
        }
    }

    /// Use a specific binary
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Compiler for SolcCompiler {
    async fn compile(
        &self,
        input: &CompilerInput,
        resolver: Option<&dyn ImportResolver>,
    ) -> Result<CompilerOutput, SdkError> {
        let mut input = input.clone();
        if let Some(resolver) = resolver {
            input
                .resolve_imports(resolver)
                .map_err(|e| SdkError::Compiler(e.to_string()))?;
        }
        let document = input.to_standard_json().to_string();

        let mut child = Command::new(&self.binary)
            .arg("--standard-json")
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| SdkError::Compiler(format!("{}: {}", self.binary.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(document.as_bytes())
                .await
                .map_err(|e| SdkError::Compiler(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SdkError::Compiler(e.to_string()))?;
        if !output.status.success() {
            return Err(SdkError::Compiler(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        CompilerOutput::from_standard_json(&stdout)
    }
}
