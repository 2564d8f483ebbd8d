//! Subcommand implementations
//!
//! Each command writes its report to `out` and returns the process exit
//! code. Only unexpected errors (unreadable files and the like) are
//! returned as `Err`.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use blocksmith_core::{
    GenerationRequest, GenerationResult, Generator, PipelineConfig, StaticProvider, TokenUsage,
};
use blocksmith_extract::normalize_payload;
use blocksmith_schema::{ComplianceValidator, ContentBlock, ManifestError, SchemaManifest};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::{CheckManifestArgs, RepairArgs, ValidateArgs};

/// `check-manifest`
pub(crate) fn check_manifest(args: &CheckManifestArgs, out: &mut dyn Write) -> Result<ExitCode> {
    let manifest = match SchemaManifest::load(&args.manifest) {
        Ok(manifest) => manifest,
        Err(ManifestError::Invalid { problems }) => {
            tracing::warn!(manifest = %args.manifest.display(), problems = problems.len(), "manifest rejected");
            writeln!(out, "{}: {} problem(s)", args.manifest.display(), problems.len())?;
            for problem in problems {
                writeln!(out, "  - {problem}")?;
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).with_context(|| format!("loading {}", args.manifest.display())),
    };

    tracing::info!(version = %manifest.version, block_types = manifest.blocks.len(), "manifest checked");
    writeln!(out, "manifest {} ({} block types)", manifest.version, manifest.blocks.len())?;
    for spec in &manifest.blocks {
        let marker = if spec.mandatory { "mandatory" } else { "optional" };
        writeln!(
            out,
            "  {} [{marker}] required: {}",
            spec.block_type,
            spec.required_fields.join(", ")
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

/// `repair`
pub(crate) async fn repair(args: &RepairArgs, out: &mut dyn Write) -> Result<ExitCode> {
    let manifest = SchemaManifest::load(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let request = GenerationRequest::new(args.topic.clone())
        .with_keywords(args.keywords.iter().cloned())
        .with_selected_blocks(args.select.iter().cloned())
        .with_manifest(Arc::new(manifest));
    let generator = Generator::new(Arc::new(StaticProvider::new(text, TokenUsage::default())), config);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = generator.generate(&request, &mut rng).await?;
    tracing::info!(input = %args.input.display(), outcome = result.outcome(), "repair finished");

    match result {
        GenerationResult::Success(success) => {
            if args.json {
                let values: Vec<_> = success.blocks.iter().map(ContentBlock::to_value).collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&values)?)?;
            } else {
                writeln!(
                    out,
                    "{:?} output: {} block(s), {} repair(s)",
                    success.origin,
                    success.blocks.len(),
                    success.repairs.len()
                )?;
                for event in &success.repairs {
                    writeln!(out, "  {event}")?;
                }
                for block in &success.blocks {
                    writeln!(out, "  {} {}", block.block_type, block.key)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        GenerationResult::Failure(failure) => {
            writeln!(out, "generation failed: {}", failure.reason)?;
            for event in &failure.repairs {
                writeln!(out, "  {event}")?;
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `validate`
pub(crate) fn validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<ExitCode> {
    let manifest = SchemaManifest::load(&args.manifest)
        .with_context(|| format!("loading {}", args.manifest.display()))?;
    let source = std::fs::read_to_string(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;
    let document: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("parsing {}", args.document.display()))?;

    let (blocks, _) = normalize_payload(document);
    let report = ComplianceValidator::new(&manifest).validate(&blocks);
    tracing::info!(
        document = %args.document.display(),
        blocks = blocks.len(),
        warnings = report.warnings.len(),
        "document validated"
    );
    if report.compliant {
        writeln!(out, "compliant: {} block(s)", blocks.len())?;
        return Ok(ExitCode::SUCCESS);
    }
    writeln!(out, "{} warning(s)", report.warnings.len())?;
    for warning in &report.warnings {
        writeln!(out, "  {warning}")?;
    }
    Ok(ExitCode::FAILURE)
}
