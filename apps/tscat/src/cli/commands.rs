//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Every command writes its report to the given writer; files are only
//! written by `export`, `compile` and `prune`.

use crate::config::Settings;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tscat_core::{
    Catalog, CatalogError, CatalogStats, Translator, catalog_from_bytes, catalog_to_string,
    compile, is_compiled, primitives::MAX_CATALOG_SIZE, validate,
};

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Read and parse a `.ts` catalog.
///
/// Compiled catalogs are rejected: they only hold the lookup table, not the
/// document.
fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        CatalogError::IoError(format!("Cannot read file metadata '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CATALOG_SIZE as u64 {
        return Err(CatalogError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CATALOG_SIZE
        )));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| CatalogError::IoError(format!("Read file '{}': {}", path.display(), e)))?;
    if is_compiled(&bytes) {
        return Err(CatalogError::Unsupported(format!(
            "'{}' is a compiled catalog; only `lookup` reads compiled catalogs",
            path.display()
        )));
    }

    tracing::debug!("Parsing catalog {:?} ({} bytes)", path, bytes.len());
    catalog_from_bytes(&bytes)
}

/// Validate output path.
///
/// The parent directory must exist and be a directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, CatalogError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CatalogError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CatalogError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CatalogError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn write_output(path: &Path, data: &[u8]) -> Result<PathBuf, CatalogError> {
    let validated = validate_output_path(path)?;
    std::fs::write(&validated, data)
        .map_err(|e| CatalogError::IoError(format!("Write file '{}': {}", validated.display(), e)))?;
    Ok(validated)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(value).map_err(|e| CatalogError::SerializationError(e.to_string()))
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Resolve one string exactly as the runtime table would.
pub fn cmd_lookup(
    settings: &Settings,
    context: &str,
    disambiguation: &str,
    source: &str,
    json_mode: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let table = Translator::load(&settings.catalog, &settings.options)?;
    let translation = table.resolve(context, source, disambiguation);
    let resolved = translation.is_some();
    let translated = translation.unwrap_or(source);

    if json_mode {
        let output = serde_json::json!({
            "context": context,
            "source": source,
            "disambiguation": disambiguation,
            "translation": translated,
            "resolved": resolved,
        });
        writeln!(out, "{}", to_json(&output)?)?;
    } else {
        writeln!(out, "{}", translated)?;
    }

    if !resolved {
        tracing::debug!("No active translation for {:?} in {}", source, context);
    }
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List entries, active only unless `retired` is set.
pub fn cmd_list(
    settings: &Settings,
    context: Option<&str>,
    retired: bool,
    json_mode: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let catalog = load_catalog(&settings.catalog)?;
    let entries: Vec<_> = catalog
        .messages()
        .filter(|(c, _)| context.is_none_or(|name| c.name == name))
        .filter(|(_, m)| retired || !m.is_retired())
        .collect();

    if json_mode {
        let output: Vec<_> = entries
            .iter()
            .map(|(c, m)| {
                serde_json::json!({
                    "context": c.name,
                    "source": m.source,
                    "disambiguation": m.comment,
                    "translation": m.translation.as_ref().map(|t| t.text.as_str()),
                    "status": m.status(),
                    "locations": m.locations,
                })
            })
            .collect();
        writeln!(out, "{}", to_json(&output)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    for (c, m) in &entries {
        let translation = m.translation.as_ref().map(|t| t.text.as_str()).unwrap_or("");
        write!(out, "[{}] {:?} -> {:?}", c.name, m.source, translation)?;
        if let Some(comment) = &m.comment {
            write!(out, " ({:?})", comment)?;
        }
        if let Some(kind) = m.status().type_attr() {
            write!(out, " [{}]", kind)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{} entries", entries.len())?;

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show catalog statistics.
pub fn cmd_stats(
    settings: &Settings,
    json_mode: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let catalog = load_catalog(&settings.catalog)?;
    let stats = CatalogStats::from_catalog(&catalog);

    if json_mode {
        writeln!(out, "{}", to_json(&stats)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    let totals = &stats.totals;
    writeln!(out, "Catalog Statistics")?;
    writeln!(out, "==================")?;
    writeln!(out, "File:     {:?}", settings.catalog)?;
    writeln!(out, "Language: {}", stats.language.as_deref().unwrap_or("-"))?;
    writeln!(out)?;
    writeln!(out, "Contexts:     {}", stats.contexts.len())?;
    writeln!(out, "Messages:     {}", totals.total())?;
    writeln!(out, "Active:       {}", totals.active)?;
    writeln!(out, "Translated:   {}", totals.translated)?;
    writeln!(out, "Unfinished:   {}", totals.unfinished)?;
    writeln!(out, "Untranslated: {}", totals.untranslated)?;
    writeln!(out, "Obsolete:     {}", totals.obsolete)?;
    writeln!(out, "Vanished:     {}", totals.vanished)?;
    writeln!(out, "Locations:    {}", totals.locations)?;
    writeln!(
        out,
        "Completion:   {} per thousand",
        totals.completion_per_thousand()
    )?;
    writeln!(out)?;
    for context in &stats.contexts {
        writeln!(
            out,
            "  {:<24} {:>4} active {:>4} translated {:>4} retired",
            context.name,
            context.counts.active,
            context.counts.translated,
            context.counts.obsolete + context.counts.vanished
        )?;
    }

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report every problem. Exits with failure when there is any.
pub fn cmd_check(
    settings: &Settings,
    json_mode: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let catalog = load_catalog(&settings.catalog)?;
    let diagnostics = validate(&catalog);

    if json_mode {
        let output = serde_json::json!({
            "catalog": settings.catalog.to_string_lossy(),
            "ok": diagnostics.is_empty(),
            "diagnostics": diagnostics,
        });
        writeln!(out, "{}", to_json(&output)?)?;
    } else if diagnostics.is_empty() {
        writeln!(out, "OK: {} messages, no problems", catalog.message_count())?;
    } else {
        for diagnostic in &diagnostics {
            writeln!(out, "{}", diagnostic)?;
        }
        writeln!(out, "{} problem(s) found", diagnostics.len())?;
    }

    if diagnostics.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("{} problem(s) in {:?}", diagnostics.len(), settings.catalog);
        Ok(ExitCode::FAILURE)
    }
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Re-serialize the catalog as `.ts` or JSON.
pub fn cmd_export(
    settings: &Settings,
    output: &Path,
    format: &str,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let catalog = load_catalog(&settings.catalog)?;

    let data = match format {
        "ts" => catalog_to_string(&catalog).into_bytes(),
        "json" => serde_json::to_vec_pretty(&catalog)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?,
        _ => {
            return Err(CatalogError::SerializationError(format!(
                "Unknown format: {}. Use: ts, json",
                format
            )));
        }
    };

    let written = write_output(output, &data)?;
    writeln!(out, "Exported {} bytes to {:?}", data.len(), written)?;

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// COMPILE COMMAND
// =============================================================================

/// Write the compiled release form.
pub fn cmd_compile(
    settings: &Settings,
    output: &Path,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let catalog = load_catalog(&settings.catalog)?;
    let data = compile(&catalog, &settings.options)?;

    let written = write_output(output, &data)?;
    tracing::info!("Compiled {:?} -> {:?}", settings.catalog, written);
    writeln!(out, "Compiled {} bytes to {:?}", data.len(), written)?;

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// PRUNE COMMAND
// =============================================================================

/// Write the catalog without obsolete and vanished entries.
pub fn cmd_prune(
    settings: &Settings,
    output: &Path,
    out: &mut impl Write,
) -> Result<ExitCode, CatalogError> {
    let mut catalog = load_catalog(&settings.catalog)?;
    let removed = catalog.prune_retired();

    let written = write_output(output, catalog_to_string(&catalog).as_bytes())?;
    writeln!(
        out,
        "Removed {} retired entries, {} remain, written to {:?}",
        removed,
        catalog.message_count(),
        written
    )?;

    Ok(ExitCode::SUCCESS)
}
