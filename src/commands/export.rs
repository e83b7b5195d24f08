use crate::cli::ExportOpts;
use crate::export;
use crate::merge::trim_ends;
use crate::trace::Trace;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn output_path(input: &str, output_dir: Option<&str>, format: OutputFormat) -> PathBuf {
    let input = Path::new(input);
    let mut path = match output_dir {
        Some(dir) => Path::new(dir).join(input.file_name().unwrap_or_default()),
        None => input.to_path_buf(),
    };
    path.set_extension(format.extension());
    path
}

pub fn run(opts: ExportOpts) -> Result<()> {
    if opts.trim && opts.trim_window < 1 {
        anyhow::bail!("trim window must be at least 1 base");
    }
    if let Some(dir) = &opts.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir))?;
    }

    let progress = ProgressBar::new(opts.inputs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut errors = 0usize;
    for input in &opts.inputs {
        progress.set_message(input.clone());
        if let Err(e) = export_one(input, &opts) {
            eprintln!("Error exporting {}: {:#}", input, e);
            errors += 1;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if errors > 0 {
        anyhow::bail!("{} of {} trace files failed to export", errors, opts.inputs.len());
    }
    Ok(())
}

fn export_one(input: &str, opts: &ExportOpts) -> Result<()> {
    let trace = Trace::open(input)?;
    let mut read = trace.read()?;
    let name = if read.name.is_empty() {
        Path::new(input)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string())
    } else {
        read.name.clone()
    };

    if opts.trim {
        let trimmed = trim_ends(&read.seq, &read.qual, opts.trim_window, opts.trim_threshold);
        read.seq = trimmed.seq;
        read.qual = trimmed.qual;
    }

    let path = output_path(input, opts.output_dir.as_deref(), opts.format);
    let out = BufWriter::new(
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    match opts.format {
        OutputFormat::Fasta => export::write_fasta(out, &name, None, &read.seq)?,
        OutputFormat::Fastq => export::write_fastq(out, &name, None, &read.seq, &read.qual)?,
    }
    Ok(())
}
