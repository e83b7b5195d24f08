use crate::cli::MergeOpts;
use crate::config::Config;
use crate::export;
use crate::merge::{merge_reads, MergeConfig, MergeOutcome, ScoringWeights};
use crate::trace::Trace;
use crate::types::OutputFormat;
use anyhow::{bail, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn sample_or_stem(trace: &Trace, path: &str) -> String {
    let name = trace.sample_name();
    if !name.is_empty() {
        return name;
    }
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn build_config(opts: &MergeOpts) -> MergeConfig {
    let defaults = Config::load().merge;
    MergeConfig {
        min_overlap_length: opts.min_overlap.unwrap_or(defaults.min_overlap),
        min_percent_identity: opts.min_identity.unwrap_or(defaults.min_identity),
        join_gap_length: opts.join_gap.unwrap_or(defaults.join_gap),
        weights: ScoringWeights {
            match_score: opts.match_score.unwrap_or(defaults.match_score),
            mismatch: opts.mismatch_score.unwrap_or(defaults.mismatch_score),
            gap: opts.gap_score.unwrap_or(defaults.gap_score),
            gap_opening: opts.gap_score.unwrap_or(defaults.gap_score),
            min_score: opts.min_score.unwrap_or(defaults.min_score),
        },
        trim_window: opts.trim_window.unwrap_or(defaults.trim_window),
        trim_threshold: opts.trim_threshold.unwrap_or(defaults.trim_threshold),
        trim_enabled: !opts.no_trim && defaults.trim,
    }
}

pub fn run(opts: MergeOpts) -> Result<()> {
    let forward = Trace::open(&opts.forward)?;
    let reverse = Trace::open(&opts.reverse)?;
    let fwd = forward.read()?;
    let rev = reverse.read()?;

    let config = build_config(&opts);
    let outcome = merge_reads(&fwd.seq, &fwd.qual, &rev.seq, &rev.qual, &config)?;

    let merged = match outcome {
        MergeOutcome::Merged(m) => m,
        MergeOutcome::NoOverlap => bail!(
            "reads from {} and {} did not merge: no overlap met the acceptance \
             thresholds (rerun with --join-gap to concatenate anyway)",
            opts.forward,
            opts.reverse
        ),
    };

    let name = opts.name.clone().unwrap_or_else(|| {
        format!(
            "{}_{}",
            sample_or_stem(&forward, &opts.forward),
            sample_or_stem(&reverse, &opts.reverse)
        )
    });

    let out: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    match opts.format {
        OutputFormat::Fasta => export::write_fasta(out, &name, None, &merged.seq)?,
        OutputFormat::Fastq => export::write_fastq(out, &name, None, &merged.seq, &merged.qual)?,
    }

    Ok(())
}
