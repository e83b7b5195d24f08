use crate::cli::InfoOpts;
use crate::trace::Trace;
use anyhow::Result;

pub fn run(opts: InfoOpts) -> Result<()> {
    let trace = Trace::open(&opts.input)?;
    let table = trace.tag_table();

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("File:    {}", opts.input);
    println!("Version: {}", trace.version());
    if let Ok(read) = trace.read() {
        let name = if read.name.is_empty() {
            "<unnamed>"
        } else {
            read.name.as_str()
        };
        println!("Sample:  {} ({} bases)", name, read.seq.len());
    }
    println!();
    println!("{:<8} {:<8} {:>6} {:>8}  value", "tag", "type", "count", "bytes");
    for row in &table {
        println!(
            "{:<8} {:<8} {:>6} {:>8}  {}",
            row.tag, row.elem_type, row.elem_count, row.data_size, row.value
        );
    }
    Ok(())
}
