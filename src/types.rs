#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[value(name = "fasta")]
    Fasta,
    #[value(name = "fastq")]
    Fastq,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Fasta => "fasta",
            OutputFormat::Fastq => "fastq",
        }
    }
}
