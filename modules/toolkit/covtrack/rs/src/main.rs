use std::path::PathBuf;

use clap::{ArgAction, Parser};
use eyre::Result;
use log::LevelFilter;

use strandcov_covtrack_rs::{route, BamSource, Config};

/// Strand-specific bedGraph coverage tracks from RNA-seq alignments.
#[derive(Parser, Debug)]
#[command(name = "strandcov", author, version, about, long_about = None)]
struct Args {
    /// Input BAM file
    #[arg(short = 'i', long, value_name = "BAM")]
    input: PathBuf,

    /// Library type: forward (reads align to the transcript) or reverse (dUTP-like protocols)
    #[arg(long, value_name = "forward|reverse")]
    libtype: String,

    /// Prefix of the produced tracks: <prefix>.plus.bedgraph and <prefix>.minus.bedgraph
    #[arg(short = 'o', long, value_name = "PREFIX")]
    output_prefix: String,

    /// Aligned strands to process
    #[arg(long, value_name = "+|-", num_args = 1.., default_values = ["+", "-"])]
    strand: Vec<String>,

    /// Treat spliced reads as one contiguous interval
    #[arg(long)]
    no_split: bool,

    /// Calculate coverage of paired-end fragments instead of reads
    #[arg(long)]
    pc: bool,

    /// Force the fragment size to the observed template length
    #[arg(long)]
    fs: bool,

    /// Keep second mates on their own aligned strand
    #[arg(long)]
    no_du: bool,

    /// Do not split reads at deletions
    #[arg(long = "ignoreD")]
    ignore_d: bool,

    /// Scale the coverage by a constant factor
    #[arg(long, value_name = "FLOAT", default_value_t = 1.0)]
    scale: f64,

    /// Report covered intervals only (default)
    #[arg(long)]
    bg: bool,

    /// Report zero-coverage intervals as well
    #[arg(long)]
    bga: bool,

    /// Report positions with depth >= max-depth at max-depth
    #[arg(long, value_name = "INT")]
    max_depth: Option<u32>,

    /// Count only the 5' end of each read or fragment
    #[arg(long)]
    five_prime: bool,

    /// Count only the 3' end of each read or fragment
    #[arg(long)]
    three_prime: bool,

    /// Write a UCSC track definition line
    #[arg(long)]
    trackline: bool,

    /// Attributes of the track definition line, e.g. 'name="sample" color=0,0,255'
    #[arg(long, value_name = "STR")]
    trackopts: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config::new(&self.input, &self.libtype, &self.output_prefix)
            .with_strands(self.strand.iter().cloned())
            .with_split(!self.no_split)
            .with_paired(self.pc)
            .with_fragment_size(self.fs)
            .with_rescue_mate_strand(!self.no_du)
            .with_ignore_deletions(self.ignore_d)
            .with_scale(self.scale)
            .with_output_mode(self.bg || !self.bga, self.bga)
            .with_max_depth(self.max_depth)
            .with_endpoints(self.five_prime, self.three_prime)
            .with_trackline(self.trackline)
            .with_trackopts(self.trackopts.clone())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    if verbose > 0 || std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).format_target(false).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config();
    let source = BamSource::new(config.input());
    let produced = route(&source, &config)?;

    println!("Generated {} coverage files:", produced.len());
    for path in produced {
        println!("  {}", path.display());
    }
    Ok(())
}
