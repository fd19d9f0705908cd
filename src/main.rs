// Sun Oct 18 2026 - Alex

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use j9_layout_dump::{
    catalog::StructureCatalog,
    config::Config,
    dumper::{ClassSummaryHelper, LinearDumper, RegionPrinter},
    memory::{Address, ImageMemory, MemoryReader},
    utils::LoggingUtils,
    walker::{constant_pool::ShapeEncoding, ClassWalker, WalkContext},
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Linear layout dumps of J9 ROM and RAM classes from a memory image", long_about = None)]
struct Args {
    /// Raw memory image to read classes from
    image: PathBuf,

    /// Address the first byte of the image was mapped at
    #[arg(long, value_parser = parse_address)]
    base: Address,

    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON structure schema replacing the built-in one
    #[arg(long)]
    schema: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log level (error, warn, info, debug, trace, off); overrides -v
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the layout of one ROM class
    Rom {
        #[arg(value_parser = parse_address)]
        address: Address,

        #[arg(long)]
        summary: bool,
    },
    /// Dump the layout of one RAM class
    Ram {
        #[arg(value_parser = parse_address)]
        address: Address,

        #[arg(long)]
        summary: bool,
    },
    /// Aggregate section sizes over many ROM classes
    Summary {
        #[arg(value_parser = parse_address, required = true)]
        addresses: Vec<Address>,

        /// Only count classes whose name matches
        #[arg(long)]
        filter: Option<String>,
    },
}

fn parse_address(s: &str) -> Result<Address, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16)
        .map(Address::new)
        .map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let args = Args::parse();
    LoggingUtils::init(args.verbose as usize, args.log_level.as_deref());

    if let Err(e) = run(args) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let catalog = match &args.schema {
        Some(path) => Arc::new(
            StructureCatalog::from_json_file(path).with_context(|| format!("loading schema {}", path.display()))?,
        ),
        None => StructureCatalog::builtin(),
    };

    let image = ImageMemory::map_file(&args.image, args.base)
        .with_context(|| format!("mapping image {}", args.image.display()))?
        .with_pointer_size(config.pointer_size);
    let reader: Arc<dyn MemoryReader> = Arc::new(image);
    let shape_encoding = ShapeEncoding::from_bits(config.cp_description_bits)
        .with_context(|| format!("unsupported cp_description_bits {}", config.cp_description_bits))?;
    let cx = WalkContext::new(reader.clone(), catalog).with_shape_encoding(shape_encoding);

    eprintln!("{} Image {} mapped at {}", "[*]".blue(), args.image.display(), args.base);

    match args.command {
        Command::Rom { address, summary } => dump_class(&config, ClassWalker::rom(cx.clone(), address), &cx, summary),
        Command::Ram { address, summary } => dump_class(&config, ClassWalker::ram(cx.clone(), address), &cx, summary),
        Command::Summary { addresses, filter } => summarize(&config, &cx, &addresses, filter.as_deref()),
    }
}

fn dump_class(config: &Config, walker: ClassWalker, cx: &WalkContext, summary: bool) -> Result<()> {
    let name = walker.class_name().unwrap_or_else(|_| "<unknown>".to_string());
    let mut dumper = LinearDumper::new(cx.shared_reader()).with_grouped_sections(config.grouped_sections.clone());
    let tree = dumper
        .gather_layout_info(&walker)
        .with_context(|| format!("walking {:?} class {} at {}", walker.kind(), name, walker.address()))?;

    eprintln!("{} {} at {}", "[+]".green(), name, walker.address());
    let printer = RegionPrinter::new(cx.clone()).with_nesting_threshold(config.nesting_threshold);
    print!("{}", printer.render(&tree));

    if summary {
        let mut helper = ClassSummaryHelper::new(&config.summary_order);
        helper.add_regions_for_class(&tree);
        println!();
        print!("{}", helper.print_statistics());
    }
    Ok(())
}

fn summarize(config: &Config, cx: &WalkContext, addresses: &[Address], filter: Option<&str>) -> Result<()> {
    let filter = filter.map(Regex::new).transpose().context("invalid --filter pattern")?;
    let mut helper = ClassSummaryHelper::new(&config.summary_order);

    for &address in addresses {
        let walker = ClassWalker::rom(cx.clone(), address);
        let name = match walker.class_name() {
            Ok(name) => name,
            Err(e) => {
                log::warn!("skipping class at {}: {}", address, e);
                continue;
            }
        };
        if filter.as_ref().is_some_and(|re| !re.is_match(&name)) {
            continue;
        }

        let mut dumper = LinearDumper::new(cx.shared_reader()).with_grouped_sections(config.grouped_sections.clone());
        match dumper.gather_layout_info(&walker) {
            Ok(tree) => helper.add_regions_for_class(&tree),
            Err(e) if e.is_structure_not_found() => {
                return Err(e).context("structure metadata does not match this image");
            }
            Err(e) => log::warn!("skipping {} at {}: {}", name, address, e),
        }
    }

    eprintln!("{} Summarised {} classes", "[+]".green(), helper.class_count());
    print!("{}", helper.print_statistics());
    Ok(())
}
