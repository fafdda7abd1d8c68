//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::resolver::DEFAULT_ADDR2LINE;

#[derive(Parser)]
#[command(
    name = "ksymfilter",
    about = "Rewrite kernel log addresses into function and file locations",
    after_help = "\
EXAMPLES:
    ksymfilter -e vmlinux < trace.csv        Kernel addresses only
    ksymfilter -e vmlinux -m modules.list -d /lib/modules/extra < trace.csv
                                             Kernel plus loadable modules
    ksymfilter < trace.csv                   No images: pass through unchanged"
)]
pub struct Args {
    /// Kernel image for addresses in the fixed kernel text range
    #[arg(short = 'e', long, value_name = "FILE")]
    pub kernel: Option<PathBuf>,

    /// Module table file: name, decimal size and 0x-prefixed base address per line
    #[arg(short, long, value_name = "FILE")]
    pub module: Option<PathBuf>,

    /// Directory containing the <name>.ko module binaries
    #[arg(short = 'd', long, alias = "module_dir", value_name = "DIR", default_value = ".")]
    pub module_dir: PathBuf,

    /// Symbolization executable to spawn per binary image
    #[arg(long, value_name = "BIN", default_value = DEFAULT_ADDR2LINE)]
    pub addr2line: String,
}
