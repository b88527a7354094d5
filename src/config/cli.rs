use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "giftpay")]
#[command(about = "Pay down a tuition balance with a stack of gift cards")]
pub struct Cli {
    /// Cards CSV to load, taking precedence over the CARDS_CSV setting
    #[arg(long)]
    pub cards_csv: Option<PathBuf>,

    /// Opening account balance the rehearsal portal starts from
    #[arg(long, default_value = "1000.00")]
    pub opening_balance: Decimal,

    /// Transaction fee percent the rehearsal portal quotes
    #[arg(long, default_value = "2.85")]
    pub fee_percent: Decimal,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
