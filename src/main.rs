use amortize::*;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use std::process;

/// Fixed-rate loan payments, schedules and effective rates
#[derive(Parser)]
#[command(name = "amortize", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, including any fees
    Payment(LoanArgs),
    /// Month-by-month repayment schedule
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,

        /// First month of the loan as YYYY-MM (defaults to the current month)
        #[arg(long, value_parser = parse_start)]
        start: Option<NaiveDate>,
    },
    /// Effective annual rate implied by a known monthly payment
    EffectiveRate {
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        payment: f64,

        /// Term in years
        #[arg(long)]
        years: f64,

        #[arg(long, default_value_t = EffectiveRateSolver::default().max_iterations)]
        max_iterations: u32,
    },
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    amount: f64,

    /// Annual rate as a decimal fraction, e.g. 0.075
    #[arg(long)]
    rate: f64,

    /// Term in years
    #[arg(long)]
    years: f64,

    /// One-time fee financed into the loan (repeatable)
    #[arg(long = "principal-fee", value_parser = RawFee::parse_strict)]
    principal_fees: Vec<f64>,

    /// Fee added to every monthly payment (repeatable)
    #[arg(long = "period-fee", value_parser = RawFee::parse_strict)]
    period_fees: Vec<f64>,
}

impl LoanArgs {
    fn terms(&self) -> LoanTerms {
        LoanTerms::new(self.amount, self.rate, self.years)
    }

    fn fees(&self) -> FeeSet {
        FeeSet::new(self.principal_fees.clone(), self.period_fees.clone())
    }
}

fn parse_start(s: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Payment(loan) => {
            let pmt = compute_amortization_with_fees(&loan.terms(), &loan.fees());
            println!("{:.2}", pmt);
        }
        Commands::Schedule { loan, start } => {
            let schedule = generate_schedule(&loan.terms(), &loan.fees(), start);
            print!("{}", schedule);
            info!(
                "total interest ${:.2}, total fees ${:.2}, total paid ${:.2}",
                schedule.total_interest(),
                schedule.total_fees(),
                schedule.total_paid()
            );
        }
        Commands::EffectiveRate {
            amount,
            payment,
            years,
            max_iterations,
        } => {
            let rate = EffectiveRateSolver::default()
                .with_max_iterations(max_iterations)
                .solve(amount, payment, years)?;
            println!("{:.4}", rate);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(log_level(cli.verbose)).init() {
        eprintln!("failed to initialise logging: {e}");
    }

    if let Err(e) = run(cli.command) {
        error!("{e}");
        process::exit(1);
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanTerms>();
    is_normal::<FeeSet>();
    is_normal::<ScheduleEntry>();
    is_normal::<Schedule>();
    is_normal::<CalendarMonth>();
    is_normal::<AmortizeError>();
}

#[test]
fn parses_start_month() {
    assert_eq!(parse_start("2024-07").ok(), NaiveDate::from_ymd_opt(2024, 7, 1));
    assert!(parse_start("July").is_err());
}
