use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

use tax_cli::config::AppConfig;
use tax_cli::logging;
use tax_cli::report::{AnalysisReport, BatchLine, SalaryReport, SimulationReport};
use tax_cli::terminal::Terminal;
use tax_cli::utils::parse_decimal;
use tax_core::CarUsage;
use tax_core::calculations::{
    ANALYSIS_STAGES, InvestmentSimulator, RatioAnalyst, RatioInput, SalaryTaxInput,
    SalaryTaxWorksheet, SimulationInput,
};
use tax_data::SalaryInputLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Pakistan salary tax estimator (FY 2025-26) with an investment simulator
/// and a ratio analyst.
#[derive(Debug, Parser)]
#[command(name = "pktax", version)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute salary tax for one set of inputs and print the audit trail.
    Salary(SalaryArgs),

    /// Compute salary tax for every row of a CSV file.
    Batch {
        #[arg(long)]
        file: PathBuf,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Project an investment with monthly compounding.
    Simulate {
        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        initial: Decimal,

        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        monthly: Decimal,

        /// Annual rate in percent.
        #[arg(long, value_parser = parse_decimal)]
        rate: Decimal,

        #[arg(long)]
        years: u32,

        #[arg(long)]
        json: bool,
    },

    /// Comment on net margin and current ratio.
    Analyze {
        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        revenue: Decimal,

        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        expenses: Decimal,

        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        assets: Decimal,

        #[arg(long, default_value = "0", value_parser = parse_decimal)]
        liabilities: Decimal,

        #[arg(long)]
        json: bool,
    },

    /// Interactive command console.
    Terminal,
}

/// Annual amounts in PKR; commas are allowed (e.g. `--basic 1,200,000`).
#[derive(Debug, Args)]
struct SalaryArgs {
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    basic: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    bonus: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    other_allowance: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    medical_allowance: Decimal,
    /// Employer provides medical facility (allowance fully taxable).
    #[arg(long)]
    medical_facility: bool,

    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    car_cost: Decimal,
    /// `partial` or `full` personal use.
    #[arg(long, default_value = "partial", value_parser = parse_car_usage)]
    car_usage: CarUsage,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    share_fmv: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    share_cost: Decimal,
    #[arg(long)]
    housing_provided: bool,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    loan_principal: Decimal,
    /// Markup charged on the employer loan, in percent.
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    loan_rate: Decimal,

    /// Flying allowance or other separately taxed block income.
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    block_income: Decimal,

    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    zakat: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    edu_fees: Decimal,
    #[arg(long, default_value = "0")]
    children: u32,

    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    donations: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pension: Decimal,
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    housing_loan_interest: Decimal,

    #[arg(long)]
    teacher: bool,
    #[arg(long)]
    senior: bool,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

impl From<&SalaryArgs> for SalaryTaxInput {
    fn from(args: &SalaryArgs) -> Self {
        SalaryTaxInput {
            basic_salary_annual: args.basic,
            bonus_annual: args.bonus,
            other_allowance_annual: args.other_allowance,
            medical_allowance_annual: args.medical_allowance,
            medical_facility_provided: args.medical_facility,
            company_car_cost: args.car_cost,
            company_car_usage: args.car_usage,
            share_fair_market_value: args.share_fmv,
            share_cost_to_employee: args.share_cost,
            housing_provided: args.housing_provided,
            employer_loan_principal: args.loan_principal,
            employer_loan_rate_percent: args.loan_rate,
            flying_allowance_or_block_income: args.block_income,
            zakat_paid: args.zakat,
            edu_fees_annual: args.edu_fees,
            edu_child_count: args.children,
            donations_amount: args.donations,
            pension_fund_contribution: args.pension,
            housing_loan_interest_paid: args.housing_loan_interest,
            is_teacher_or_researcher: args.teacher,
            is_senior_citizen: args.senior,
        }
    }
}

fn parse_car_usage(s: &str) -> Result<CarUsage, String> {
    CarUsage::parse(s).ok_or_else(|| format!("expected 'partial' or 'full', got '{s}'"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    debug!(command = ?cli.command, "running");

    match cli.command {
        Command::Salary(args) => {
            let worksheet = SalaryTaxWorksheet::new(config.salary_tax)?;
            let result = worksheet.calculate(&SalaryTaxInput::from(&args));
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", SalaryReport(&result));
            }
        }
        Command::Batch { file, json } => {
            let worksheet = SalaryTaxWorksheet::new(config.salary_tax)?;
            let records = SalaryInputLoader::load_from_file(&file)
                .with_context(|| format!("failed to load inputs from '{}'", file.display()))?;
            info!(rows = records.len(), "batch loaded");

            let results: Vec<_> = records
                .iter()
                .map(|record| (record.name.as_str(), worksheet.calculate(&record.input)))
                .collect();

            if json {
                let entries: Vec<_> = results
                    .iter()
                    .map(|(name, result)| json!({ "name": name, "result": result }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (name, result) in &results {
                    println!("{}", BatchLine { name, result });
                }
            }
        }
        Command::Simulate {
            initial,
            monthly,
            rate,
            years,
            json,
        } => {
            let result = InvestmentSimulator::simulate(&SimulationInput {
                initial_deposit: initial,
                monthly_contribution: monthly,
                annual_rate_percent: rate,
                years,
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", SimulationReport(&result));
            }
        }
        Command::Analyze {
            revenue,
            expenses,
            assets,
            liabilities,
            json,
        } => {
            let analysis = RatioAnalyst::new(config.analyst).analyze(&RatioInput {
                revenue,
                expenses,
                current_assets: assets,
                current_liabilities: liabilities,
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                for stage in ANALYSIS_STAGES {
                    println!("> {stage}");
                }
                println!("{}", AnalysisReport(&analysis));
            }
        }
        Command::Terminal => {
            let mut terminal = Terminal::new(config.terminal);
            terminal.run(io::stdin().lock(), io::stdout().lock())?;
        }
    }

    Ok(())
}
