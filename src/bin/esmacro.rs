use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use eurostat_macro::countries::{COUNTRY_CODES, DEFAULT_COUNTRY};
use eurostat_macro::summary::{self, DEFAULT_HOME_CURRENCY};
use eurostat_macro::{EurostatClient, InstrumentCatalog, Measure, Query, Tenor, YahooClient};
use eurostat_macro::{stats, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "esmacro",
    version,
    about = "Fetch Eurostat macro series and compare them with an ETF in your home currency"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported country names and their Eurostat codes.
    Countries,
    /// Fetch one macro series (and optionally save, plot, and print stats).
    Fetch(FetchArgs),
    /// Convert an ETF's price and dividends into a home currency and chart it against a macro series.
    Summarise(SummariseArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MeasureArg {
    Gdp,
    Unemployment,
    Hicp,
    Rates,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TenorArg {
    #[value(name = "DTD", alias = "dtd")]
    Dtd,
    #[value(name = "M1", alias = "m1")]
    M1,
    #[value(name = "M3", alias = "m3")]
    M3,
    #[value(name = "M6", alias = "m6")]
    M6,
    #[value(name = "M12", alias = "m12")]
    M12,
}

impl From<TenorArg> for Tenor {
    fn from(t: TenorArg) -> Self {
        match t {
            TenorArg::Dtd => Tenor::Overnight,
            TenorArg::M1 => Tenor::OneMonth,
            TenorArg::M3 => Tenor::ThreeMonth,
            TenorArg::M6 => Tenor::SixMonth,
            TenorArg::M12 => Tenor::TwelveMonth,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct MacroArgs {
    /// Which series to fetch.
    #[arg(short, long, value_enum, default_value = "hicp")]
    measure: MeasureArg,
    /// Interest-rate tenor (only used with --measure rates).
    #[arg(long, value_enum, default_value = "M12")]
    tenor: TenorArg,
    /// First day to keep (YYYY-MM-DD).
    #[arg(short, long)]
    start: String,
    /// Last day to keep (YYYY-MM-DD); defaults to today.
    #[arg(short, long)]
    end: Option<String>,
    /// Country names separated by comma or semicolon (e.g. "Poland,Germany,Euro Zone").
    #[arg(short, long, default_value = DEFAULT_COUNTRY)]
    countries: String,
    /// Eurostat API base URL.
    #[arg(long, default_value = eurostat_macro::api::DEFAULT_BASE_URL)]
    base_url: String,
}

impl MacroArgs {
    fn measure(&self) -> Measure {
        match self.measure {
            MeasureArg::Gdp => Measure::Gdp,
            MeasureArg::Unemployment => Measure::Unemployment,
            MeasureArg::Hicp => Measure::Inflation,
            MeasureArg::Rates => Measure::InterestRate(self.tenor.into()),
        }
    }

    fn query(&self) -> Result<Query> {
        let mut q = Query::since(&self.start)?.countries(parse_list(&self.countries));
        if let Some(end) = &self.end {
            q = q.until(end)?;
        }
        Ok(q)
    }

    fn run(&self) -> Result<eurostat_macro::SeriesTable> {
        let client = EurostatClient::with_base_url(&self.base_url);
        eurostat_macro::fetch(&client, self.measure(), &self.query()?)
    }
}

#[derive(Args, Debug)]
struct FetchArgs {
    #[command(flatten)]
    series: MacroArgs,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for tick labels (en, de, fr, pl, ...).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Print per-column statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct SummariseArgs {
    /// Fund ticker (e.g. EUNL.DE).
    #[arg(long)]
    symbol: String,
    /// CSV of known instruments (needs `symbol` and `currency` columns).
    #[arg(long)]
    instruments: Option<PathBuf>,
    /// Fund trading currency; overrides the instruments file.
    #[arg(long)]
    currency: Option<String>,
    /// Currency to convert into.
    #[arg(long, default_value = DEFAULT_HOME_CURRENCY)]
    home: String,
    #[command(flatten)]
    series: MacroArgs,
    /// Number of recent dividend payments to print.
    #[arg(long, default_value_t = 6)]
    dividends: usize,
    /// Save the merged table as CSV.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Create the comparison chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 1200)]
    height: u32,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Countries => {
            for (name, code) in COUNTRY_CODES {
                println!("{code}  {name}");
            }
            Ok(())
        }
        Command::Fetch(args) => cmd_fetch(args),
        Command::Summarise(args) => cmd_summarise(args),
    }
}

fn cmd_fetch(args: FetchArgs) -> Result<()> {
    let table = args.series.run()?;
    if table.columns.is_empty() {
        eprintln!("No series matched the requested countries.");
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&table, path)?,
            "json" => storage::save_json(&table, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", table.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let title = args.series.measure().label();
        viz::plot_series_locale(
            &table,
            plot_path,
            args.width,
            args.height,
            &title,
            &args.locale,
        )?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        for s in stats::column_summary(&table) {
            let last = s
                .last
                .map(|(d, v)| format!("{} @ {}", fmt_opt(Some(v)), d))
                .unwrap_or_else(|| "NA".into());
            println!(
                "{}  count={}  min={} max={} mean={} median={}  last={}",
                s.column,
                s.count,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median),
                last
            );
        }
    }

    if args.out.is_none() && args.plot.is_none() && !args.stats {
        println!("date,{}", table.columns.join(","));
        for (d, row) in table.dates.iter().zip(&table.values) {
            let cells: Vec<String> = row.iter().map(|v| fmt_opt(Some(*v))).collect();
            println!("{},{}", d, cells.join(","));
        }
    }
    Ok(())
}

fn cmd_summarise(args: SummariseArgs) -> Result<()> {
    let catalog = match &args.instruments {
        Some(p) => Some(InstrumentCatalog::load_csv(p)?),
        None => None,
    };
    if let Some(inst) = catalog.as_ref().and_then(|c| c.get(&args.symbol)) {
        for (k, v) in &inst.fields {
            println!("{k:>16}: {v}");
        }
    }
    let currency =
        summary::resolve_currency(&args.symbol, args.currency.as_deref(), catalog.as_ref())?;

    let market = YahooClient::default();
    let merged = summary::summarise(&market, &args.symbol, &currency, &args.home)?;

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>12}",
        "date", "dividend", "fx", "div_home", "div_rate"
    );
    for r in merged.recent_dividends(args.dividends) {
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>12}",
            r.date,
            fmt_opt(r.dividend),
            fmt_opt(r.fx),
            fmt_opt(r.dividend_home),
            fmt_opt(r.dividend_rate)
        );
    }

    if let Some(path) = args.out.as_ref() {
        storage::save_summary_csv(&merged, path)?;
        eprintln!("Saved {} rows to {}", merged.rows.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let macro_table = args.series.run()?;
        viz::plot_instrument_summary(&merged, &macro_table, plot_path, args.width, args.height)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}
