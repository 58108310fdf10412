use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use wbi_dash::catalog::Catalog;
use wbi_dash::{
    ChartToggles, Client, ClientConfig, Dashboard, DashboardConfig, HttpTransport, Notice,
    NoticeLevel, Selection, YearRange,
};
use wbi_dash::{storage, view};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-dash",
    version,
    about = "Chart World Bank indicators for countries and regions (line, bar, map)"
)]
struct Cli {
    #[command(flatten)]
    conn: ConnArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct ConnArgs {
    /// API root (default: https://api.worldbank.org/v2)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    /// Page size for list requests.
    #[arg(long, global = true)]
    per_page: Option<u32>,
    /// Locale for formatted values (en, de, fr, es, it, pt, nl).
    #[arg(long, global = true, default_value = "en")]
    locale: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List indicators whose name contains a search term.
    Indicators {
        #[arg(short, long, default_value = "GDP")]
        search: String,
    },
    /// List selectable countries and regions.
    Locations {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show which countries a set of codes expands to.
    Expand {
        /// Country/region codes separated by comma or semicolon (e.g., EUU,USA)
        codes: String,
    },
    /// Build the dashboard for a selection.
    Show(ShowArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Indicator code (e.g., NY.GDP.MKTP.CD)
    #[arg(short, long, default_value = "NY.GDP.MKTP.CD")]
    indicator: String,
    /// Country/region codes separated by comma or semicolon (e.g., EUU,USA)
    #[arg(short, long, required_unless_present = "names")]
    locations: Option<String>,
    /// Country/region display names separated by semicolon (e.g., "European Union;France")
    #[arg(long)]
    names: Option<String>,
    /// Year (YYYY) or range (YYYY:YYYY)
    #[arg(short = 'd', long, default_value = "1960:2023")]
    years: String,
    /// Year shown by the bar chart and map (default: first year of the range).
    #[arg(long)]
    year: Option<i32>,
    #[arg(long, default_value_t = false)]
    no_line: bool,
    #[arg(long, default_value_t = false)]
    bar: bool,
    #[arg(long, default_value_t = false)]
    no_map: bool,
    /// Also chart the member countries of selected regions.
    #[arg(long, default_value_t = false)]
    members: bool,
    /// Write the dashboard as an HTML page.
    #[arg(long)]
    html: Option<PathBuf>,
    /// Save the long table (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Save the map rows of the focus year as CSV.
    #[arg(long)]
    map_out: Option<PathBuf>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn print_notices(notices: &[Notice]) {
    for n in notices {
        match n.level {
            NoticeLevel::Info => eprintln!("info: {}", n.message),
            NoticeLevel::Warning => eprintln!("warning: {}", n.message),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut client_config = ClientConfig {
        timeout: Duration::from_secs(cli.conn.timeout),
        ..ClientConfig::default()
    };
    if let Some(url) = cli.conn.base_url {
        client_config.base_url = url;
    }
    if let Some(n) = cli.conn.per_page {
        client_config.per_page = n;
    }
    let dash_config = DashboardConfig {
        locale: cli.conn.locale,
        ..DashboardConfig::default()
    };
    let client = Client::new(client_config).context("build http client")?;
    let dash = Dashboard::new(client, dash_config);

    match cli.cmd {
        Command::Indicators { search } => cmd_indicators(&dash, &search),
        Command::Locations { search } => cmd_locations(&dash, search.as_deref()),
        Command::Expand { codes } => cmd_expand(&dash, &codes),
        Command::Show(args) => cmd_show(&dash, args),
    }
}

fn cmd_indicators(dash: &Dashboard<HttpTransport>, search: &str) -> Result<()> {
    let mut notices = Vec::new();
    let catalog = Catalog::new(dash.indicators(&mut notices), &[]);
    print_notices(&notices);
    let hits = catalog.search_indicators(search);
    if hits.is_empty() {
        eprintln!("No indicators found. Try a different keyword.");
        return Ok(());
    }
    let default = Catalog::default_indicator(&hits).map(|i| i.code.clone());
    for i in hits {
        let mark = if Some(&i.code) == default.as_ref() { "*" } else { " " };
        println!("{mark} {:<24} {}", i.code, i.name);
    }
    Ok(())
}

fn cmd_locations(dash: &Dashboard<HttpTransport>, search: Option<&str>) -> Result<()> {
    let mut notices = Vec::new();
    let locations = dash.locations(&mut notices);
    print_notices(&notices);
    let catalog = Catalog::new(&[], locations);
    let list = match search {
        Some(q) => catalog.search_locations(q),
        None => locations.iter().collect(),
    };
    for l in list {
        println!("{:<6} {}", l.code, l.name);
    }
    Ok(())
}

fn cmd_expand(dash: &Dashboard<HttpTransport>, codes: &str) -> Result<()> {
    let mut notices = Vec::new();
    let expansion = dash.expand(&parse_list(codes), &mut notices);
    print_notices(&notices);
    println!("region selected: {}", expansion.any_region);
    println!("codes: {}", expansion.codes_vec().join(";"));
    println!("countries: {}", expansion.member_listing());
    Ok(())
}

fn cmd_show(dash: &Dashboard<HttpTransport>, args: ShowArgs) -> Result<()> {
    let range: YearRange = args.years.parse()?;
    let mut codes = args.locations.as_deref().map(parse_list).unwrap_or_default();
    if let Some(names) = args.names.as_deref() {
        let names: Vec<&str> = names.split(';').map(str::trim).filter(|n| !n.is_empty()).collect();
        let mut notices = Vec::new();
        codes.extend(dash.codes_for_names(&names, &mut notices));
        print_notices(&notices);
    }
    let selection = Selection {
        charts: ChartToggles {
            line: !args.no_line,
            bar: args.bar,
            map: !args.no_map,
        },
        focus_year: args.year,
        show_members: args.members,
        ..Selection::new(args.indicator, codes, range)
    };

    let dashboard = dash.run(&selection)?;
    print_notices(&dashboard.notices);

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_series_csv(&dashboard.series, path)?,
            "json" => storage::save_series_json(&dashboard.series, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", dashboard.series.len(), path.display());
    }

    if let Some(path) = args.map_out.as_ref() {
        match dashboard.map.as_ref() {
            Some(frame) => {
                storage::save_map_csv(frame, path)?;
                eprintln!("Saved {} map rows to {}", frame.rows.len(), path.display());
            }
            None => eprintln!("No map data to save."),
        }
    }

    if let Some(path) = args.html.as_ref() {
        storage::save_html(&view::render_html(&dashboard), path)?;
        eprintln!("Wrote dashboard to {}", path.display());
    }

    if args.out.is_none() && args.html.is_none() {
        for r in &dashboard.series.rows {
            println!("{}\t{}\t{}", r.year, r.country, r.formatted);
        }
    }
    Ok(())
}
