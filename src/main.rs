// Entry point and interactive menu.
//
// - Option [1] loads and cleans the three sheets, printing diagnostics.
// - Option [2] picks the month, partner, property, unit and channels.
// - Option [3] computes the dashboard, previews it and exports the tables.
// A loaded snapshot is reused until its cache window runs out; the next
// report after that reloads the files.
use once_cell::sync::Lazy;
use rental_bi::config::ReportConfig;
use rental_bi::util::{format_int, normalize_name};
use rental_bi::{loader, logging, output, FilterCriteria, FilterOptions, Period, ReportContext, Snapshot};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{error, info};

static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: ReportConfig::default(),
        snapshot: None,
        loaded_at: None,
        filter: None,
    })
});

struct AppState {
    config: ReportConfig,
    snapshot: Option<Snapshot>,
    loaded_at: Option<Instant>,
    filter: Option<FilterCriteria>,
}

impl AppState {
    fn is_stale(&self) -> bool {
        self.loaded_at
            .map_or(true, |t| t.elapsed() >= self.config.cache_ttl())
    }
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Load the sheets into `APP_STATE`. Returns `false` when the reservations
/// file could not be read.
fn load_snapshot(state: &mut AppState) -> bool {
    let cfg = &state.config;
    match loader::load_snapshot(&cfg.reservations_path, &cfg.targets_path, &cfg.cost_history_path) {
        Ok((snapshot, report)) => {
            println!(
                "Processing dataset... ({} reservation rows loaded, {} kept)",
                format_int(report.reservations.total_rows),
                format_int(report.reservations.kept_rows)
            );
            println!(
                "Reference tables: {} unit targets, {} cost-history rows.",
                format_int(report.targets.kept_rows),
                format_int(report.cost_history.kept_rows)
            );
            let skipped = report.reservations.parse_errors + report.reservations.invalid_periods;
            if skipped > 0 {
                println!("Note: {} rows skipped due to parse/validation errors.", format_int(skipped));
            }
            if report.reservations.negative_nights > 0 || report.reservations.negative_revenue > 0 {
                println!(
                    "Warning: {} rows with negative nights and {} with negative revenue were kept.",
                    format_int(report.reservations.negative_nights),
                    format_int(report.reservations.negative_revenue)
                );
            }
            println!();

            let options = FilterOptions::from_records(&snapshot.reservations, None, None);
            if state.filter.is_none() {
                state.filter = options.latest_period().map(FilterCriteria::for_period);
            }
            state.snapshot = Some(snapshot);
            state.loaded_at = Some(Instant::now());
            true
        }
        Err(e) => {
            error!(error = %e, "failed to load snapshot");
            eprintln!("Failed to load file: {}\n", e);
            false
        }
    }
}

fn handle_load() {
    let mut state = state();
    load_snapshot(&mut state);
}

fn optional(answer: String) -> Option<String> {
    let name = normalize_name(&answer);
    (!name.is_empty()).then_some(name)
}

fn handle_select_filters() {
    let mut state = state();
    let Some(snapshot) = &state.snapshot else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };
    let rows = &snapshot.reservations;
    let options = FilterOptions::from_records(rows, None, None);
    let Some(latest) = options.latest_period() else {
        println!("The reservations table is empty.\n");
        return;
    };

    let labels: Vec<String> = options.periods.iter().map(Period::to_string).collect();
    println!("Months: {}", labels.join(", "));
    let answer = prompt(&format!("Month [{}]: ", latest));
    let period = if answer.is_empty() {
        latest
    } else {
        match Period::resolve(&answer) {
            Ok(p) => p,
            Err(e) => {
                println!("{}\n", e);
                return;
            }
        }
    };

    println!("Partners: {}", options.partners.join(", "));
    let partner = optional(prompt("Partner [all]: "));

    let options = FilterOptions::from_records(rows, partner.as_deref(), None);
    println!("Properties: {}", options.properties.join(", "));
    let property = optional(prompt("Property [all]: "));

    let unit = match &property {
        Some(prop) => {
            let options = FilterOptions::from_records(rows, partner.as_deref(), Some(prop));
            println!("Units: {}", options.units.join(", "));
            optional(prompt("Unit [all]: "))
        }
        None => None,
    };

    println!("Channels: {}", options.channels.join(", "));
    let channels: Vec<String> = prompt("Channels, comma separated [all]: ")
        .split(',')
        .map(normalize_name)
        .filter(|c| !c.is_empty())
        .collect();

    let filter = FilterCriteria {
        period,
        partner,
        property,
        unit,
        channels,
    };
    info!(?filter, "filters selected");
    state.filter = Some(filter);
    println!();
}

fn handle_generate_reports() {
    let mut state = state();
    if state.snapshot.is_some() && state.is_stale() {
        info!("snapshot cache expired, reloading");
        if !load_snapshot(&mut state) {
            return;
        }
    }
    let (Some(snapshot), Some(filter)) = (&state.snapshot, &state.filter) else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };

    println!("Generating reports...\n");
    let ctx = ReportContext::new(snapshot);
    let dashboard = ctx.dashboard(filter, state.config.trend_len);

    output::print_kpis(&dashboard);

    println!("Unit Detail");
    output::preview_table_rows(&output::unit_detail_rows(&dashboard.unit_detail), 5);
    println!("Property Ranking");
    output::preview_table_rows(&output::property_ranking_rows(&dashboard.property_ranking), 5);
    println!("Channel Share");
    output::preview_table_rows(&output::channel_share_rows(&dashboard.channel_share), 10);
    println!("Tier Distribution");
    output::preview_table_rows(&output::tier_distribution_rows(&dashboard.tier_distribution), 6);
    println!("Month over Month");
    output::preview_table_rows(&output::comparison_rows(&dashboard.month_over_month), 10);
    println!("Year over Year");
    output::preview_table_rows(&output::comparison_rows(&dashboard.year_over_year), 10);
    if let Some(history) = &dashboard.unit_history {
        println!("Monthly History: {} | Unit {} ({})", history.property_name, history.unit_name, history.assessment.tier);
        output::preview_table_rows(&output::history_rows(&history.points), 12);
    }

    match output::write_dashboard(&state.config.output_dir, &dashboard) {
        Ok(files) => println!("(Full tables exported: {} files in {})\n", files.len(), state.config.output_dir.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn main() {
    let config = match ReportConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid config, using defaults: {}", e);
            ReportConfig::default()
        }
    };
    logging::init(&config.log_level);
    state().config = config;

    loop {
        println!("Reservations BI:");
        println!("[1] Load the files");
        println!("[2] Select filters");
        println!("[3] Generate Reports\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_select_filters(),
            "3" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
