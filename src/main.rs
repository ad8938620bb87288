use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use std::env;
use std::path::PathBuf;

use leave_ledger::{
    balances_as_of, parse_mm_yy, validate_request, Employee, EmployeeStore, LeaveCategory,
    LeaveTransaction, StartingBalances,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let store = EmployeeStore::open(&data_dir());

    match args.get(1).map(String::as_str) {
        None | Some("list") => run_list(&store),
        Some("add") => run_add(&store, &args[2..]),
        Some("leave") => run_leave(&store, &args[2..]),
        Some("reset") => run_reset(&store),
        Some(other) => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn data_dir() -> PathBuf {
    env::var("LEAVE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn print_usage() {
    println!("Leave Ledger - employee leave balances");
    println!();
    println!("Usage:");
    println!("  leave-ledger [list]");
    println!("  leave-ledger add <name> <MM/YY> <annual> <sick> <family> <study> <religious> <accrual/month>");
    println!("  leave-ledger leave <employee> <type> <days> [YYYY-MM-DD]");
    println!("  leave-ledger reset");
    println!();
    println!("Leave types: annual, sick, family, study, religious");
}

fn run_list(store: &EmployeeStore) -> Result<()> {
    let employees = store.load();
    let now = Utc::now();

    println!("📋 Leave balances as of {}", now.format("%d %b %Y"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if employees.is_empty() {
        println!("No employees yet. Add one with: leave-ledger add ...");
        return Ok(());
    }

    println!(
        "{:<24} {:>6} {:>7} {:>6} {:>7} {:>6} {:>7} {:>8}",
        "Name", "Start", "Annual", "Sick", "Family", "Study", "Relig.", "Accrual"
    );

    for emp in &employees {
        let balances = balances_as_of(emp, now);
        println!(
            "{:<24} {:>6} {:>7.1} {:>6.1} {:>7.1} {:>6.1} {:>7.1} {:>8.2}",
            emp.name,
            emp.start_display,
            balances.annual,
            balances.sick,
            balances.family,
            balances.study,
            balances.religious,
            emp.annual_accrual_per_month,
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ {} employee(s)", employees.len());
    Ok(())
}

fn run_add(store: &EmployeeStore, args: &[String]) -> Result<()> {
    if args.len() != 8 {
        print_usage();
        bail!("add expects 8 arguments, got {}", args.len());
    }

    let name = args[0].trim();
    if name.is_empty() {
        bail!("Please enter an employee name.");
    }

    let start_display = args[1].trim();
    if parse_mm_yy(start_display).is_none() {
        bail!("Start date must be in MM/YY format, e.g. 01/26.");
    }

    let numbers: Vec<f64> = args[2..8]
        .iter()
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| anyhow!("Not a number: {raw}"))
        })
        .collect::<Result<_>>()?;
    if numbers.iter().any(|n| *n < 0.0) {
        bail!("Leave balances and accrual must be zero or positive.");
    }

    let employee = Employee::new(
        name,
        start_display,
        StartingBalances {
            annual: numbers[0],
            sick: numbers[1],
            family: numbers[2],
            study: numbers[3],
            religious: numbers[4],
            accrual_per_month: numbers[5],
        },
    );
    let display_name = employee.name.clone();
    store.add_employee(employee)?;

    println!("✓ Added {display_name}");
    Ok(())
}

fn run_leave(store: &EmployeeStore, args: &[String]) -> Result<()> {
    if !(3..=4).contains(&args.len()) {
        print_usage();
        bail!("leave expects 3 or 4 arguments, got {}", args.len());
    }

    let employees = store.load();
    let employee = find_employee(&employees, &args[0])
        .ok_or_else(|| anyhow!("Selected employee could not be found: {}", args[0]))?;

    let category = LeaveCategory::parse(&args[1])
        .ok_or_else(|| anyhow!("Unknown leave type: {} (expected annual, sick, family, study or religious)", args[1]))?;

    let days: f64 = args[2]
        .parse()
        .with_context(|| format!("Not a number of days: {}", args[2]))?;
    if days <= 0.0 {
        bail!("Please enter a positive number of days.");
    }

    let date = match args.get(3) {
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("Date must be YYYY-MM-DD, got {raw}"))?;
            Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
        }
        None => Utc::now(),
    };

    // Advisory overdraw check, evaluated as of the requested date.
    validate_request(employee, category, days, date)?;

    store.append_transaction(&employee.id, LeaveTransaction::new(category, days, date))?;

    let remaining = balances_as_of(
        &store
            .load()
            .into_iter()
            .find(|e| e.id == employee.id)
            .expect("employee disappeared between load and append"),
        date,
    )
    .get(category);
    println!(
        "✓ Recorded {:.1} {} day(s) for {} on {}. Remaining: {:.1}",
        days,
        category.as_str(),
        employee.name,
        date.format("%d %b %Y"),
        remaining
    );
    Ok(())
}

fn run_reset(store: &EmployeeStore) -> Result<()> {
    store.reset()?;
    println!("✓ Removed all employees and history from {:?}", store.path());
    Ok(())
}

/// Resolve an employee by exact id or case-insensitive name.
fn find_employee<'a>(employees: &'a [Employee], needle: &str) -> Option<&'a Employee> {
    employees
        .iter()
        .find(|e| e.id == needle)
        .or_else(|| {
            employees
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(needle.trim()))
        })
}
