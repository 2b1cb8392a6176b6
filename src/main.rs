use anyhow::Result;
use std::env;
use std::path::Path;
use std::process;

// Use library instead of local modules
use pocket_ledger::{
    category_totals, monthly_totals, top_expenses, ExchangeFormat, Ledger, OperationFilter,
    OperationKind, Storage, DEFAULT_DATA_FILE,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let data_file = env::var("LEDGER_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string());
    let storage = Storage::new(&data_file);

    let (operations, next_id) = storage.load();
    let mut ledger = Ledger::restore(operations, next_id);

    match args.get(1).map(String::as_str) {
        Some("add") => run_add(&mut ledger, &storage, &args[2..]),
        Some("delete") => run_delete(&mut ledger, &storage, &args[2..]),
        Some("list") => run_list(&ledger, &args[2..]),
        Some("report") => run_report(&ledger),
        Some("export") => run_export(&ledger, &storage, &args[2..]),
        Some("import") => run_import(&mut ledger, &storage, &args[2..]),
        Some("help") | Some("--help") => {
            print_usage();
            Ok(())
        }
        None => run_summary(&ledger, &storage),
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    }
}

fn print_usage() {
    println!("Usage: pocket-ledger [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                   show summary");
    println!("  add <amount> <category> <date> <kind> [description]");
    println!("                                           record an operation (kind: income|expense)");
    println!("  delete <id>                              remove an operation");
    println!("  list [--category C] [--kind K] [--from D] [--to D]");
    println!("                                           list matching operations");
    println!("  report                                   monthly/category/top-expense views");
    println!("  export <path>                            export to .csv or .json");
    println!("  import <path>                            import candidates from .csv or .json");
    println!();
    println!("The canonical store defaults to {} (override with LEDGER_FILE).", DEFAULT_DATA_FILE);
}

/// Every mutation is followed by an explicit save; the core never
/// auto-saves.
fn persist(ledger: &Ledger, storage: &Storage) {
    if !storage.save(ledger.operations()) {
        eprintln!(
            "Storage failure: could not write {}",
            storage.data_file().display()
        );
        process::exit(1);
    }
}

fn run_summary(ledger: &Ledger, storage: &Storage) -> Result<()> {
    println!("Ledger: {}", storage.data_file().display());
    println!("Operations: {}", ledger.len());
    println!("Balance: {:.2}", ledger.balance(None));

    let categories = ledger.categories();
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }
    Ok(())
}

fn run_add(ledger: &mut Ledger, storage: &Storage, args: &[String]) -> Result<()> {
    if args.len() < 4 {
        eprintln!("Usage: pocket-ledger add <amount> <category> <date> <income|expense> [description]");
        process::exit(2);
    }

    let Ok(amount) = args[0].parse::<f64>() else {
        eprintln!("Invalid input: amount {:?} is not a number", args[0]);
        process::exit(1);
    };
    let Ok(kind) = OperationKind::from_label(&args[3]) else {
        eprintln!("Invalid input: kind must be income or expense, got {:?}", args[3]);
        process::exit(1);
    };
    let description = args.get(4).map(String::as_str).unwrap_or("");

    if !ledger.add(amount, &args[1], &args[2], kind, description) {
        eprintln!("Invalid input: operation rejected (check amount, category and date)");
        process::exit(1);
    }
    persist(ledger, storage);

    println!("✓ Added operation #{}", ledger.next_id() - 1);
    Ok(())
}

fn run_delete(ledger: &mut Ledger, storage: &Storage, args: &[String]) -> Result<()> {
    let Some(Ok(id)) = args.first().map(|arg| arg.parse::<u64>()) else {
        eprintln!("Usage: pocket-ledger delete <id>");
        process::exit(2);
    };

    if !ledger.delete(id) {
        eprintln!("Nothing to do: no operation #{}", id);
        process::exit(1);
    }
    persist(ledger, storage);

    println!("✓ Deleted operation #{}", id);
    Ok(())
}

fn parse_filter(args: &[String]) -> OperationFilter {
    let mut filter = OperationFilter::new();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let Some(value) = iter.next() else {
            eprintln!("Missing value for {}", flag);
            process::exit(2);
        };
        filter = match flag.as_str() {
            "--category" => filter.with_category(value.as_str()),
            "--kind" => match OperationKind::from_label(value) {
                Ok(kind) => filter.with_kind(kind),
                Err(_) => {
                    eprintln!("Invalid input: kind must be income or expense, got {:?}", value);
                    process::exit(1);
                }
            },
            "--from" => filter.with_start_date(value.as_str()),
            "--to" => filter.with_end_date(value.as_str()),
            other => {
                eprintln!("Unknown flag: {}", other);
                process::exit(2);
            }
        };
    }
    filter
}

fn run_list(ledger: &Ledger, args: &[String]) -> Result<()> {
    let filter = parse_filter(args);
    let matched = ledger.filter(&filter);

    if matched.is_empty() {
        println!("Nothing to do: no matching operations");
        return Ok(());
    }

    for op in &matched {
        println!(
            "#{:<4} {}  {:>10.2}  {:<8}  {}  {}",
            op.id,
            op.date,
            op.amount,
            op.kind.label(),
            op.category,
            op.description
        );
    }
    println!(
        "{} operations, balance {:.2}",
        matched.len(),
        ledger.balance(Some(&matched))
    );
    Ok(())
}

fn run_report(ledger: &Ledger) -> Result<()> {
    if ledger.is_empty() {
        println!("Nothing to do: ledger is empty");
        return Ok(());
    }
    let snapshot = ledger.operations();

    println!("Monthly totals:");
    for total in monthly_totals(snapshot) {
        println!(
            "  {}  income {:>10.2}  expense {:>10.2}",
            total.month, total.income, total.expense
        );
    }

    let by_category = category_totals(snapshot);
    if !by_category.is_empty() {
        println!("\nExpenses by category:");
        for total in &by_category {
            println!("  {:<20} {:>10.2}", total.category, total.total);
        }
    }

    let top = top_expenses(snapshot, 5);
    if !top.is_empty() {
        println!("\nTop expenses:");
        for op in &top {
            println!("  {:>10.2}  {} ({})", op.amount, op.category, op.date);
        }
    }
    Ok(())
}

fn exchange_format(path: &Path) -> ExchangeFormat {
    match ExchangeFormat::from_extension(path) {
        Some(format) => format,
        None => {
            eprintln!(
                "Invalid input: cannot tell CSV from JSON by extension: {}",
                path.display()
            );
            process::exit(1);
        }
    }
}

fn run_export(ledger: &Ledger, storage: &Storage, args: &[String]) -> Result<()> {
    let Some(target) = args.first() else {
        eprintln!("Usage: pocket-ledger export <path>");
        process::exit(2);
    };
    let target = Path::new(target);
    let format = exchange_format(target);

    if !storage.export(ledger.operations(), target, format) {
        eprintln!("Storage failure: could not write {}", target.display());
        process::exit(1);
    }

    println!(
        "✓ Exported {} operations to {} ({})",
        ledger.len(),
        target.display(),
        format.name()
    );
    Ok(())
}

fn run_import(ledger: &mut Ledger, storage: &Storage, args: &[String]) -> Result<()> {
    let Some(source) = args.first() else {
        eprintln!("Usage: pocket-ledger import <path>");
        process::exit(2);
    };
    let source = Path::new(source);
    let format = exchange_format(source);

    let candidates = storage.import(source, format);
    if candidates.is_empty() {
        println!("Nothing to do: no usable records in {}", source.display());
        return Ok(());
    }

    // Candidates merge one at a time; a rejected record does not roll back
    // the ones before it.
    let merged = ledger.merge(&candidates);
    persist(ledger, storage);

    println!(
        "✓ Imported {} of {} candidate records ({} rejected)",
        merged,
        candidates.len(),
        candidates.len() - merged
    );
    Ok(())
}
