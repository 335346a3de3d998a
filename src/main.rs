use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fastighetsportal::core::property::today;
use fastighetsportal::valuation::{
    MarketTrend, REGIONAL_RENTAL_YIELD, format_sek, format_sqm_price,
};
use fastighetsportal::{
    Dashboard, KeyValueStore, LoginEvent, LoginFlow, LoginSchedule, LoginStep, PortalDb,
    PropertyField, SessionStore, TokioClock, ValuationPeriod, ValuationService,
};

#[derive(Parser)]
#[command(name = "fastighetsportal")]
#[command(about = "Rental property dashboard with a simulated BankID login")]
struct Cli {
    /// Path to the local database file
    #[arg(
        long,
        value_name = "FILE",
        env = "FASTIGHETSPORTAL_DB",
        default_value = "fastighetsportal.db",
        global = true
    )]
    db: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with the simulated BankID flow
    Login {
        /// Run the BankID timers ten times faster
        #[arg(long)]
        fast: bool,
    },
    /// Forget the saved session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show or edit the property record
    Property {
        #[command(subcommand)]
        action: PropertyAction,
    },
    /// Dashboard key figures for today
    Summary,
    /// Synthetic market valuation for the property
    Valuation {
        /// 6m, 12m or 24m
        #[arg(long, default_value = "24m")]
        period: ValuationPeriod,

        /// Seed for reproducible numbers
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Open the desktop front end
    #[cfg(feature = "gui")]
    Gui,
}

#[derive(Subcommand)]
enum PropertyAction {
    Show,
    /// Set one field, e.g. `set monthlyRent 15000`
    Set { field: PropertyField, value: String },
    /// Restore the default record
    Reset,
    /// Report inconsistent or unreadable dates
    Check,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match args.command {
        #[cfg(feature = "gui")]
        Command::Gui => fastighetsportal::gui::run(args.db),
        command => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run(args.db, command))
        }
    }
}

async fn run(db: PathBuf, command: Command) -> anyhow::Result<()> {
    let store = PortalDb::open(&db)
        .await
        .with_context(|| format!("Failed to open database {:?}", db))?;
    let mut sessions = SessionStore::new(store.clone());
    sessions.init().await?;

    let result = match command {
        Command::Login { fast } => login(&mut sessions, fast).await,
        Command::Logout => sessions.sign_out().await.map(|()| println!("Utloggad.")),
        Command::Whoami => {
            match sessions.current() {
                Some(who) => println!("{} ({})", who.name, who.personal_number),
                None => println!("Inte inloggad."),
            }
            Ok(())
        }
        Command::Property { action } => match require_session(&sessions) {
            Ok(()) => property(store.clone(), action).await,
            Err(e) => Err(e),
        },
        Command::Summary => match require_session(&sessions) {
            Ok(()) => summary(store.clone()).await,
            Err(e) => Err(e),
        },
        Command::Valuation { period, seed } => match require_session(&sessions) {
            Ok(()) => valuation(store.clone(), period, seed).await,
            Err(e) => Err(e),
        },
        #[cfg(feature = "gui")]
        Command::Gui => Err(anyhow::anyhow!("The gui command cannot run inside the async runtime")),
    };

    // The database is closed on every path, including failed commands.
    let closed = store.close().await;
    result.and(closed)
}

fn require_session<S: KeyValueStore>(sessions: &SessionStore<S>) -> anyhow::Result<()> {
    if !sessions.is_signed_in() {
        anyhow::bail!("Not signed in, run `fastighetsportal login` first");
    }
    Ok(())
}

async fn login(sessions: &mut SessionStore<PortalDb>, fast: bool) -> anyhow::Result<()> {
    if let Some(who) = sessions.current() {
        println!("Redan inloggad som {} ({})", who.name, who.personal_number);
        return Ok(());
    }

    let schedule = if fast {
        LoginSchedule::bankid().scaled(0.1)?
    } else {
        LoginSchedule::bankid()
    };

    let mut flow = LoginFlow::new(TokioClock).with_schedule(schedule);

    let order_ref = flow.start()?;
    print_step(LoginStep::Qr);
    println!("  Order: {}", order_ref);

    let identity = flow
        .run(|event| match event {
            LoginEvent::StepChanged { to, .. } => print_step(*to),
            LoginEvent::Reset { reason } => println!("Inloggningen avbröts: {}", reason),
            LoginEvent::Completed(_) => {}
        })
        .await
        .context("BankID login did not complete")?;
    let name = identity.name.clone();
    sessions.sign_in(identity).await?;
    println!("Välkommen, {}!", name);
    Ok(())
}

fn print_step(step: LoginStep) {
    println!("{}", step.heading());
    println!("  {}", step.hint());
}

async fn property(store: PortalDb, action: PropertyAction) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::open(store).await?;
    match action {
        PropertyAction::Show => {
            for field in PropertyField::ALL {
                println!(
                    "{:<24} {:<18} {}",
                    field.label(),
                    field.key(),
                    dashboard.record().get_field(field)
                );
            }
        }
        PropertyAction::Set { field, value } => {
            let record = dashboard.edit(field, &value).await?;
            println!("{} = {}", field, record.get_field(field));
        }
        PropertyAction::Reset => {
            dashboard.reset().await?;
            println!("Fastighetsuppgifterna återställdes.");
        }
        PropertyAction::Check => {
            let warnings = dashboard.record().date_warnings();
            if warnings.is_empty() {
                println!("Inga datumvarningar.");
            }
            for warning in warnings {
                println!("Varning: {}", warning);
            }
        }
    }
    Ok(())
}

async fn summary(store: PortalDb) -> anyhow::Result<()> {
    let dashboard = Dashboard::open(store).await?;
    let summary = dashboard.summary(today());
    let days = |d: Option<i64>| d.map_or_else(|| "okänt".to_string(), |d| d.to_string());

    println!("Månadshyra:              {}", format_sek(u64::from(summary.monthly_rent)));
    println!("Uthyrningsgrad:          {}%", summary.occupancy_percent);
    println!("Dagar till BRF-förnyelse: {}", days(summary.days_to_permit_expiry));
    println!("Dagar till nästa hyra:   {}", days(summary.days_until_rent_due));
    println!("Olästa meddelanden:      {}", summary.unread_messages);
    println!(
        "Hyresstatus:             {}",
        if summary.rent_paid { "Betald" } else { "Obetald" }
    );
    Ok(())
}

async fn valuation(store: PortalDb, period: ValuationPeriod, seed: Option<u64>) -> anyhow::Result<()> {
    let dashboard = Dashboard::open(store).await?;
    let mut service = match seed {
        Some(seed) => ValuationService::seeded(seed),
        None => ValuationService::new(),
    };

    println!("Hämtar värderingsdata...");
    let report = service.load(dashboard.record(), period, today()).await?;
    let comparison = &report.comparison;

    println!("\n=== Fastighetsvärdering: {} ===", report.address);
    println!(
        "Aktuellt marknadsvärde: {} ({})",
        format_sek(comparison.current_value),
        format_sqm_price((comparison.current_value as f64 / 65.0).round() as u64)
    );
    println!(
        "Årlig förändring:       {}{:.1}% {}",
        if comparison.year_change > 0.0 { "+" } else { "" },
        comparison.year_change,
        match comparison.trend {
            MarketTrend::Up => "↑",
            MarketTrend::Down => "↓",
        }
    );
    println!("Regionalt snitt:        {}", format_sek(comparison.regional_average));
    println!("Nationellt snitt:       {}", format_sek(comparison.national_average));
    println!(
        "Hyresavkastning:        {:.1}% (regionalt snitt {:.1}%)",
        report.rental_yield, REGIONAL_RENTAL_YIELD
    );

    println!("\nPeriod: {}", report.period.label());
    let max = report.series.iter().map(|p| p.value).max().unwrap_or(1).max(1);
    for point in &report.series {
        let width = (point.value * 40 / max) as usize;
        println!(
            "  {:<9} {:>14}  {}",
            point.display_month,
            format_sek(point.value),
            "█".repeat(width)
        );
    }
    Ok(())
}
